//! Publication date normalization
//!
//! PubMed reports dates as separate `Year`/`Month`/`Day` elements, as free-text
//! `MedlineDate` values ("1998 Dec-1999 Jan", "2000 Spring"), or as ISO-like
//! strings. All of them collapse into [`PublicationDate`], where a component
//! that the source did not state stays `None`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Publication date with explicitly unknown components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicationDate {
    pub year: Option<u16>,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl PublicationDate {
    /// A date where nothing is known
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn from_year(year: u16) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    /// Build a date from raw components, discarding values that are out of range
    ///
    /// A day without a month, or a month without a year, carries no meaning and
    /// is dropped as well.
    pub fn from_parts(year: Option<u16>, month: Option<u8>, day: Option<u8>) -> Self {
        let year = year.filter(|y| (1000..=9999).contains(y));
        let month = month.filter(|m| (1..=12).contains(m)).filter(|_| year.is_some());
        let day = day.filter(|d| (1..=31).contains(d)).filter(|_| month.is_some());
        Self { year, month, day }
    }

    /// Parse a date string in any of the formats PubMed emits
    ///
    /// Accepted: `2020`, `2020 Feb`, `2020 Feb 24`, `2020 February 24`,
    /// `2020-02`, `2020-02-24`, `2020/02/24`, and MedlineDate ranges such as
    /// `1998 Dec-1999 Jan` (the first date of the range is kept).
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_literature::PublicationDate;
    ///
    /// let date = PublicationDate::parse("2020 Feb");
    /// assert_eq!(date.year, Some(2020));
    /// assert_eq!(date.month, Some(2));
    /// assert_eq!(date.day, None);
    /// ```
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(caps) = numeric_date_regex().captures(text) {
            return Self::from_parts(
                caps.get(1).and_then(|m| m.as_str().parse().ok()),
                caps.get(2).and_then(|m| m.as_str().parse().ok()),
                caps.get(3).and_then(|m| m.as_str().parse().ok()),
            );
        }

        match textual_date_regex().captures(text) {
            Some(caps) => {
                let year = caps.get(1).and_then(|m| m.as_str().parse().ok());
                let month = caps.get(2).and_then(|m| parse_month(m.as_str()));
                let day = caps.get(3).and_then(|m| m.as_str().parse().ok());
                Self::from_parts(year, month, day)
            }
            None => Self::unknown(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.year.is_none()
    }
}

impl fmt::Display for PublicationDate {
    /// Renders `2020 Feb 24`, `2020 Feb`, `2020`, or nothing when unknown
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(year) = self.year else {
            return Ok(());
        };
        write!(f, "{year}")?;

        let month_name = self
            .month
            .and_then(|m| MONTH_ABBREVIATIONS.get(usize::from(m).checked_sub(1)?));
        if let Some(month_name) = month_name {
            write!(f, " {month_name}")?;
            if let Some(day) = self.day {
                write!(f, " {day}")?;
            }
        }
        Ok(())
    }
}

/// Parse a month given as a number (`"02"`), an abbreviation (`"Feb"`), or a
/// full English name (`"February"`)
pub(crate) fn parse_month(text: &str) -> Option<u8> {
    let text = text.trim();

    if text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse().ok().filter(|m| (1..=12).contains(m));
    }

    if text.len() < 3 || !text.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let prefix = &text[..3];
    MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| abbr.eq_ignore_ascii_case(prefix))
        .map(|idx| idx as u8 + 1)
}

fn numeric_date_regex() -> &'static Regex {
    static NUMERIC_DATE: OnceLock<Regex> = OnceLock::new();
    NUMERIC_DATE.get_or_init(|| {
        Regex::new(r"^(\d{4})(?:[-/](\d{1,2})(?:[-/](\d{1,2}))?)?$")
            .expect("Failed to compile numeric date regex")
    })
}

fn textual_date_regex() -> &'static Regex {
    static TEXTUAL_DATE: OnceLock<Regex> = OnceLock::new();
    TEXTUAL_DATE.get_or_init(|| {
        Regex::new(r"^(\d{4})(?:\s+([A-Za-z]+|\d{1,2})(?:\s+(\d{1,2})\b)?)?")
            .expect("Failed to compile textual date regex")
    })
}
