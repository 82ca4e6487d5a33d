//! Parsing of raw ESearch and EFetch payloads
//!
//! A structurally invalid payload is a [`LiteratureError::Parse`]. Inside a
//! valid payload, individual records that lack an id or fail to decode are
//! dropped and counted so one broken record never fails the whole batch.

mod preprocessing;
mod xml_types;

use quick_xml::Reader;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use tracing::{debug, instrument, warn};

use crate::error::{LiteratureError, Result};
use crate::pubmed::models::Article;
use crate::pubmed::responses::ESearchResult;

use preprocessing::strip_inline_html_tags;
use xml_types::PubmedArticleXml;

/// Ranked ids from one ESearch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIds {
    /// PubMed ids in relevance order
    pub ids: Vec<String>,
    /// Total matches reported by the service
    pub total_found: usize,
    /// How PubMed translated the query, when reported
    pub query_translation: Option<String>,
}

/// Articles decoded from one EFetch response
#[derive(Debug, Clone, Default)]
pub struct ParsedArticles {
    pub articles: Vec<Article>,
    /// Records skipped because they carried no id or could not be decoded
    pub dropped: usize,
}

impl ParsedArticles {
    fn push_record(&mut self, fragment: &str) {
        let record = match from_str::<PubmedArticleXml>(fragment) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "Dropping EFetch record that failed to decode");
                self.dropped += 1;
                return;
            }
        };

        match record.pmid() {
            Some(id) => self.articles.push(record.into_article(id)),
            None => {
                warn!("Dropping EFetch record without a PMID");
                self.dropped += 1;
            }
        }
    }
}

const ARTICLE_SET: &[u8] = b"PubmedArticleSet";
const ARTICLE: &[u8] = b"PubmedArticle";
const FETCH_RESULT: &[u8] = b"eFetchResult";

pub struct ResponseParser;

impl ResponseParser {
    /// Parse an ESearch JSON body into ranked ids and the total match count
    ///
    /// The `count` field is passed through as reported. When it is missing
    /// or not a number the length of the id list is used instead.
    ///
    /// # Errors
    ///
    /// * `LiteratureError::Parse` - if the body is not valid ESearch JSON, or
    ///   the service reported an error for the query
    #[instrument(skip(raw), fields(body_size = raw.len()))]
    pub fn parse_search(raw: &str) -> Result<SearchIds> {
        let result: ESearchResult = serde_json::from_str(raw)?;
        let data = result.esearchresult;

        if let Some(error) = data.error.filter(|e| !e.trim().is_empty()) {
            warn!(error = %error, "ESearch reported an error");
            return Err(LiteratureError::Parse(format!(
                "ESearch reported an error: {error}"
            )));
        }

        let ids: Vec<String> = data
            .idlist
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        let total_found = match data.count.as_deref().map(str::trim).map(str::parse::<usize>) {
            Some(Ok(count)) => count,
            Some(Err(_)) | None => {
                warn!(
                    count = ?data.count,
                    fallback = ids.len(),
                    "ESearch count missing or unparsable, using id list length"
                );
                ids.len()
            }
        };

        debug!(ids = ids.len(), total_found, "Parsed ESearch response");

        Ok(SearchIds {
            ids,
            total_found,
            query_translation: data.querytranslation,
        })
    }

    /// Parse an EFetch XML body into normalized articles
    ///
    /// A blank body is an empty result. Each `PubmedArticle` is decoded on its
    /// own; records without a PubMed id or with content that cannot be
    /// decoded are dropped and reported through [`ParsedArticles::dropped`].
    ///
    /// # Errors
    ///
    /// * `LiteratureError::Parse` - if the body is not a well-formed
    ///   `PubmedArticleSet` document, or is an `eFetchResult` error report
    #[instrument(skip(raw), fields(body_size = raw.len()))]
    pub fn parse_summaries(raw: &str) -> Result<ParsedArticles> {
        if raw.trim().is_empty() {
            debug!("Empty EFetch body");
            return Ok(ParsedArticles::default());
        }

        let cleaned = strip_inline_html_tags(raw);
        let mut reader = Reader::from_str(&cleaned);
        reader.config_mut().trim_text(true);

        let mut parsed = ParsedArticles::default();
        if !open_article_set(&mut reader)? {
            return Ok(parsed);
        }

        loop {
            let start = reader.buffer_position();
            match reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == ARTICLE => {
                    reader.read_to_end(e.name())?;
                    let fragment = slice_fragment(&cleaned, start, reader.buffer_position())?;
                    parsed.push_record(fragment);
                }
                Event::Start(e) => {
                    debug!(
                        element = %String::from_utf8_lossy(e.name().as_ref()),
                        "Skipping non-article element"
                    );
                    reader.read_to_end(e.name())?;
                }
                Event::Empty(e) if e.name().as_ref() == ARTICLE => {
                    warn!("Dropping empty EFetch record");
                    parsed.dropped += 1;
                }
                // Nested ends are consumed by read_to_end, so this closes the set
                Event::End(_) => break,
                Event::Eof => {
                    return Err(LiteratureError::Parse(
                        "EFetch body ended before </PubmedArticleSet>".to_string(),
                    ));
                }
                _ => {}
            }
        }

        debug!(
            articles = parsed.articles.len(),
            dropped = parsed.dropped,
            "Parsed EFetch response"
        );

        Ok(parsed)
    }
}

/// Advance past the root element
///
/// Returns `false` for an empty `<PubmedArticleSet/>`. Any other root is a
/// parse error; NCBI's `eFetchResult` error report carries its message along.
fn open_article_set(reader: &mut Reader<&[u8]>) -> Result<bool> {
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == ARTICLE_SET => return Ok(true),
            Event::Empty(e) if e.name().as_ref() == ARTICLE_SET => return Ok(false),
            Event::Start(e) if e.name().as_ref() == FETCH_RESULT => {
                return Err(fetch_result_error(reader));
            }
            Event::Start(e) | Event::Empty(e) => {
                let root = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                warn!(root = %root, "Unexpected EFetch root element");
                return Err(LiteratureError::Parse(format!(
                    "expected <PubmedArticleSet>, found <{root}>"
                )));
            }
            Event::Text(_) | Event::CData(_) => {
                return Err(LiteratureError::Parse(
                    "EFetch body is not an XML document".to_string(),
                ));
            }
            Event::Eof => {
                return Err(LiteratureError::Parse(
                    "EFetch body has no root element".to_string(),
                ));
            }
            _ => {}
        }
    }
}

fn fetch_result_error(reader: &mut Reader<&[u8]>) -> LiteratureError {
    let message = loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"ERROR" => {
                match reader.read_text(e.name()) {
                    Ok(text) => break text.trim().to_string(),
                    Err(err) => return err.into(),
                }
            }
            Ok(Event::Eof) => break String::new(),
            Ok(_) => {}
            Err(err) => return err.into(),
        }
    };

    warn!(error = %message, "EFetch reported an error");
    if message.is_empty() {
        LiteratureError::Parse("EFetch returned an eFetchResult without records".to_string())
    } else {
        LiteratureError::Parse(format!("EFetch reported an error: {message}"))
    }
}

fn slice_fragment(xml: &str, start: u64, end: u64) -> Result<&str> {
    usize::try_from(start)
        .ok()
        .zip(usize::try_from(end).ok())
        .and_then(|(start, end)| xml.get(start..end))
        .map(str::trim_start)
        .ok_or_else(|| LiteratureError::Parse("EFetch record offsets out of range".to_string()))
}
