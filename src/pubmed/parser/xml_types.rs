//! Serde mapping of one EFetch `PubmedArticle` record
//!
//! Only the elements the engine reads are mapped; everything else is ignored
//! by serde. Every field is optional so a record with missing parts still
//! deserializes and can be judged on its own.

use serde::Deserialize;

use crate::pubmed::date::{PublicationDate, parse_month};
use crate::pubmed::models::Article;

#[derive(Debug, Deserialize)]
pub(super) struct PubmedArticleXml {
    #[serde(rename = "MedlineCitation")]
    pub medline_citation: Option<MedlineCitation>,
    #[serde(rename = "PubmedData")]
    pub pubmed_data: Option<PubmedData>,
}

impl PubmedArticleXml {
    /// PMID of the record, if it has a non-blank one
    pub fn pmid(&self) -> Option<String> {
        self.medline_citation
            .as_ref()
            .and_then(|citation| citation.pmid.as_ref())
            .map(|pmid| pmid.value.trim().to_string())
            .filter(|pmid| !pmid.is_empty())
    }

    pub fn into_article(self, id: String) -> Article {
        let (article, keyword_lists) = match self.medline_citation {
            Some(citation) => (citation.article, citation.keyword_lists),
            None => (None, Vec::new()),
        };
        let article = article.unwrap_or_default();

        let keywords = keyword_lists
            .into_iter()
            .flat_map(|list| list.keywords)
            .filter_map(|keyword| non_blank(keyword.value))
            .collect();

        let doi = article
            .elocation_ids
            .iter()
            .find(|eid| eid.id_type.as_deref() == Some("doi"))
            .and_then(|eid| non_blank(eid.value.clone()))
            .or_else(|| {
                self.pubmed_data
                    .and_then(|data| data.article_id_list)
                    .and_then(|list| {
                        list.ids
                            .into_iter()
                            .find(|aid| aid.id_type.as_deref() == Some("doi"))
                    })
                    .and_then(|aid| non_blank(aid.value))
            });

        let abstract_text = article.abstract_section.and_then(AbstractSection::into_text);

        let authors = article
            .author_list
            .map(|list| list.authors)
            .unwrap_or_default()
            .into_iter()
            .filter_map(AuthorXml::into_display_name)
            .collect();

        let journal = article.journal.unwrap_or_default();
        let issue = journal.journal_issue.unwrap_or_default();
        let publication_date = issue
            .pub_date
            .map(PubDateXml::into_date)
            .unwrap_or_default();

        Article {
            id,
            title: article
                .article_title
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            authors,
            journal: journal
                .title
                .or(journal.iso_abbreviation)
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            volume: issue.volume.and_then(non_blank),
            issue: issue.issue.and_then(non_blank),
            pages: article
                .pagination
                .and_then(|p| p.medline_pgn)
                .and_then(non_blank),
            publication_date,
            abstract_text,
            doi,
            keywords,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MedlineCitation {
    #[serde(rename = "PMID")]
    pub pmid: Option<TextNode>,
    #[serde(rename = "Article")]
    pub article: Option<ArticleXml>,
    #[serde(rename = "KeywordList", default)]
    pub keyword_lists: Vec<KeywordList>,
}

/// Element whose only interesting content is its text
#[derive(Debug, Default, Deserialize)]
pub(super) struct TextNode {
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ArticleXml {
    #[serde(rename = "Journal")]
    pub journal: Option<JournalXml>,
    #[serde(rename = "ArticleTitle")]
    pub article_title: Option<String>,
    #[serde(rename = "Pagination")]
    pub pagination: Option<Pagination>,
    #[serde(rename = "ELocationID", default)]
    pub elocation_ids: Vec<IdNode>,
    #[serde(rename = "Abstract")]
    pub abstract_section: Option<AbstractSection>,
    #[serde(rename = "AuthorList")]
    pub author_list: Option<AuthorList>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct JournalXml {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "ISOAbbreviation")]
    pub iso_abbreviation: Option<String>,
    #[serde(rename = "JournalIssue")]
    pub journal_issue: Option<JournalIssue>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct JournalIssue {
    #[serde(rename = "Volume")]
    pub volume: Option<String>,
    #[serde(rename = "Issue")]
    pub issue: Option<String>,
    #[serde(rename = "PubDate")]
    pub pub_date: Option<PubDateXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubDateXml {
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Day")]
    pub day: Option<String>,
    #[serde(rename = "MedlineDate")]
    pub medline_date: Option<String>,
}

impl PubDateXml {
    fn into_date(self) -> PublicationDate {
        match (self.year, self.medline_date) {
            (Some(year), _) => PublicationDate::from_parts(
                year.trim().parse().ok(),
                self.month.as_deref().and_then(parse_month),
                self.day.and_then(|d| d.trim().parse().ok()),
            ),
            (None, Some(medline_date)) => PublicationDate::parse(&medline_date),
            (None, None) => PublicationDate::unknown(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct Pagination {
    #[serde(rename = "MedlinePgn")]
    pub medline_pgn: Option<String>,
}

/// Typed identifier such as `<ELocationID EIdType="doi">` or `<ArticleId IdType="doi">`
#[derive(Debug, Deserialize)]
pub(super) struct IdNode {
    #[serde(rename = "$text", default)]
    pub value: String,
    #[serde(rename = "@EIdType", alias = "@IdType")]
    pub id_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AbstractSection {
    #[serde(rename = "AbstractText", default)]
    pub texts: Vec<AbstractTextXml>,
}

impl AbstractSection {
    /// Join the abstract sections, prefixing structured ones with their label
    fn into_text(self) -> Option<String> {
        let parts: Vec<String> = self
            .texts
            .into_iter()
            .filter_map(|section| {
                let text = non_blank(section.text)?;
                Some(match section.label.and_then(non_blank) {
                    Some(label) => format!("{label}: {text}"),
                    None => text,
                })
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AbstractTextXml {
    #[serde(rename = "$text", default)]
    pub text: String,
    #[serde(rename = "@Label")]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorList {
    #[serde(rename = "Author", default)]
    pub authors: Vec<AuthorXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorXml {
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "ForeName")]
    pub fore_name: Option<String>,
    #[serde(rename = "Initials")]
    pub initials: Option<String>,
    #[serde(rename = "CollectiveName")]
    pub collective_name: Option<String>,
}

impl AuthorXml {
    /// Citation form: `"Wu F"`, the fore name when initials are missing, or
    /// the collective name for group authors
    fn into_display_name(self) -> Option<String> {
        if let Some(collective) = self.collective_name.and_then(non_blank) {
            return Some(collective);
        }

        let last_name = self.last_name.and_then(non_blank);
        let given = self
            .initials
            .and_then(non_blank)
            .or_else(|| self.fore_name.and_then(non_blank));

        match (last_name, given) {
            (Some(last), Some(given)) => Some(format!("{last} {given}")),
            (Some(last), None) => Some(last),
            (None, given) => given,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct KeywordList {
    #[serde(rename = "Keyword", default)]
    pub keywords: Vec<TextNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedData {
    #[serde(rename = "ArticleIdList")]
    pub article_id_list: Option<ArticleIdList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleIdList {
    #[serde(rename = "ArticleId", default)]
    pub ids: Vec<IdNode>,
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
