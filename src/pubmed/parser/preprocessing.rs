//! XML cleanup applied before EFetch payloads are deserialized

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

/// Strip inline formatting tags (`<i>`, `<sup>`, `<sub>`, `<b>`, ...) and
/// MathML markup from XML, keeping their text
///
/// These tags appear inside `ArticleTitle` and `AbstractText`, with or
/// without attributes, and turn the text into mixed content, which the serde
/// deserializer cannot map onto a plain string.
pub(crate) fn strip_inline_html_tags(xml: &str) -> String {
    static INLINE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = INLINE_TAG_REGEX.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub|em|strong|italic|bold|mml:[A-Za-z]+)(?:\s[^>]*)?/?>")
            .expect("Failed to compile inline tag regex")
    });

    let cleaned = re.replace_all(xml, "");

    if cleaned.len() != xml.len() {
        debug!(
            original_bytes = xml.len(),
            cleaned_bytes = cleaned.len(),
            "Stripped inline HTML tags"
        );
    }

    cleaned.into_owned()
}
