use scraper::Html;

use veracity_common::types::{
    EvidenceItem, ProviderId, DEFAULT_SOURCE, DEFAULT_TITLE, SNIPPET_MAX_CHARS, TITLE_MAX_CHARS,
};

/// Borrowed view of one provider result before normalization.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawEvidence<'a> {
    pub title: Option<&'a str>,
    pub url: Option<&'a str>,
    pub snippet: Option<&'a str>,
    pub source: Option<&'a str>,
}

/// Convert a raw provider result into a canonical evidence item.
///
/// Returns None when the result carries no title, URL or snippet at all.
pub fn normalize(raw: RawEvidence<'_>, provider: ProviderId) -> Option<EvidenceItem> {
    let title = clean_text(raw.title.unwrap_or_default());
    let url = raw.url.unwrap_or_default().trim().to_string();
    let snippet = clean_text(raw.snippet.unwrap_or_default());

    if title.is_empty() && url.is_empty() && snippet.is_empty() {
        return None;
    }

    let source = raw
        .source
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .or_else(|| source_from_url(&url))
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let title = if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        truncate_chars(&title, TITLE_MAX_CHARS)
    };

    Some(EvidenceItem {
        title,
        url,
        snippet: truncate_chars(&snippet, SNIPPET_MAX_CHARS),
        source,
        provider,
    })
}

/// Strip markup and control characters, then collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let text = if s.contains('<') || s.contains('&') {
        strip_markup(s)
    } else {
        s.to_string()
    };

    let text: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    collapse_whitespace(&text)
}

/// Extract the text content of an HTML fragment, decoding entities and
/// dropping script/style bodies.
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut parts = Vec::new();

    for node in fragment.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript"))
        });
        if !hidden {
            parts.push(String::from(&*text.text));
        }
    }

    parts.concat()
}

pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(c);
            prev_was_space = false;
        }
    }
    result.trim().to_string()
}

/// Truncate to at most `max` chars on a char boundary, marking the cut with an ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let kept: String = s.chars().take(max - 1).collect();
    format!("{}…", kept.trim_end())
}

/// Publisher name derived from a result URL ("www." dropped).
pub fn source_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
