use serde_json::{Map, Value};

/// Which recovery step produced the object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// The whole reply was a JSON object.
    Strict,
    /// Text between the first `{` and the last `}`.
    BraceSpan,
    /// Contents of a fenced code block.
    FencedBlock,
    /// One of the above after dropping trailing commas.
    TrailingCommas,
}

impl RecoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::BraceSpan => "brace_span",
            Self::FencedBlock => "fenced_block",
            Self::TrailingCommas => "trailing_commas",
        }
    }
}

/// A JSON object recovered from model output.
#[derive(Clone, Debug, PartialEq)]
pub struct Recovered {
    pub value: Map<String, Value>,
    pub strategy: RecoveryStrategy,
}

/// Recover a JSON object from free-form model output.
///
/// Tries progressively looser readings of the text. Anything that does not
/// decode to an object (arrays, scalars, garbage) yields `None`.
pub fn recover_object(raw: &str) -> Option<Recovered> {
    let candidates = candidates(raw);

    for (strategy, candidate) in &candidates {
        if let Some(value) = parse_object(candidate) {
            return Some(Recovered {
                value,
                strategy: *strategy,
            });
        }
    }

    for (_, candidate) in &candidates {
        let repaired = strip_trailing_commas(candidate);
        if repaired.len() == candidate.len() {
            continue;
        }
        if let Some(value) = parse_object(&repaired) {
            return Some(Recovered {
                value,
                strategy: RecoveryStrategy::TrailingCommas,
            });
        }
    }

    None
}

fn candidates(raw: &str) -> Vec<(RecoveryStrategy, &str)> {
    let mut out = vec![(RecoveryStrategy::Strict, raw.trim())];
    if let Some(span) = brace_span(raw) {
        out.push((RecoveryStrategy::BraceSpan, span));
    }
    if let Some(block) = fenced_block(raw) {
        out.push((RecoveryStrategy::FencedBlock, block));
    }
    out
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Body of the first ``` fence, with an optional language tag removed.
fn fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    let after = &raw[open + 3..];
    let body = after.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Remove commas that directly precede `]` or `}` outside string literals.
fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some(']') | Some('}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}
