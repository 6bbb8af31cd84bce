//! Request and reply parsing.
//!
//! Requests are lenient: besides JSON, a Python-style dict with single
//! quotes is accepted. Replies are scanned for the first flat `{...}`
//! block carrying both score keys; anything else scores zero.

use serde::Serialize;
use serde_json::Value;

use crate::error::ReviewerError;

/// Highest score on either axis.
pub const SCORE_MAX: i64 = 5;

/// The score pair returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scores {
    /// How convincing the message is, `0..=5`.
    pub persuasive: u8,
    /// How much understanding the message shows, `0..=5`.
    pub empathy: u8,
}

impl Scores {
    /// The fallback answer.
    pub const ZERO: Self = Self {
        persuasive: 0,
        empathy: 0,
    };
}

/// A validated scoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    /// Conspiracy theme the message responds to.
    pub theme: String,
    /// The message being scored.
    pub input: String,
}

/// Parse a request body into a [`ReviewRequest`].
///
/// # Errors
///
/// Returns [`ReviewerError::Request`] for an empty body, a body that is
/// neither JSON nor a single-quoted dict, a non-object payload, or a blank
/// or missing `theme` / `input`.
pub fn parse_request(body: &str) -> Result<ReviewRequest, ReviewerError> {
    let raw = body.trim();
    if raw.is_empty() {
        return Err(ReviewerError::Request("empty request body".to_owned()));
    }

    let value: Value = serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(&normalise_single_quotes(raw)))
        .map_err(|e| ReviewerError::Request(format!("body is not a dict: {e}")))?;

    let Some(object) = value.as_object() else {
        return Err(ReviewerError::Request(
            "payload must be a dict with 'theme' and 'input'".to_owned(),
        ));
    };

    let field = |key: &str| {
        object
            .get(key)
            .and_then(text_of)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    };

    match (field("theme"), field("input")) {
        (Some(theme), Some(input)) => Ok(ReviewRequest { theme, input }),
        _ => Err(ReviewerError::Request(
            "missing 'theme' or 'input' field".to_owned(),
        )),
    }
}

/// String form of a scalar JSON value.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Rewrite a Python-literal dict into JSON.
///
/// Single-quoted strings become double-quoted (escaping any `"` inside),
/// and bare `True` / `False` / `None` become their JSON spellings.
/// Double-quoted strings pass through unchanged.
pub fn normalise_single_quotes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut quote: Option<char> = None;
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut String| {
        out.push_str(match word.as_str() {
            "True" => "true",
            "False" => "false",
            "None" => "null",
            other => other,
        });
        word.clear();
    };

    while let Some(c) = chars.next() {
        match quote {
            None if c.is_alphanumeric() || c == '_' => word.push(c),
            None => {
                flush(&mut word, &mut out);
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    out.push('"');
                } else {
                    out.push(c);
                }
            }
            Some(q) => match c {
                '\\' => match chars.next() {
                    Some('\'') if q == '\'' => out.push('\''),
                    Some(escaped) => {
                        out.push('\\');
                        out.push(escaped);
                    }
                    None => out.push('\\'),
                },
                c if c == q => {
                    quote = None;
                    out.push('"');
                }
                '"' => out.push_str("\\\""),
                c => out.push(c),
            },
        }
    }
    flush(&mut word, &mut out);
    out
}

/// Find the score pair in an LLM reply.
///
/// Takes the first brace block (no nested braces) that parses as a JSON
/// object holding both `persuasive` and `empathy`. That block decides:
/// its values must be integers (or integer strings) in `0..=5`, otherwise
/// the reply has no score.
pub fn extract_scores(reply: &str) -> Option<Scores> {
    let object = brace_blocks(reply)
        .filter_map(|block| serde_json::from_str::<Value>(block).ok())
        .find(|value| value.get("persuasive").is_some() && value.get("empathy").is_some())?;

    Some(Scores {
        persuasive: score_of(object.get("persuasive")?)?,
        empathy: score_of(object.get("empathy")?)?,
    })
}

/// Iterate over `{...}` spans that contain no inner braces, left to right.
fn brace_blocks(text: &str) -> impl Iterator<Item = &str> {
    let mut start: Option<usize> = None;
    text.char_indices().filter_map(move |(i, c)| match c {
        '{' => {
            start = Some(i);
            None
        }
        '}' => start.take().and_then(|s| text.get(s..=i)),
        _ => None,
    })
}

fn score_of(value: &Value) -> Option<u8> {
    let score = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if (0..=SCORE_MAX).contains(&score) {
        u8::try_from(score).ok()
    } else {
        None
    }
}
