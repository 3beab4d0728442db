//! RFC 6570 URI templates
//!
//! Supported expressions:
//!
//! | Template    | Meaning                              | `a = "x y"`, `b = "1"` |
//! |-------------|--------------------------------------|------------------------|
//! | `{a}`       | simple, fully percent-encoded        | `x%20y`                |
//! | `{a,b}`     | several simple values, comma-joined  | `x%20y,1`              |
//! | `{+a}`      | reserved characters left untouched   | `x%20y`                |
//! | `{?a,b}`    | form-style query                     | `?a=x%20y&b=1`         |
//! | `{&a}`      | query continuation                   | `&a=x%20y`             |
//!
//! Every variable named by the template is required. Prefix and explode
//! modifiers and the remaining level-3 operators are rejected at parse time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use adpost_domain::HalError;
use thiserror::Error;

/// Reserved set of RFC 3986 (gen-delims and sub-delims).
const RESERVED: &[u8] = b":/?#[]@!$&'()*+,;=";

/// Template parsing or expansion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unterminated expression starting at byte {0}")]
    Unterminated(usize),

    #[error("unexpected '}}' at byte {0}")]
    UnmatchedClose(usize),

    #[error("unsupported template operator '{0}'")]
    UnsupportedOperator(char),

    #[error("unsupported variable modifier in '{0}'")]
    UnsupportedModifier(String),

    #[error("empty variable name in expression '{{{0}}}'")]
    EmptyVariable(String),

    #[error("missing value for template variable '{0}'")]
    MissingVariable(String),
}

impl TemplateError {
    /// Attach the relation being resolved.
    #[must_use]
    pub fn into_hal_error(self, relation: &str) -> HalError {
        match self {
            Self::MissingVariable(parameter) => {
                HalError::TemplateParameterMissing { relation: relation.to_string(), parameter }
            }
            other => HalError::InvalidUri(format!("template of relation '{relation}': {other}")),
        }
    }
}

/// Variable bindings for template expansion.
///
/// Values are stored as strings; anything `ToString` (ids, numbers) can be
/// bound directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateParams(BTreeMap<String, String>);

impl TemplateParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.insert(name.into(), value.to_string());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for TemplateParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    Reserved,
    Query,
    QueryContinuation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression { operator: Operator, variables: Vec<String> },
}

/// Parsed URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parse a template string.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut cursor = 0;

        while cursor < template.len() {
            let remaining = &template[cursor..];
            let Some(pos) = remaining.find(['{', '}']) else {
                parts.push(Part::Literal(remaining.to_string()));
                break;
            };

            if pos > 0 {
                parts.push(Part::Literal(remaining[..pos].to_string()));
            }
            let start = cursor + pos;
            if remaining[pos..].starts_with('}') {
                return Err(TemplateError::UnmatchedClose(start));
            }

            let body_start = start + 1;
            let close =
                template[body_start..].find('}').ok_or(TemplateError::Unterminated(start))?;
            let body = &template[body_start..body_start + close];
            if body.contains('{') {
                return Err(TemplateError::Unterminated(start));
            }

            parts.push(parse_expression(body)?);
            cursor = body_start + close + 1;
        }

        Ok(Self { source: template.to_string(), parts })
    }

    /// Original template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of all variables, in template order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Literal(_) => None,
                Part::Expression { variables, .. } => Some(variables),
            })
            .flatten()
            .map(String::as_str)
    }

    /// Expand with `params`. Unused bindings are ignored.
    pub fn expand(&self, params: &TemplateParams) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());

        for part in &self.parts {
            let (operator, variables) = match part {
                Part::Literal(text) => {
                    out.push_str(text);
                    continue;
                }
                Part::Expression { operator, variables } => (*operator, variables),
            };

            for (index, name) in variables.iter().enumerate() {
                let value = params
                    .get(name)
                    .ok_or_else(|| TemplateError::MissingVariable(name.clone()))?;

                match operator {
                    Operator::Simple | Operator::Reserved if index > 0 => out.push(','),
                    Operator::Simple | Operator::Reserved => {}
                    Operator::Query | Operator::QueryContinuation => {
                        let lead = operator == Operator::Query && index == 0;
                        out.push(if lead { '?' } else { '&' });
                        out.push_str(name);
                        out.push('=');
                    }
                }

                if operator == Operator::Reserved {
                    push_reserved(value, &mut out);
                } else {
                    out.push_str(&urlencoding::encode(value));
                }
            }
        }

        Ok(out)
    }
}

impl FromStr for UriTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_expression(body: &str) -> Result<Part, TemplateError> {
    let (operator, names) = match body.chars().next() {
        Some('+') => (Operator::Reserved, &body[1..]),
        Some('?') => (Operator::Query, &body[1..]),
        Some('&') => (Operator::QueryContinuation, &body[1..]),
        Some(op @ ('#' | '.' | '/' | ';' | '=' | ',' | '!' | '@' | '|')) => {
            return Err(TemplateError::UnsupportedOperator(op));
        }
        _ => (Operator::Simple, body),
    };

    let mut variables = Vec::new();
    for raw in names.split(',') {
        let name = raw.trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyVariable(body.to_string()));
        }
        if name.contains(':') || name.ends_with('*') {
            return Err(TemplateError::UnsupportedModifier(name.to_string()));
        }
        variables.push(name.to_string());
    }

    Ok(Part::Expression { operator, variables })
}

const fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Percent-encode everything outside the unreserved and reserved sets,
/// keeping existing `%XX` triplets intact.
fn push_reserved(value: &str, out: &mut String) {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        let is_triplet = byte == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit();

        if is_triplet {
            out.push_str(&value[i..i + 3]);
            i += 3;
            continue;
        }
        if is_unreserved(byte) || RESERVED.contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
        i += 1;
    }
}
