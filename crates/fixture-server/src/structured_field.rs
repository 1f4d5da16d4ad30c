//! Serialization of RFC 8941 dictionaries whose members are string items.

use crate::error::{FixtureServerError, Result};

/// An ordered structured-field dictionary of string items without parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringDictionary {
    members: Vec<(String, String)>,
}

impl StringDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a member. Replacing keeps the member's original position.
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.members.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.members.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Render as a header value, e.g. `sig="abc", keyid="main"`.
    pub fn serialize(&self) -> Result<String> {
        let mut rendered = Vec::with_capacity(self.members.len());
        for (key, value) in &self.members {
            validate_key(key)?;
            rendered.push(format!("{key}={}", serialize_string(value)?));
        }
        Ok(rendered.join(", "))
    }
}

/// `key = ( lcalpha / "*" ) *( lcalpha / DIGIT / "_" / "-" / "." / "*" )`
fn validate_key(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let valid_first = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '*');
    let valid_rest = chars.all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '*')
    });
    if valid_first && valid_rest {
        Ok(())
    } else {
        Err(FixtureServerError::StructuredField(format!(
            "invalid dictionary key {key:?}"
        )))
    }
}

/// Strings may only hold printable ASCII; `"` and `\` are escaped.
fn serialize_string(value: &str) -> Result<String> {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if !(' '..='~').contains(&c) {
            return Err(FixtureServerError::StructuredField(format!(
                "string item contains non-printable or non-ASCII character {c:?}"
            )));
        }
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Ok(out)
}
