// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parsed message templates.
//!
//! A template is plain text with named placeholders. Both the catalog
//! spelling `<name>` and the brace spelling `{name}` are recognised; a name
//! is one or more ASCII alphanumerics or underscores. Any `<` or `{` that
//! does not open a well-formed placeholder is kept as literal text, so
//! messages such as `"value < 5"` need no escaping.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Placeholder(String),
}

/// A message template, parsed once into text and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl Template {
    /// Parse `source` into a template. Parsing never fails.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source.as_str();

        while let Some(pos) = rest.find(['<', '{']) {
            let close = if rest.as_bytes()[pos] == b'<' { '>' } else { '}' };
            let after = &rest[pos + 1..];
            let name_len = after
                .find(|c: char| !is_name_char(c))
                .unwrap_or(after.len());

            if name_len > 0 && after[name_len..].starts_with(close) {
                text.push_str(&rest[..pos]);
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Placeholder(after[..name_len].to_owned()));
                rest = &after[name_len + 1..];
            } else {
                text.push_str(&rest[..=pos]);
                rest = after;
            }
        }
        text.push_str(rest);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Self { source, segments }
    }

    /// The unparsed template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance (repeats included).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Substitute `params` into the template.
    ///
    /// Returns the name of the first placeholder with no supplied value on
    /// failure. Parameters the template does not mention are ignored.
    pub fn render<'a>(&'a self, params: &BTreeMap<String, String>) -> Result<String, &'a str> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Placeholder(name) => match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => return Err(name.as_str()),
                },
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
