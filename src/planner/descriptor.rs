//! Descriptor file format.
//!
//! The persisted plan is a sequence of `key = value` declarations consumed
//! by the execution stage. Configuration-specific values use suffixed keys
//! (`<base-key>_<configuration>`). List values are `;`-joined; option
//! strings inside a list entry carry `;` as the `@LSEP@` sub-separator.

use crate::util::list::join_list;

/// An ordered sequence of key/value declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    entries: Vec<(String, String)>,
}

impl Descriptor {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Descriptor::default()
    }

    /// Append a declaration.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Append a declaration holding a `;`-joined list.
    pub fn push_list<S: AsRef<str>>(&mut self, key: impl Into<String>, items: &[S]) {
        self.push(key, join_list(items));
    }

    /// First value declared for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All declarations, in order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Render to the persisted text form.
    pub fn render(&self) -> String {
        let mut out = String::from("# Autogen plan. Generated file, do not edit.\n");
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(&escape_value(value));
            out.push('\n');
        }
        out
    }

    /// Parse the persisted text form back into declarations.
    ///
    /// Unrecognized lines (comments, blanks) are skipped.
    pub fn parse(text: &str) -> Descriptor {
        let mut descriptor = Descriptor::new();
        for line in text.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once(" = ") {
                descriptor.push(key, unescape_value(value));
            }
        }
        descriptor
    }
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
