//! Minimal ini reader for profile files.
//!
//! Supports `[section]` headers, `key = value` lines, and `#`/`;` comments,
//! either on their own line or trailing after whitespace (`vim # editor`).
//! Inside double quotes `#` and `;` are literal.
//! Entries keep document order; a repeated key replaces the earlier value
//! in place.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IniError {
    #[error("line {line}: entry outside of any [section]")]
    NoSection { line: usize },

    #[error("line {line}: expected `key = value`, found '{text}'")]
    Malformed { line: usize, text: String },

    #[error("line {line}: unterminated section header")]
    BadHeader { line: usize },
}

/// One `[section]` and its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// A parsed ini document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Parse ini text. Repeated section headers merge into the first occurrence.
pub fn parse(content: &str) -> Result<Document, IniError> {
    let mut doc = Document::default();
    let mut current: Option<usize> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw.trim());

        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or(IniError::BadHeader { line: line_no })?
                .trim();
            let pos = match doc.sections.iter().position(|s| s.name == name) {
                Some(pos) => pos,
                None => {
                    doc.sections.push(Section {
                        name: name.to_string(),
                        entries: Vec::new(),
                    });
                    doc.sections.len() - 1
                }
            };
            current = Some(pos);
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| IniError::Malformed {
            line: line_no,
            text: line.to_string(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(IniError::Malformed {
                line: line_no,
                text: line.to_string(),
            });
        }

        let section = current.ok_or(IniError::NoSection { line: line_no })?;
        let value = value.trim().trim_matches('"');
        doc.sections[section].set(key.to_string(), value.to_string());
    }

    Ok(doc)
}

/// Cut a comment that starts the line or follows whitespace outside quotes.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut prev_space = true;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' | ';' if !quoted && prev_space => return line[..i].trim_end(),
            _ => {}
        }
        prev_space = c.is_whitespace();
    }
    line
}
