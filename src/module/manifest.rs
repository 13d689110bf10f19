//! `META-INF/MANIFEST.MF` reader and writer
//!
//! Only the main section is interpreted. Attribute order is kept as read and
//! any per-entry sections after the first blank line are written back
//! untouched.

use thiserror::Error;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
pub const CLASS_PATH: &str = "Class-Path";

const MANIFEST_VERSION: &str = "Manifest-Version";
const MAX_LINE_BYTES: usize = 72;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Malformed manifest line {line}: {content}")]
    Malformed { line: usize, content: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    main: Vec<(String, String)>,
    sections: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    pub fn new() -> Self {
        Self {
            main: vec![(MANIFEST_VERSION.to_string(), "1.0".to_string())],
            sections: Vec::new(),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, ManifestError> {
        let text = std::str::from_utf8(bytes)?;
        let mut main: Vec<(String, String)> = Vec::new();
        let mut sections = Vec::new();
        let mut in_main = true;

        for (index, raw) in text.split('\n').enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if !in_main {
                sections.push(line.to_string());
                continue;
            }
            if line.is_empty() {
                in_main = false;
                continue;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                match main.last_mut() {
                    Some((_, value)) => value.push_str(continuation),
                    None => {
                        return Err(ManifestError::Malformed {
                            line: index + 1,
                            content: line.to_string(),
                        })
                    }
                }
                continue;
            }
            match line.split_once(": ") {
                Some((key, value)) if !key.is_empty() => {
                    main.push((key.to_string(), value.to_string()));
                }
                _ => {
                    return Err(ManifestError::Malformed {
                        line: index + 1,
                        content: line.to_string(),
                    })
                }
            }
        }

        while sections.last().is_some_and(|line: &String| line.is_empty()) {
            sections.pop();
        }
        Ok(Self { main, sections })
    }

    /// Attribute names are compared case-insensitively
    pub fn get(&self, key: &str) -> Option<&str> {
        self.main
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .main
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
        {
            Some((_, existing)) => *existing = value,
            None => self.main.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let position = self
            .main
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(key))?;
        Some(self.main.remove(position).1)
    }

    /// `Class-Path` tokens, empty when the attribute is absent
    pub fn class_path(&self) -> Vec<String> {
        self.get(CLASS_PATH)
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn set_class_path(&mut self, tokens: &[String]) {
        self.set(CLASS_PATH, tokens.join(" "));
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        for (key, value) in &self.main {
            write_wrapped(&mut out, &format!("{key}: {value}"));
        }
        out.push_str("\r\n");
        if !self.sections.is_empty() {
            for line in &self.sections {
                out.push_str(line);
                out.push_str("\r\n");
            }
            out.push_str("\r\n");
        }
        out.into_bytes()
    }
}

/// Splits a header line into 72-byte physical lines, never inside a UTF-8 sequence
fn write_wrapped(out: &mut String, line: &str) {
    let mut rest = line;
    let mut limit = MAX_LINE_BYTES;
    loop {
        if rest.len() <= limit {
            out.push_str(rest);
            out.push_str("\r\n");
            return;
        }
        let mut split = limit;
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        out.push_str(&rest[..split]);
        out.push_str("\r\n ");
        rest = &rest[split..];
        limit = MAX_LINE_BYTES - 1;
    }
}
