//! Minimal section/key document used for run configuration files.
//!
//! Sections keep their insertion order; keys are matched without regard to
//! ASCII case. Lines starting with `#` or `;` are comments. Both `key = value`
//! and `key: value` are accepted on read; output always uses `key = value`.

use crate::types::{FireError, FireResult};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

#[derive(Debug, Clone, PartialEq)]
struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse ini text
    pub fn parse(text: &str) -> FireResult<Self> {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for (line_no, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| {
                    FireError::config("", "", format!("line {}: unterminated section header", line_no + 1))
                })?;
                current = Some(doc.section_index_or_insert(name.trim()));
                continue;
            }

            let section = current.ok_or_else(|| {
                FireError::config("", "", format!("line {}: entry before any section", line_no + 1))
            })?;
            let split = line
                .find(|c| c == '=' || c == ':')
                .ok_or_else(|| {
                    FireError::config(
                        &doc.sections[section].name,
                        line,
                        format!("line {}: expected 'key = value'", line_no + 1),
                    )
                })?;
            let key = line[..split].trim();
            let value = line[split + 1..].trim();
            doc.sections[section].set(key, value);
        }

        Ok(doc)
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(IniSection {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        }
    }

    /// Add an empty section if it does not exist yet
    pub fn add_section(&mut self, name: &str) {
        self.section_index_or_insert(name);
    }

    /// Set a value, creating the section when needed
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let idx = self.section_index_or_insert(section);
        self.sections[idx].set(key, &value.into());
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)
            .and_then(|s| s.get(key))
    }

    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.iter().any(|s| s.name == section)
    }

    /// Value that must be present
    pub fn require(&self, section: &str, key: &str) -> FireResult<&str> {
        self.get(section, key)
            .ok_or_else(|| FireError::config(section, key, "missing required key"))
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// Keys of a section in insertion order
    pub fn keys(&self, section: &str) -> Vec<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)
            .map(|s| s.entries.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }
}

impl IniSection {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{} = {}", key, value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_comments() {
        let text = "\
# run template
[InDirectory]
BaseDirectory = /data/viirs

[Thresholds]
M07UB: 0.19
; trailing comment
rth = 0.81
";
        let doc = IniDocument::parse(text).unwrap();
        assert_eq!(doc.section_names(), vec!["InDirectory", "Thresholds"]);
        assert_eq!(doc.get("InDirectory", "basedirectory"), Some("/data/viirs"));
        assert_eq!(doc.get("Thresholds", "m07ub"), Some("0.19"));
        assert_eq!(doc.get("Thresholds", "Rth"), Some("0.81"));
        assert!(doc.get("thresholds", "Rth").is_none());
    }

    #[test]
    fn test_write_then_parse() {
        let mut doc = IniDocument::new();
        doc.set("ImageDates", "ImageDates", "d20130503_t2104190,d20130504_t2045478");
        doc.set("DataBaseInfo", "password", "a=b");

        let text = doc.to_string();
        assert!(text.starts_with("[ImageDates]\nImageDates = d20130503_t2104190,"));

        let parsed = IniDocument::parse(&text).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(parsed.get("DataBaseInfo", "password"), Some("a=b"));
    }

    #[test]
    fn test_entry_outside_section_fails() {
        assert!(IniDocument::parse("key = value\n").is_err());
        assert!(IniDocument::parse("[Open\n").is_err());
    }

    #[test]
    fn test_require_reports_location() {
        let doc = IniDocument::parse("[Thresholds]\nRth = 0.8\n").unwrap();
        match doc.require("Thresholds", "RthLB") {
            Err(FireError::ConfigParse { section, key, .. }) => {
                assert_eq!(section, "Thresholds");
                assert_eq!(key, "RthLB");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
