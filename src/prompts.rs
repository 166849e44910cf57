//! Static table of prompts and their spy-facing redactions.

use serde::Deserialize;
use std::path::Path;

use crate::config::ConfigError;

/// Marker used in redacted prompts in place of the hidden words
pub const REDACTION_MARKER: &str = "XXXX";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptEntry {
    pub full_text: String,
    pub redacted_text: String,
}

/// Built-in (full, redacted) prompt pairs
const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    (
        "How might we design a ritual for the end of the world?",
        "How might we design a XXXX for the XXXX of the XXXX?",
    ),
    (
        "How might we reinvent eating for zero-gravity environments?",
        "How might we reinvent XXXX for XXXX-XXXX XXXX?",
    ),
    (
        "How might we create a dating experience for pets?",
        "How might we create a XXXX XXXX for XXXX?",
    ),
    (
        "How might we build trust between strangers in public spaces?",
        "How might we build XXXX between XXXX in XXXX XXXX?",
    ),
    (
        "How might we design a workplace that nurtures introverts?",
        "How might we design a XXXX that XXXX XXXX?",
    ),
    (
        "How might we help people share food without touching it?",
        "How might we help people XXXX XXXX without XXXX it?",
    ),
    (
        "How might we design a shop that sells no physical products?",
        "How might we design a XXXX that sells no XXXX XXXX?",
    ),
    (
        "How might we help people express their mood through wearable technology?",
        "How might we help people XXXX their XXXX through XXXX XXXX?",
    ),
    (
        "How might we enable neighbors to share and trade electricity?",
        "How might we enable XXXX to XXXX and XXXX XXXX?",
    ),
    (
        "How might we design a communication tool that doesn't use words?",
        "How might we design a XXXX XXXX that doesn't use XXXX?",
    ),
];

/// Ordered, fixed table of prompt pairs. Never mutated after startup.
#[derive(Debug, Clone)]
pub struct PromptTable {
    entries: Vec<PromptEntry>,
}

impl PromptTable {
    /// Build a table, rejecting an empty table or blank texts
    pub fn new(entries: Vec<PromptEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::InvalidPrompts(
                "prompt table must not be empty".to_string(),
            ));
        }
        if let Some(i) = entries
            .iter()
            .position(|e| e.full_text.trim().is_empty() || e.redacted_text.trim().is_empty())
        {
            return Err(ConfigError::InvalidPrompts(format!(
                "prompt entry {} has an empty text",
                i
            )));
        }
        Ok(Self { entries })
    }

    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_PROMPTS
                .iter()
                .map(|(full, redacted)| PromptEntry {
                    full_text: full.to_string(),
                    redacted_text: redacted.to_string(),
                })
                .collect(),
        }
    }

    /// Load a JSON array of `{fullText, redactedText}` objects
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidPrompts(format!("cannot read {}: {}", path.display(), e))
        })?;
        let entries: Vec<PromptEntry> = serde_json::from_str(&raw).map_err(|e| {
            ConfigError::InvalidPrompts(format!("cannot parse {}: {}", path.display(), e))
        })?;
        Self::new(entries)
    }

    pub fn get(&self, index: usize) -> Option<&PromptEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PromptEntry] {
        &self.entries
    }
}

impl Default for PromptTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table() {
        let table = PromptTable::builtin();
        assert_eq!(table.len(), 10);
        for entry in table.entries() {
            assert!(entry.redacted_text.contains(REDACTION_MARKER));
            assert_ne!(entry.full_text, entry.redacted_text);
        }
        assert!(table.get(10).is_none());
    }

    #[test]
    fn test_rejects_empty_table() {
        let result = PromptTable::new(vec![]);
        assert!(matches!(result, Err(ConfigError::InvalidPrompts(_))));
    }

    #[test]
    fn test_rejects_blank_entry() {
        let result = PromptTable::new(vec![PromptEntry {
            full_text: "How might we?".to_string(),
            redacted_text: "  ".to_string(),
        }]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"fullText":"How might we fly?","redactedText":"How might we XXXX?"}}]"#
        )
        .unwrap();

        let table = PromptTable::from_file(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().redacted_text, "How might we XXXX?");
    }

    #[test]
    fn test_from_file_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(PromptTable::from_file(file.path()).is_err());
    }
}
