//! Validation data: questions paired with reference answers.
//!
//! Supports the built-in set for the bundled thesis and custom JSON files of
//! the form:
//! ```json
//! {
//!   "name": "my_set",
//!   "items": [
//!     { "question": "What is X?", "ideal_answer": "X is Y" }
//!   ]
//! }
//! ```

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A question with the answer a perfect chatbot would give.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationItem {
    pub question: String,
    pub ideal_answer: String,
}

impl ValidationItem {
    pub fn new(question: impl Into<String>, ideal_answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ideal_answer: ideal_answer.into(),
        }
    }
}

/// A named collection of validation items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSet {
    pub name: String,
    pub items: Vec<ValidationItem>,
}

impl ValidationSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: ValidationItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Load from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RagError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| RagError::Serialization(format!("{}: {}", path.display(), e)))
    }

    /// The three questions about the thesis on formal verification of
    /// hypergeometric recurrences that ship with the chatbot.
    pub fn builtin() -> Self {
        let mut set = Self::new("examensarbete");

        set.add_item(ValidationItem::new(
            "Vad handlar examensarbetet om?",
            "Examensarbetet handlar om att avgöra om utdatan från en algoritm är ett heltal eller inte. Ett exempel på en sådan algoritm är en hiss som åker till olika våningsplan. Arbetet undersöker även samhälliga och etiska aspekter av algoritmer och deras betydelse i olika sammanhang, såsom självkörande bilar, optimering av poliskontroller och sökresultat. En viktig aspekt är också kontrollen av korrektheten av resultaten och resursanvändning vid körning av algoritmer.",
        ));

        set.add_item(ValidationItem::new(
            "Vilken metod användes?",
            "En metod som användes var att lagra en lång lista med slumptal i spelets minne. En annan, bättre metod var att använda en algoritm som använder sin utdatan som indata.",
        ));

        set.add_item(ValidationItem::new(
            "Vad är slutsatsen i arbetet?",
            "Det vet jag inte. Texten beskriver arbetets innehåll och struktur, men presenterar inte någon slutsats.",
        ));

        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_set() {
        let set = ValidationSet::builtin();
        assert_eq!(set.len(), 3);
        assert!(
            set.items
                .iter()
                .all(|i| !i.question.is_empty() && !i.ideal_answer.is_empty())
        );
        assert!(set.items[2].ideal_answer.starts_with("Det vet jag inte"));
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("set.json");
        fs::write(
            &path,
            r#"{"name": "custom", "items": [{"question": "Q1?", "ideal_answer": "A1"}]}"#,
        )
        .unwrap();

        let set = ValidationSet::load_json(&path).unwrap();
        assert_eq!(set.name, "custom");
        assert_eq!(set.len(), 1);
        assert_eq!(set.items[0].ideal_answer, "A1");
    }

    #[test]
    fn test_load_json_rejects_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("set.json");
        fs::write(&path, r#"{"name": "custom", "items": [{"question": "Q1?"}]}"#).unwrap();

        assert!(matches!(
            ValidationSet::load_json(&path),
            Err(RagError::Serialization(_))
        ));
    }
}
