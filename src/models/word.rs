use serde::{Deserialize, Serialize};

/// A stored word. The text is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Word {
    text: String,
}

impl Word {
    pub fn new(text: impl Into<String>) -> Result<Self, String> {
        let text = text.into();

        if text.is_empty() {
            return Err("Word is required".to_string());
        }

        Ok(Word { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Payload accepted by `POST /store`.
/// A missing `word` field decodes to an empty string and fails validation.
#[derive(Debug, Deserialize)]
pub struct StoreWordRequest {
    #[serde(default)]
    pub word: String,
}

impl StoreWordRequest {
    pub fn into_word(self) -> Result<Word, String> {
        Word::new(self.word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_rejects_empty_text() {
        assert!(Word::new("").is_err());
        assert_eq!(Word::new("example").unwrap().text(), "example");
    }

    #[test]
    fn test_word_keeps_text_verbatim() {
        // Presence is the only check; whitespace is stored as given.
        let word = Word::new("  spaced ").unwrap();
        assert_eq!(word.into_text(), "  spaced ");
    }

    #[test]
    fn test_words_serialize_as_plain_strings() {
        let words = vec![Word::new("word1").unwrap(), Word::new("word2").unwrap()];
        assert_eq!(serde_json::to_string(&words).unwrap(), r#"["word1","word2"]"#);
    }

    #[test]
    fn test_store_word_request_deserialization() {
        let request: StoreWordRequest = serde_json::from_str(r#"{"word":"example"}"#).unwrap();
        assert_eq!(request.into_word().unwrap().text(), "example");

        let missing: StoreWordRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.into_word().unwrap_err(), "Word is required");

        assert!(serde_json::from_str::<StoreWordRequest>(r#"{"word":42}"#).is_err());
        assert!(serde_json::from_str::<StoreWordRequest>("not json").is_err());
    }
}
