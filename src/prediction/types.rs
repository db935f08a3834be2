// SPDX-License-Identifier: GPL-3.0-only

//! Prediction data types and response decoding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::layout::KeyId;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while talking to a prediction service.
///
/// These never reach the user: `PredictionClient` logs them and falls back
/// to an empty `ConfidenceMap`.
#[derive(Debug)]
pub enum PredictionError {
    /// The request could not be sent or the body could not be read
    Transport(reqwest::Error),
    /// The service answered with a non-success HTTP status
    Status(u16),
    /// No answer arrived within the request timeout
    Timeout {
        /// The timeout that elapsed, in milliseconds
        after_ms: u64,
    },
    /// The body was not the expected array of predictions
    Malformed {
        /// What was wrong with the payload
        reason: String,
        /// The underlying JSON error, if any
        source: Option<serde_json::Error>,
    },
}

impl PredictionError {
    /// Creates a malformed-payload error from a JSON error.
    pub fn malformed(reason: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Malformed {
            reason: reason.into(),
            source: Some(source),
        }
    }
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionError::Transport(e) => write!(f, "prediction transport failed: {}", e),
            PredictionError::Status(code) => {
                write!(f, "prediction service returned HTTP {}", code)
            }
            PredictionError::Timeout { after_ms } => {
                write!(f, "prediction timed out after {}ms", after_ms)
            }
            PredictionError::Malformed { reason, source } => {
                write!(f, "malformed prediction response: {}", reason)?;
                if let Some(e) = source {
                    write!(f, " ({})", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PredictionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PredictionError::Transport(e) => Some(e),
            PredictionError::Malformed {
                source: Some(e), ..
            } => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// One entry of the next-character response: `{ "character": "r", "confidence": 0.8 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharPrediction {
    /// A single letter, or `SPACE` / `BACKSPACE`
    pub character: String,
    /// Likelihood in [0, 1]
    pub confidence: f32,
}

impl CharPrediction {
    /// Creates a new entry.
    pub fn new(character: impl Into<String>, confidence: f32) -> Self {
        Self {
            character: character.into(),
            confidence,
        }
    }
}

/// One entry of the next-word response: `{ "word": "store", "confidence": 0.6 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPrediction {
    /// A word from the requested word list
    pub word: String,
    /// Likelihood in [0, 1]
    pub confidence: f32,
}

/// Request body for `/predict-char`.
#[derive(Debug, Clone, Serialize)]
pub struct CharRequest<'a> {
    /// Everything typed so far
    pub text: &'a str,
}

/// Request body for `/predict-word`.
#[derive(Debug, Clone, Serialize)]
pub struct WordRequest<'a> {
    /// Everything typed so far
    pub text: &'a str,
    /// Candidate words the service must choose from
    pub word_list: &'a [String],
}

/// Decodes a `/predict-char` response body.
///
/// Accepts a JSON array of entries, or a JSON string whose content is such
/// an array (the reference server double-encodes its answer).
pub fn decode_char_response(body: &[u8]) -> Result<Vec<CharPrediction>, PredictionError> {
    let value = decode_value(body)?;
    serde_json::from_value(value)
        .map_err(|e| PredictionError::malformed("expected an array of {character, confidence}", e))
}

/// Decodes a `/predict-word` response body.
pub fn decode_word_response(body: &[u8]) -> Result<Vec<WordPrediction>, PredictionError> {
    let value = decode_value(body)?;
    serde_json::from_value(value)
        .map_err(|e| PredictionError::malformed("expected an array of {word, confidence}", e))
}

fn decode_value(body: &[u8]) -> Result<serde_json::Value, PredictionError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| PredictionError::malformed("body is not JSON", e))?;

    match value {
        serde_json::Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| PredictionError::malformed("string body is not JSON", e)),
        other => Ok(other),
    }
}

// ============================================================================
// Confidence Map
// ============================================================================

/// Mapping from key to the confidence that it is typed next.
///
/// Inserting the same key twice keeps the last value. Confidences are
/// clamped into [0, 1]; non-finite values are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfidenceMap {
    entries: HashMap<KeyId, f32>,
}

impl ConfidenceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from service entries, skipping characters that are not keys.
    ///
    /// ENTER and SHIFT never carry a prediction, so service entries naming
    /// them are dropped.
    pub fn from_predictions(predictions: &[CharPrediction]) -> Self {
        let mut map = Self::new();
        for prediction in predictions {
            match prediction.character.parse::<KeyId>() {
                Ok(key @ (KeyId::Enter | KeyId::Shift)) => {
                    tracing::debug!("Skipping prediction for {}", key);
                }
                Ok(key) => {
                    map.insert(key, prediction.confidence);
                }
                Err(e) => tracing::debug!("Skipping prediction entry: {}", e),
            }
        }
        map
    }

    /// Inserts a confidence, replacing any earlier value for the key.
    ///
    /// Returns `false` if the value was not finite and was dropped.
    pub fn insert(&mut self, key: KeyId, confidence: f32) -> bool {
        if !confidence.is_finite() {
            return false;
        }
        self.entries.insert(key, confidence.clamp(0.0, 1.0));
        true
    }

    /// Returns the confidence for a key, if predicted.
    pub fn get(&self, key: &KeyId) -> Option<f32> {
        self.entries.get(key).copied()
    }

    /// Iterates over (key, confidence) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, f32)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    /// Returns the number of predicted keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was predicted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(KeyId, f32)> for ConfidenceMap {
    fn from_iter<I: IntoIterator<Item = (KeyId, f32)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, confidence) in iter {
            map.insert(key, confidence);
        }
        map
    }
}

/// Result of one prediction cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    /// Last character of the text the prediction was made for
    pub trailing: Option<char>,
    /// Confidence of each predicted next key
    pub confidences: ConfidenceMap,
}

impl Prediction {
    /// A prediction with no emphasis for the given text.
    pub fn empty_for(text: &str) -> Self {
        Self {
            trailing: text.chars().last(),
            confidences: ConfidenceMap::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_array() {
        let body = br#"[{"character":"r","confidence":0.8},{"character":"e","confidence":0.1}]"#;
        let entries = decode_char_response(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], CharPrediction::new("r", 0.8));
    }

    #[test]
    fn test_decode_double_encoded_array() {
        let body = br#""[{\"character\": \"p\", \"confidence\": 0.1}]""#;
        let entries = decode_char_response(body).unwrap();
        assert_eq!(entries, vec![CharPrediction::new("p", 0.1)]);
    }

    #[test]
    fn test_decode_rejects_deviations() {
        // Not JSON
        assert!(decode_char_response(b"[(\"r\", 0.8)]").is_err());
        // Not an array
        assert!(decode_char_response(br#"{"character": "r"}"#).is_err());
        // Missing confidence
        assert!(decode_char_response(br#"[{"character": "r"}]"#).is_err());
        // Empty array is fine
        assert!(decode_char_response(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_words() {
        let body = br#"[{"word": "store", "confidence": 0.6}]"#;
        let words = decode_word_response(body).unwrap();
        assert_eq!(words[0].word, "store");
    }

    #[test]
    fn test_confidence_map_normalizes_keys() {
        let map = ConfidenceMap::from_predictions(&[
            CharPrediction::new("r", 0.8),
            CharPrediction::new("SPACE", 0.1),
            CharPrediction::new("BACKSPACE", 0.05),
            CharPrediction::new("TAB", 0.5),
        ]);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&KeyId::Char('R')), Some(0.8));
        assert_eq!(map.get(&KeyId::Space), Some(0.1));
        assert_eq!(map.get(&KeyId::Backspace), Some(0.05));
    }

    #[test]
    fn test_confidence_map_skips_enter_and_shift() {
        let map = ConfidenceMap::from_predictions(&[
            CharPrediction::new("SHIFT", 0.9),
            CharPrediction::new("ENTER", 0.8),
            CharPrediction::new("e", 0.4),
        ]);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&KeyId::Shift), None);
        assert_eq!(map.get(&KeyId::Enter), None);
        assert_eq!(map.get(&KeyId::Char('E')), Some(0.4));

        // Layout files still name both keys.
        assert_eq!("SHIFT".parse::<KeyId>().unwrap(), KeyId::Shift);
        assert_eq!("ENTER".parse::<KeyId>().unwrap(), KeyId::Enter);
    }

    #[test]
    fn test_confidence_map_last_write_wins() {
        let map: ConfidenceMap = vec![(KeyId::Char('A'), 0.2), (KeyId::Char('A'), 0.9)]
            .into_iter()
            .collect();
        assert_eq!(map.get(&KeyId::Char('A')), Some(0.9));
    }

    #[test]
    fn test_confidence_map_sanitizes_values() {
        let mut map = ConfidenceMap::new();
        assert!(map.insert(KeyId::Char('A'), 1.7));
        assert!(map.insert(KeyId::Char('B'), -0.3));
        assert!(!map.insert(KeyId::Char('C'), f32::NAN));

        assert_eq!(map.get(&KeyId::Char('A')), Some(1.0));
        assert_eq!(map.get(&KeyId::Char('B')), Some(0.0));
        assert_eq!(map.get(&KeyId::Char('C')), None);
    }

    #[test]
    fn test_empty_prediction_keeps_trailing_char() {
        let prediction = Prediction::empty_for("sto");
        assert_eq!(prediction.trailing, Some('o'));
        assert!(prediction.confidences.is_empty());
    }
}
