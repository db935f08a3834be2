// SPDX-License-Identifier: GPL-3.0-only

//! Prediction client wrapping an external prediction service.
//!
//! The client decides whether a prediction is worth requesting, bounds every
//! call with a timeout, and turns the service answer into a canonical
//! `ConfidenceMap`. Every failure degrades to "no emphasis".

use std::future::Future;
use std::time::Duration;

use crate::app_settings;
use crate::prediction::types::{
    CharPrediction, ConfidenceMap, Prediction, PredictionError, WordPrediction,
};

/// Returns `true` if `text` warrants a call to the prediction service.
///
/// Nothing is requested for blank text or right after a word or
/// sentence boundary.
pub fn needs_prediction(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    !text.ends_with(app_settings::BOUNDARY_CHARS)
}

/// An external source of next-character confidences.
///
/// Implementations may call a remote model, a local table, or anything else
/// that answers "given this text, which characters come next".
pub trait PredictionService: Send + Sync + 'static {
    /// Returns up to five (character, confidence) pairs, most likely first.
    fn predict_char(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<CharPrediction>, PredictionError>> + Send;

    /// Returns likely next words chosen from `word_list`.
    ///
    /// Services without word prediction keep the default, which predicts nothing.
    fn predict_words(
        &self,
        text: &str,
        word_list: &[String],
    ) -> impl Future<Output = Result<Vec<WordPrediction>, PredictionError>> + Send {
        let _ = (text, word_list);
        async { Ok(Vec::new()) }
    }
}

/// Client that asks a `PredictionService` for the next keys.
#[derive(Debug)]
pub struct PredictionClient<S> {
    service: S,
    timeout: Duration,
}

impl<S: PredictionService> PredictionClient<S> {
    /// Creates a client with the default request timeout.
    pub fn new(service: S) -> Self {
        Self {
            service,
            timeout: Duration::from_millis(app_settings::DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Predicts the keys likely to follow `text`.
    ///
    /// Never fails: transport errors, timeouts and malformed answers all
    /// produce an empty confidence map.
    pub async fn predict(&self, text: &str) -> Prediction {
        if !needs_prediction(text) {
            return Prediction::empty_for(text);
        }

        let entries = match self.call(self.service.predict_char(text)).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Character prediction failed, showing no emphasis: {}", e);
                return Prediction::empty_for(text);
            }
        };

        if entries.len() > app_settings::MAX_CHAR_PREDICTIONS {
            tracing::debug!(
                "Service returned {} predictions (expected at most {})",
                entries.len(),
                app_settings::MAX_CHAR_PREDICTIONS
            );
        }

        let confidences = ConfidenceMap::from_predictions(&entries);
        tracing::debug!("Predicted {} key(s) after {:?}", confidences.len(), text);

        Prediction {
            trailing: text.chars().last(),
            confidences,
        }
    }

    /// Predicts up to three words from `word_list` likely to follow `text`.
    ///
    /// Words the service invents outside the list are dropped.
    pub async fn predict_words(&self, text: &str, word_list: &[String]) -> Vec<WordPrediction> {
        if text.trim().is_empty() || word_list.is_empty() {
            return Vec::new();
        }

        match self.call(self.service.predict_words(text, word_list)).await {
            Ok(words) => words
                .into_iter()
                .filter(|w| word_list.iter().any(|candidate| candidate == &w.word))
                .take(app_settings::MAX_WORD_PREDICTIONS)
                .collect(),
            Err(e) => {
                tracing::warn!("Word prediction failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, PredictionError>>,
    ) -> Result<T, PredictionError> {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(PredictionError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
