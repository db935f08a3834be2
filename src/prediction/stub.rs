// SPDX-License-Identifier: GPL-3.0-only

//! Offline prediction service backed by a tiny frequency table.
//!
//! Useful for demos and tests when no prediction server is running: after a
//! `q` it predicts `u`, otherwise it nudges the vowels.

use crate::prediction::client::PredictionService;
use crate::prediction::types::{CharPrediction, PredictionError};

/// Confidence given to `u` after `q`.
const Q_U_CONFIDENCE: f32 = 0.7;

/// Confidence given to each vowel otherwise.
const VOWEL_CONFIDENCE: f32 = 0.1;

const VOWELS: [&str; 5] = ["a", "e", "i", "o", "u"];

/// Static frequency predictor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyStub;

impl FrequencyStub {
    /// Predicts the next characters for `text` without any I/O.
    pub fn predict(text: &str) -> Vec<CharPrediction> {
        match text.chars().last() {
            Some(c) if c.eq_ignore_ascii_case(&'q') => {
                vec![CharPrediction::new("u", Q_U_CONFIDENCE)]
            }
            _ => VOWELS
                .iter()
                .map(|v| CharPrediction::new(*v, VOWEL_CONFIDENCE))
                .collect(),
        }
    }
}

impl PredictionService for FrequencyStub {
    async fn predict_char(&self, text: &str) -> Result<Vec<CharPrediction>, PredictionError> {
        Ok(Self::predict(text))
    }
}
