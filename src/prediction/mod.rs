// SPDX-License-Identifier: GPL-3.0-only

//! Next-character prediction.
//!
//! This module turns the text typed so far into a `ConfidenceMap`: for each
//! key, how likely it is to be typed next. The actual prediction happens in
//! an external `PredictionService`; the `PredictionClient` wraps it with the
//! rules every session relies on:
//!
//! - No request for blank text or text ending in a word/sentence boundary
//! - A bounded timeout on every call
//! - Letters normalized to layout keys, unknown characters skipped
//! - Any failure degrades to an empty map, never to a user-visible error
//!
//! # Services
//!
//! - **HttpService**: `POST /predict-char` against a prediction server
//! - **FrequencyStub**: offline `q → u` / vowel table
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use predboard::prediction::{HttpService, PredictionClient};
//!
//! let service = HttpService::new("http://localhost:8000", Duration::from_secs(3))?;
//! let client = PredictionClient::new(service);
//!
//! let prediction = client.predict("I need to go to the sto").await;
//! for (key, confidence) in prediction.confidences.iter() {
//!     println!("{} -> {:.2}", key, confidence);
//! }
//! ```

pub mod client;
pub mod http;
pub mod stub;
pub mod types;

pub use client::{needs_prediction, PredictionClient, PredictionService};
pub use http::HttpService;
pub use stub::FrequencyStub;
pub use types::{
    decode_char_response, decode_word_response, CharPrediction, ConfidenceMap, Prediction,
    PredictionError, WordPrediction,
};
