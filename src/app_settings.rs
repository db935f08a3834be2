// SPDX-License-Identifier: GPL-3.0-only

//! Centralized application settings and constants.

/// Application name used for logging targets and the demo banner.
pub const APP_NAME: &str = "predboard";

// ============================================================================
// Key Sizing
// ============================================================================

/// Size of every key that has no prediction attached to it.
pub const BASE_SIZE: f32 = 1.0;

/// Lower clamp for a resolved key size.
pub const MIN_SIZE: f32 = 0.7;

/// Upper clamp for a resolved key size.
pub const MAX_SIZE: f32 = 2.5;

/// How much one unit of confidence grows a key above the base size.
pub const CONFIDENCE_GAIN: f32 = 1.5;

/// Clamp range for the animated flex weight.
pub const FLEX_RANGE: (f32, f32) = (1.0, 3.0);

/// Clamp range for the animated height multiplier.
pub const HEIGHT_RANGE: (f32, f32) = (1.0, 2.0);

// ============================================================================
// Animation
// ============================================================================

/// Default duration of a key resize animation in milliseconds.
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 1000;

/// Shortest animation duration a user may choose.
pub const MIN_ANIMATION_DURATION_MS: u64 = 200;

/// Longest animation duration a user may choose.
pub const MAX_ANIMATION_DURATION_MS: u64 = 3000;

/// Animation frame interval for smooth 60fps animations in milliseconds.
pub const ANIMATION_FRAME_INTERVAL_MS: u64 = 16;

// ============================================================================
// Prediction
// ============================================================================

/// Characters after which no prediction is requested.
pub const BOUNDARY_CHARS: &[char] = &[' ', '.', '!', '?', ',', ';', ':', '\n'];

/// Number of (character, confidence) pairs the service is expected to return.
pub const MAX_CHAR_PREDICTIONS: usize = 5;

/// Number of words kept from a word prediction.
pub const MAX_WORD_PREDICTIONS: usize = 3;

/// Default timeout for a single prediction request in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;

/// Endpoint path for next-character prediction.
pub const PREDICT_CHAR_PATH: &str = "/predict-char";

/// Endpoint path for next-word prediction.
pub const PREDICT_WORD_PATH: &str = "/predict-word";

/// Capacity of the session message channel.
pub const MESSAGE_CHANNEL_CAPACITY: usize = 64;
