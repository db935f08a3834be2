// SPDX-License-Identifier: GPL-3.0-only

//! Predictive key sizing and animation for predboard.
//!
//! This module turns prediction confidences into the per-key visual values a
//! view layer renders. Drawing itself happens elsewhere; everything here is
//! plain data.
//!
//! # Architecture
//!
//! - **sizing**: `KeySizeResolver` maps a `ConfidenceMap` onto the layout,
//!   giving every key a size in `[0.7, 2.5]`.
//! - **animation**: `AnimationController` eases each key's flex and height
//!   toward the latest sizes, retargeting without jumps.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Instant;
//! use predboard::layout::Layout;
//! use predboard::renderer::{AnimationController, KeySizeResolver, KeyboardMode};
//!
//! let layout = Arc::new(Layout::qwerty());
//! let resolver = KeySizeResolver::new(Arc::clone(&layout));
//! let mut animation = AnimationController::new(&layout, 1000);
//!
//! let sizes = resolver.resolve(&prediction.confidences, KeyboardMode::Accessible);
//! animation.retarget(&sizes, Instant::now());
//!
//! while animation.is_animating() {
//!     animation.tick(Instant::now());
//!     // Render animation.visuals()...
//! }
//! ```

pub mod animation;
pub mod sizing;

pub use animation::{clamp_duration_ms, AnimationController, AnimationRun, KeyVisual, Tween};
pub use sizing::{candidate_size, KeySizeResolver, KeyboardMode, SizeMap, VisualProperty};
