// SPDX-License-Identifier: GPL-3.0-only

//! Key size resolution from prediction confidences.
//!
//! This module maps a `ConfidenceMap` onto the full keyboard layout,
//! producing a size scalar for every key.
//!
//! # Size Formula
//!
//! In accessible mode each predicted key gets
//! `clamp(BASE_SIZE + confidence * CONFIDENCE_GAIN, MIN_SIZE, MAX_SIZE)`,
//! i.e. `clamp(1 + c * 1.5, 0.7, 2.5)`. Every other key stays at the base
//! size 1.0. In regular mode every key is 1.0.
//!
//! # Visual Properties
//!
//! A size is not rendered directly. Each animated property re-clamps it
//! into its own range:
//!
//! - **Flex**: `clamp(size, 1.0, 3.0)`, the horizontal weight in its row
//! - **Height**: `clamp(size, 1.0, 2.0)`, the height multiplier

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::app_settings::{BASE_SIZE, CONFIDENCE_GAIN, FLEX_RANGE, HEIGHT_RANGE, MAX_SIZE, MIN_SIZE};
use crate::layout::{KeyId, Layout};
use crate::prediction::ConfidenceMap;

// ============================================================================
// Public Types
// ============================================================================

/// Whether key sizes follow predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardMode {
    /// Predicted keys grow
    #[default]
    Accessible,
    /// Every key keeps the base size
    Regular,
}

impl KeyboardMode {
    /// Maps the accessible-mode switch to a mode.
    pub fn from_accessible(accessible: bool) -> Self {
        if accessible {
            KeyboardMode::Accessible
        } else {
            KeyboardMode::Regular
        }
    }
}

/// A visual property animated per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualProperty {
    /// Horizontal weight within the row
    Flex,
    /// Height multiplier
    Height,
}

impl VisualProperty {
    /// All animated properties.
    pub const ALL: [VisualProperty; 2] = [VisualProperty::Flex, VisualProperty::Height];

    /// Returns the (min, max) clamp range for the property.
    pub fn range(&self) -> (f32, f32) {
        match self {
            VisualProperty::Flex => FLEX_RANGE,
            VisualProperty::Height => HEIGHT_RANGE,
        }
    }

    /// Derives the property value for a resolved key size.
    pub fn from_size(&self, size: f32) -> f32 {
        let (min, max) = self.range();
        size.clamp(min, max)
    }
}

/// Size of every key in a layout.
///
/// Produced fresh by `KeySizeResolver::resolve`; covers every layout key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeMap {
    sizes: HashMap<KeyId, f32>,
}

impl SizeMap {
    /// Returns the size of a key, if the key is part of the map.
    pub fn get(&self, key: &KeyId) -> Option<f32> {
        self.sizes.get(key).copied()
    }

    /// Returns the size of a key, or the base size if absent.
    pub fn size_or_base(&self, key: &KeyId) -> f32 {
        self.get(key).unwrap_or(BASE_SIZE)
    }

    /// Iterates over (key, size) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, f32)> {
        self.sizes.iter().map(|(k, v)| (k, *v))
    }

    /// Returns the number of keys covered.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Returns `true` if no key is covered.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl FromIterator<(KeyId, f32)> for SizeMap {
    fn from_iter<I: IntoIterator<Item = (KeyId, f32)>>(iter: I) -> Self {
        Self {
            sizes: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Size for a key predicted with `confidence`.
///
/// # Example
///
/// ```rust,ignore
/// // 1 + 0.8 * 1.5 = 2.2
/// assert!((candidate_size(0.8) - 2.2).abs() < 1e-6);
/// ```
pub fn candidate_size(confidence: f32) -> f32 {
    (BASE_SIZE + confidence * CONFIDENCE_GAIN).clamp(MIN_SIZE, MAX_SIZE)
}

/// Maps confidence maps onto a layout.
///
/// Pure: the same confidences and mode always give the same sizes.
#[derive(Debug, Clone)]
pub struct KeySizeResolver {
    layout: Arc<Layout>,
}

impl KeySizeResolver {
    /// Creates a resolver for a layout.
    pub fn new(layout: Arc<Layout>) -> Self {
        Self { layout }
    }

    /// Returns the layout this resolver sizes.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Resolves a size for every key of the layout.
    ///
    /// Confidences for keys missing from the layout are ignored.
    pub fn resolve(&self, confidences: &ConfidenceMap, mode: KeyboardMode) -> SizeMap {
        let mut sizes: HashMap<KeyId, f32> =
            self.layout.keys().map(|key| (key.id, BASE_SIZE)).collect();

        if mode == KeyboardMode::Regular {
            return SizeMap { sizes };
        }

        for (key, confidence) in confidences.iter() {
            if let Some(size) = sizes.get_mut(key) {
                *size = candidate_size(confidence);
            }
        }

        SizeMap { sizes }
    }
}

// ============================================================================
// Tests
// ============================================================================
