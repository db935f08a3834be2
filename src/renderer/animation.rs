// SPDX-License-Identifier: GPL-3.0-only

//! Per-key animation of visual properties.
//!
//! The `AnimationController` keeps a (current, target) pair for the flex
//! weight and the height multiplier of every key. A new `SizeMap` only moves
//! the targets; the current values keep whatever position they had reached,
//! so retargeting mid-flight never makes a key jump.
//!
//! # Timing
//!
//! Each retarget starts an `AnimationRun`. Every tick computes
//! `p = min(elapsed / D, 1)`, eases it with `1 - (1 - p)^3` and moves each
//! current value that fraction of its remaining distance to the target.
//! The run ends on the tick where `p` reaches 1, at which point every
//! current value equals its target.
//!
//! Time is passed in explicitly so callers (and tests) control the clock.

use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::app_settings::{
    BASE_SIZE, DEFAULT_ANIMATION_DURATION_MS, MAX_ANIMATION_DURATION_MS,
    MIN_ANIMATION_DURATION_MS,
};
use crate::layout::{KeyId, Layout};
use crate::renderer::sizing::{SizeMap, VisualProperty};

// ============================================================================
// Animation Run
// ============================================================================

/// Clamps an animation duration to the supported range.
///
/// Logs a warning when the requested value had to be adjusted.
pub fn clamp_duration_ms(duration_ms: u64) -> u64 {
    let clamped = duration_ms.clamp(MIN_ANIMATION_DURATION_MS, MAX_ANIMATION_DURATION_MS);
    if clamped != duration_ms {
        tracing::warn!(
            "Animation duration {}ms out of range, using {}ms (allowed {}-{}ms)",
            duration_ms,
            clamped,
            MIN_ANIMATION_DURATION_MS,
            MAX_ANIMATION_DURATION_MS
        );
    }
    clamped
}

/// Timing state of one animation run.
#[derive(Debug, Clone)]
pub struct AnimationRun {
    /// Animation progress from 0.0 (start) to 1.0 (complete)
    pub progress: f32,
    /// When the run started
    pub start_time: Instant,
}

impl AnimationRun {
    /// Starts a run at `start_time`.
    pub fn new(start_time: Instant) -> Self {
        Self {
            progress: 0.0,
            start_time,
        }
    }

    /// Updates the progress for the time `now`.
    ///
    /// Returns `true` once the run is complete.
    pub fn update(&mut self, now: Instant, duration: Duration) -> bool {
        let elapsed = now.saturating_duration_since(self.start_time);
        self.progress = (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0);
        self.is_complete()
    }

    /// Returns `true` if the run has reached the end.
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Progress passed through ease-out-cubic.
    pub fn eased_progress(&self) -> f32 {
        let x = self.progress;
        1.0 - (1.0 - x).powi(3)
    }
}

// ============================================================================
// Animated Values
// ============================================================================

/// A single animated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    /// Value currently rendered
    pub current: f32,
    /// Value being approached
    pub target: f32,
}

impl Tween {
    fn step(&mut self, eased: f32) {
        self.current += (self.target - self.current) * eased;
    }
}

/// Rendered visual values of one key, as exposed to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyVisual {
    /// Key these values belong to
    pub key: KeyId,
    /// Horizontal weight within the row
    pub flex: f32,
    /// Height multiplier
    pub height: f32,
}

// ============================================================================
// Controller
// ============================================================================

/// Animates the flex and height of every key toward its latest target.
#[derive(Debug, Clone)]
pub struct AnimationController {
    /// Keys in layout order
    order: Vec<KeyId>,
    /// Flex weight used before a key has been animated
    default_flex: HashMap<KeyId, f32>,
    flex: HashMap<KeyId, Tween>,
    height: HashMap<KeyId, Tween>,
    duration: Duration,
    run: Option<AnimationRun>,
}

impl AnimationController {
    /// Creates a controller for a layout.
    ///
    /// `duration_ms` is clamped to the supported range.
    pub fn new(layout: &Layout, duration_ms: u64) -> Self {
        let order: Vec<KeyId> = layout.keys().map(|key| key.id).collect();
        let default_flex = layout
            .keys()
            .map(|key| (key.id, key.width.weight()))
            .collect();

        Self {
            order,
            default_flex,
            flex: HashMap::new(),
            height: HashMap::new(),
            duration: Duration::from_millis(clamp_duration_ms(duration_ms)),
            run: None,
        }
    }

    /// Returns the animation duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Changes the duration used by this and following runs.
    ///
    /// Returns the duration actually applied after clamping.
    pub fn set_duration(&mut self, duration_ms: u64) -> Duration {
        self.duration = Duration::from_millis(clamp_duration_ms(duration_ms));
        tracing::debug!("Animation duration set to {:?}", self.duration);
        self.duration
    }

    /// Returns `true` while a run is in progress.
    pub fn is_animating(&self) -> bool {
        self.run.is_some()
    }

    /// Progress of the current run, if any.
    pub fn progress(&self) -> Option<f32> {
        self.run.as_ref().map(|run| run.progress)
    }

    /// Value a key shows before it has ever been animated.
    pub fn default_value(&self, key: &KeyId, property: VisualProperty) -> f32 {
        match property {
            VisualProperty::Flex => self.default_flex.get(key).copied().unwrap_or(BASE_SIZE),
            VisualProperty::Height => BASE_SIZE,
        }
    }

    /// Current rendered value of a key property.
    pub fn value(&self, key: &KeyId, property: VisualProperty) -> f32 {
        self.tweens(property)
            .get(key)
            .map(|tween| tween.current)
            .unwrap_or_else(|| self.default_value(key, property))
    }

    /// Target of a key property, if the key has been animated.
    pub fn target(&self, key: &KeyId, property: VisualProperty) -> Option<f32> {
        self.tweens(property).get(key).map(|tween| tween.target)
    }

    /// Current values of every layout key, in layout order.
    pub fn visuals(&self) -> Vec<KeyVisual> {
        self.order
            .iter()
            .map(|key| KeyVisual {
                key: *key,
                flex: self.value(key, VisualProperty::Flex),
                height: self.value(key, VisualProperty::Height),
            })
            .collect()
    }

    /// Points every key at the sizes in `sizes` and starts a new run at `now`.
    ///
    /// Current values are kept. Keys that are animated but missing from
    /// `sizes` head back to the base size.
    pub fn retarget(&mut self, sizes: &SizeMap, now: Instant) {
        let mut keys: Vec<KeyId> = sizes.iter().map(|(key, _)| *key).collect();
        keys.extend(self.flex.keys().filter(|key| sizes.get(key).is_none()).copied());

        for key in keys {
            let size = sizes.size_or_base(&key);
            for property in VisualProperty::ALL {
                let start = self.default_value(&key, property);
                let target = property.from_size(size);
                self.tweens_mut(property)
                    .entry(key)
                    .and_modify(|tween| tween.target = target)
                    .or_insert(Tween {
                        current: start,
                        target,
                    });
            }
        }

        if self.run.is_some() {
            tracing::trace!("Retargeting animation in flight");
        }
        self.run = Some(AnimationRun::new(now));
    }

    /// Advances the current run to `now`.
    ///
    /// Returns `true` if the run completed on this tick. Ticking with no
    /// run in progress does nothing.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };

        let complete = run.update(now, self.duration);
        let eased = run.eased_progress();

        for tween in self.flex.values_mut().chain(self.height.values_mut()) {
            tween.step(eased);
        }

        if complete {
            // Snap away float residue so the run ends exactly on target
            for tween in self.flex.values_mut().chain(self.height.values_mut()) {
                tween.current = tween.target;
            }
            self.run = None;
            tracing::trace!("Animation run complete");
        }

        complete
    }

    fn tweens(&self, property: VisualProperty) -> &HashMap<KeyId, Tween> {
        match property {
            VisualProperty::Flex => &self.flex,
            VisualProperty::Height => &self.height,
        }
    }

    fn tweens_mut(&mut self, property: VisualProperty) -> &mut HashMap<KeyId, Tween> {
        match property {
            VisualProperty::Flex => &mut self.flex,
            VisualProperty::Height => &mut self.height,
        }
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new(&Layout::qwerty(), DEFAULT_ANIMATION_DURATION_MS)
    }
}

// ============================================================================
// Tests
// ============================================================================
