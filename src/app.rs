// SPDX-License-Identifier: GPL-3.0-only

//! The keyboard session.
//!
//! `KeyboardApp` ties the components together for one user: it owns the
//! text, the shift state and the animation state, and it decides which
//! prediction results may update the keys.
//!
//! It never performs I/O itself. When the text changes, `update` hands back
//! a `Command::Predict` carrying a `PredictionRequest`; whoever runs the
//! session (see `runtime`) performs the request and feeds the result back as
//! `Message::PredictionReady`.
//!
//! # Stale Results
//!
//! Every request gets a generation number, increasing by one per text
//! change. A completion is applied only if its generation is newer than the
//! last applied one and its text still equals the buffer. A slow answer for
//! `"hel"` therefore never overwrites the keys already sized for `"hell"`.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, Theme};
use crate::input::InputController;
use crate::layout::{KeyId, Layout};
use crate::prediction::{needs_prediction, ConfidenceMap, Prediction};
use crate::renderer::{AnimationController, KeySizeResolver, KeyboardMode, VisualProperty};

// ============================================================================
// Messages
// ============================================================================

/// A prediction the session wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    /// Generation of the text change that asked for it
    pub generation: u64,
    /// Full text to predict after
    pub text: String,
}

/// A finished prediction, tagged with the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionCompletion {
    /// Generation copied from the request
    pub generation: u64,
    /// Text copied from the request
    pub text: String,
    /// What the client predicted
    pub prediction: Prediction,
}

impl PredictionCompletion {
    /// Pairs a request with its prediction.
    pub fn new(request: PredictionRequest, prediction: Prediction) -> Self {
        Self {
            generation: request.generation,
            text: request.text,
            prediction,
        }
    }
}

/// Messages driving a keyboard session.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A key was activated by the user.
    KeyActivated(KeyId),
    /// A word was chosen from a word list.
    InsertWord(String),
    /// A prediction request finished.
    PredictionReady(PredictionCompletion),
    /// Accessible mode was switched on or off.
    SetAccessible(bool),
    /// Accessible mode was flipped.
    ToggleAccessible,
    /// A theme was chosen.
    SetTheme(Theme),
    /// The theme was flipped.
    ToggleTheme,
    /// The animation duration was changed (milliseconds).
    SetAnimationDuration(u64),
    /// The session should end.
    Quit,
}

/// Follow-up work requested by `KeyboardApp::update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Nothing to do
    None,
    /// Run a prediction and report back with `Message::PredictionReady`
    Predict(PredictionRequest),
    /// Stop the session
    Quit,
}

// ============================================================================
// Snapshot
// ============================================================================

/// Read-only view of one key for the view layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySnapshot {
    /// Key identity
    pub id: KeyId,
    /// Label to display
    pub label: String,
    /// Row index in the layout
    pub row: usize,
    /// Current animated flex weight
    pub flex: f32,
    /// Current animated height multiplier
    pub height: f32,
}

/// Read-only view of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyboardSnapshot {
    /// Text typed so far
    pub text: String,
    /// Whether the next letter is upper-case
    pub shift: bool,
    /// Whether predicted keys grow
    pub accessible: bool,
    /// Colour theme
    pub theme: Theme,
    /// Whether an animation run is in progress
    pub animating: bool,
    /// Every key in layout order
    pub keys: Vec<KeySnapshot>,
}

impl KeyboardSnapshot {
    /// Looks up a key.
    pub fn key(&self, id: &KeyId) -> Option<&KeySnapshot> {
        self.keys.iter().find(|key| key.id == *id)
    }
}

// ============================================================================
// Session
// ============================================================================

/// One keyboard session.
#[derive(Debug, Clone)]
pub struct KeyboardApp {
    layout: Arc<Layout>,
    resolver: KeySizeResolver,
    input: InputController,
    animation: AnimationController,
    config: Config,
    /// Confidences behind the current targets
    confidences: ConfidenceMap,
    /// Generation of the latest text change
    requested_generation: u64,
    /// Generation whose prediction the keys currently show
    applied_generation: u64,
}

impl KeyboardApp {
    /// Creates a session over `layout` with the given configuration.
    pub fn new(layout: Arc<Layout>, config: Config) -> Self {
        let animation = AnimationController::new(&layout, config.animation_duration_ms);
        tracing::info!(
            "Keyboard session started: layout '{}' ({} keys), mode {:?}",
            layout.name(),
            layout.key_count(),
            config.mode()
        );

        Self {
            resolver: KeySizeResolver::new(Arc::clone(&layout)),
            layout,
            input: InputController::new(),
            animation,
            config,
            confidences: ConfidenceMap::new(),
            requested_generation: 0,
            applied_generation: 0,
        }
    }

    /// Returns the layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the text typed so far.
    pub fn text(&self) -> &str {
        self.input.text()
    }

    /// Returns `true` if the next letter will be upper-case.
    pub fn shift_active(&self) -> bool {
        self.input.shift_active()
    }

    /// Returns the sizing mode.
    pub fn mode(&self) -> KeyboardMode {
        self.config.mode()
    }

    /// Returns the animation state.
    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    /// Returns the confidences the keys are currently sized for.
    pub fn confidences(&self) -> &ConfidenceMap {
        &self.confidences
    }

    /// Returns `true` while keys are still moving.
    pub fn is_animating(&self) -> bool {
        self.animation.is_animating()
    }

    /// Handles one message at time `now`.
    pub fn update(&mut self, message: Message, now: Instant) -> Command {
        match message {
            Message::KeyActivated(key) => return self.activate(&key, now).into(),
            Message::InsertWord(word) => return self.insert_word(&word, now).into(),
            Message::PredictionReady(completion) => {
                self.complete_prediction(completion, now);
            }
            Message::SetAccessible(accessible) => self.set_accessible(accessible, now),
            Message::ToggleAccessible => self.set_accessible(!self.config.accessible, now),
            Message::SetTheme(theme) => self.set_theme(theme),
            Message::ToggleTheme => self.set_theme(self.config.theme.toggled()),
            Message::SetAnimationDuration(duration_ms) => {
                self.set_animation_duration(duration_ms);
            }
            Message::Quit => {
                tracing::info!("Keyboard session ending");
                return Command::Quit;
            }
        }

        Command::None
    }

    /// Applies a key activation.
    ///
    /// Returns the prediction to run, if the text changed and is worth
    /// predicting after.
    pub fn activate(&mut self, key: &KeyId, now: Instant) -> Option<PredictionRequest> {
        let effect = self.input.activate(key);
        if !effect.changed_text() {
            return None;
        }
        self.text_changed(now)
    }

    /// Appends a whole word and a space.
    pub fn insert_word(&mut self, word: &str, now: Instant) -> Option<PredictionRequest> {
        if !self.input.insert_word(word) {
            return None;
        }
        self.text_changed(now)
    }

    /// Applies a finished prediction unless a newer text state superseded it.
    ///
    /// Returns `true` if the keys were retargeted.
    pub fn complete_prediction(&mut self, completion: PredictionCompletion, now: Instant) -> bool {
        if completion.generation <= self.applied_generation
            || completion.generation > self.requested_generation
        {
            tracing::debug!(
                "Ignoring prediction #{} (applied #{}, latest #{})",
                completion.generation,
                self.applied_generation,
                self.requested_generation
            );
            return false;
        }

        if completion.text != self.input.text() {
            tracing::debug!(
                "Ignoring prediction #{} for outdated text {:?}",
                completion.generation,
                completion.text
            );
            return false;
        }

        self.applied_generation = completion.generation;
        self.apply(completion.prediction.confidences, now);
        true
    }

    /// Switches accessible mode and resizes the keys.
    pub fn set_accessible(&mut self, accessible: bool, now: Instant) {
        if self.config.accessible == accessible {
            return;
        }
        self.config.accessible = accessible;
        tracing::info!("Keyboard mode: {:?}", self.config.mode());
        self.retarget(now);
    }

    /// Sets the colour theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.config.theme = theme;
        tracing::debug!("Theme: {:?}", theme);
    }

    /// Sets the animation duration, clamped to the supported range.
    pub fn set_animation_duration(&mut self, duration_ms: u64) -> Duration {
        let duration = self.animation.set_duration(duration_ms);
        self.config.animation_duration_ms = duration.as_millis() as u64;
        duration
    }

    /// Advances the animation to `now`.
    ///
    /// Returns `true` if the run completed on this tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.animation.tick(now)
    }

    /// Captures the state the view layer renders.
    pub fn snapshot(&self) -> KeyboardSnapshot {
        let keys = self
            .layout
            .rows()
            .iter()
            .enumerate()
            .flat_map(|(row, keys)| {
                keys.keys.iter().map(move |key| KeySnapshot {
                    id: key.id,
                    label: key.label.clone(),
                    row,
                    flex: self.animation.value(&key.id, VisualProperty::Flex),
                    height: self.animation.value(&key.id, VisualProperty::Height),
                })
            })
            .collect();

        KeyboardSnapshot {
            text: self.input.text().to_string(),
            shift: self.input.shift_active(),
            accessible: self.config.accessible,
            theme: self.config.theme,
            animating: self.animation.is_animating(),
            keys,
        }
    }

    fn text_changed(&mut self, now: Instant) -> Option<PredictionRequest> {
        self.requested_generation += 1;
        let generation = self.requested_generation;
        let text = self.input.text().to_string();

        if !needs_prediction(&text) {
            // Nothing to wait for: clear the emphasis right away
            self.applied_generation = generation;
            self.apply(ConfidenceMap::new(), now);
            return None;
        }

        tracing::debug!("Requesting prediction #{} for {:?}", generation, text);
        Some(PredictionRequest { generation, text })
    }

    fn apply(&mut self, confidences: ConfidenceMap, now: Instant) {
        self.confidences = confidences;
        self.retarget(now);
    }

    fn retarget(&mut self, now: Instant) {
        let sizes = self.resolver.resolve(&self.confidences, self.config.mode());
        self.animation.retarget(&sizes, now);
    }
}

impl From<Option<PredictionRequest>> for Command {
    fn from(request: Option<PredictionRequest>) -> Self {
        match request {
            Some(request) => Command::Predict(request),
            None => Command::None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::CharPrediction;

    const EPSILON: f32 = 1e-5;

    fn app() -> KeyboardApp {
        KeyboardApp::new(Arc::new(Layout::qwerty()), Config::default())
    }

    fn prediction(entries: &[(&str, f32)]) -> Prediction {
        let entries: Vec<CharPrediction> = entries
            .iter()
            .map(|(c, confidence)| CharPrediction::new(*c, *confidence))
            .collect();
        Prediction {
            trailing: None,
            confidences: ConfidenceMap::from_predictions(&entries),
        }
    }

    fn type_text(app: &mut KeyboardApp, text: &str, now: Instant) -> Option<PredictionRequest> {
        let mut last = None;
        for c in text.chars() {
            last = app.activate(&KeyId::from_char(c).unwrap(), now);
        }
        last
    }

    fn flex(app: &KeyboardApp, key: KeyId) -> f32 {
        app.animation().value(&key, VisualProperty::Flex)
    }

    /// Test 1: Text changes produce numbered requests
    #[test]
    fn test_requests_are_numbered() {
        let mut app = app();
        let now = Instant::now();

        let first = app.activate(&KeyId::Char('H'), now).unwrap();
        let second = app.activate(&KeyId::Char('I'), now).unwrap();
        assert_eq!(first, PredictionRequest { generation: 1, text: "h".into() });
        assert_eq!(second, PredictionRequest { generation: 2, text: "hi".into() });
    }

    /// Test 2: Shift toggles do not request predictions
    #[test]
    fn test_shift_does_not_predict() {
        let mut app = app();
        assert_eq!(app.update(Message::KeyActivated(KeyId::Shift), Instant::now()), Command::None);
        assert!(app.shift_active());
        assert_eq!(
            app.update(Message::KeyActivated(KeyId::Backspace), Instant::now()),
            Command::None
        );
    }

    /// Test 3: Boundaries clear emphasis without a request
    #[test]
    fn test_boundary_clears_emphasis() {
        let mut app = app();
        let t0 = Instant::now();

        let request = type_text(&mut app, "sto", t0).unwrap();
        let completion = PredictionCompletion::new(request, prediction(&[("r", 0.8)]));
        assert!(app.complete_prediction(completion, t0));
        app.tick(t0 + Duration::from_secs(1));
        assert!((flex(&app, KeyId::Char('R')) - 2.2).abs() < EPSILON);

        assert_eq!(app.activate(&KeyId::Space, t0 + Duration::from_secs(1)), None);
        assert!(app.confidences().is_empty());
        app.tick(t0 + Duration::from_secs(2));
        assert!((flex(&app, KeyId::Char('R')) - 1.0).abs() < EPSILON);
    }

    /// Test 4: A late answer for older text is ignored
    #[test]
    fn test_stale_completion_rejected() {
        let mut app = app();
        let now = Instant::now();

        let request_a = type_text(&mut app, "hel", now).unwrap();
        let request_b = app.activate(&KeyId::Char('L'), now).unwrap();
        assert_eq!(request_b.text, "hell");

        let b = PredictionCompletion::new(request_b, prediction(&[("o", 0.9)]));
        assert!(app.complete_prediction(b, now));

        let a = PredictionCompletion::new(request_a, prediction(&[("l", 0.9)]));
        assert!(!app.complete_prediction(a, now));

        assert_eq!(app.confidences().get(&KeyId::Char('O')), Some(0.9));
        assert_eq!(app.confidences().get(&KeyId::Char('L')), None);
    }

    /// Test 5: An early answer for text that has since changed is ignored
    #[test]
    fn test_outdated_text_rejected() {
        let mut app = app();
        let now = Instant::now();

        let request_a = type_text(&mut app, "hel", now).unwrap();
        let request_b = app.activate(&KeyId::Char('L'), now).unwrap();

        let a = PredictionCompletion::new(request_a, prediction(&[("l", 0.9)]));
        assert!(!app.complete_prediction(a, now));
        assert!(app.confidences().is_empty());

        let b = PredictionCompletion::new(request_b, prediction(&[("o", 0.9)]));
        assert!(app.complete_prediction(b, now));
    }

    /// Test 6: Same text typed back does not revive an old generation
    #[test]
    fn test_generation_guard_survives_retyping() {
        let mut app = app();
        let now = Instant::now();

        let request_a = type_text(&mut app, "ab", now).unwrap();
        app.activate(&KeyId::Backspace, now);
        let request_c = app.activate(&KeyId::Char('B'), now).unwrap();
        assert_eq!(request_a.text, request_c.text);

        let c = PredictionCompletion::new(request_c, prediction(&[("c", 0.5)]));
        assert!(app.complete_prediction(c, now));
        let a = PredictionCompletion::new(request_a, prediction(&[("x", 0.5)]));
        assert!(!app.complete_prediction(a, now));
    }

    /// Test 7: Regular mode keeps every key at base size
    #[test]
    fn test_mode_switch_resizes() {
        let mut app = app();
        let t0 = Instant::now();

        let request = type_text(&mut app, "q", t0).unwrap();
        app.complete_prediction(PredictionCompletion::new(request, prediction(&[("u", 0.7)])), t0);
        app.tick(t0 + Duration::from_secs(1));
        assert!((flex(&app, KeyId::Char('U')) - 2.05).abs() < EPSILON);

        let t1 = t0 + Duration::from_secs(1);
        app.update(Message::ToggleAccessible, t1);
        assert_eq!(app.mode(), KeyboardMode::Regular);
        app.tick(t1 + Duration::from_secs(1));
        assert!((flex(&app, KeyId::Char('U')) - 1.0).abs() < EPSILON);

        // Confidences are kept, so switching back restores the emphasis
        let t2 = t1 + Duration::from_secs(1);
        app.update(Message::SetAccessible(true), t2);
        app.tick(t2 + Duration::from_secs(1));
        assert!((flex(&app, KeyId::Char('U')) - 2.05).abs() < EPSILON);
    }

    /// Test 8: Theme and duration setters
    #[test]
    fn test_setters() {
        let mut app = app();
        let now = Instant::now();

        app.update(Message::ToggleTheme, now);
        assert_eq!(app.config().theme, Theme::Dark);
        app.update(Message::SetTheme(Theme::Light), now);
        assert_eq!(app.config().theme, Theme::Light);

        app.update(Message::SetAnimationDuration(5000), now);
        assert_eq!(app.config().animation_duration_ms, 3000);
        assert_eq!(app.animation().duration(), Duration::from_millis(3000));

        assert_eq!(app.update(Message::Quit, now), Command::Quit);
    }

    /// Test 9: Word insertion requests no prediction after the trailing space
    #[test]
    fn test_insert_word() {
        let mut app = app();
        let now = Instant::now();

        type_text(&mut app, "i", now);
        let command = app.update(Message::InsertWord("am".into()), now);
        assert_eq!(command, Command::None);
        assert_eq!(app.text(), "i am ");
        assert_eq!(app.update(Message::InsertWord(" ".into()), now), Command::None);
    }

    /// Test 10: Snapshot reflects the session
    #[test]
    fn test_snapshot() {
        let mut app = app();
        app.activate(&KeyId::Shift, Instant::now());

        let snapshot = app.snapshot();
        assert_eq!(snapshot.text, "");
        assert!(snapshot.shift);
        assert!(snapshot.accessible);
        assert_eq!(snapshot.keys.len(), app.layout().key_count());

        let space = snapshot.key(&KeyId::Space).unwrap();
        let backspace = snapshot.key(&KeyId::Backspace).unwrap();
        assert_eq!(space.flex / backspace.flex, 2.0);
        assert_eq!(space.row, backspace.row);
        assert_eq!(snapshot.key(&KeyId::Char('A')).unwrap().label, "a");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["theme"], "light");
        assert_eq!(json["keys"][0]["id"], "1");
    }
}
