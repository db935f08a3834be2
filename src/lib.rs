// SPDX-License-Identifier: GPL-3.0-only

//! Predboard - a predictive soft keyboard core
//!
//! This crate implements the engine behind an accessibility keyboard that
//! enlarges the keys a user is likely to type next. It does not draw
//! anything: a view layer renders the per-key values it publishes.
//!
//! # Architecture
//!
//! Text flows around a loop:
//!
//! 1. The user activates a key; the `input` controller edits the text.
//! 2. The `prediction` client asks an external service which keys follow.
//! 3. The `renderer` resolver turns confidences into per-key sizes.
//! 4. The `renderer` animation eases every key toward its new size.
//!
//! `app::KeyboardApp` holds one session's state and rejects stale
//! predictions; `runtime::SessionHandle` drives it on tokio.
//!
//! # Modules
//!
//! - `app`: Keyboard session model, messages and snapshots
//! - `app_settings`: Centralized constants (sizes, timings, endpoints)
//! - `config`: User configuration loaded from JSON
//! - `input`: Text buffer, shift state and key activation handling
//! - `layout`: Keyboard layouts, built-in QWERTY and JSON parsing
//! - `prediction`: Prediction client, HTTP service and offline stub
//! - `renderer`: Key size resolution and animation
//! - `runtime`: Async session driver

pub mod app;
pub mod app_settings;
pub mod config;
pub mod input;
pub mod layout;
pub mod prediction;
pub mod renderer;
pub mod runtime;

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod integration_tests {
    use crate::app::{KeyboardApp, Message, PredictionCompletion};
    use crate::config::Config;
    use crate::layout::{parse_layout_from_string, KeyId, Layout};
    use crate::prediction::{
        CharPrediction, ConfidenceMap, FrequencyStub, PredictionClient, PredictionError,
        PredictionService,
    };
    use crate::renderer::{KeySizeResolver, KeyboardMode, VisualProperty};
    use crate::runtime::SessionHandle;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const EPSILON: f32 = 1e-5;

    /// Service with a fixed answer.
    struct Fixed(Vec<CharPrediction>);

    impl PredictionService for Fixed {
        async fn predict_char(&self, _text: &str) -> Result<Vec<CharPrediction>, PredictionError> {
            Ok(self.0.clone())
        }
    }

    /// Integration Test 1: Prediction to sizes to animated values
    ///
    /// `{r: 0.8, SPACE: 0.1}` ends with r at 2.2 and SPACE at 1.15 once the
    /// animation run is over.
    #[tokio::test]
    async fn test_prediction_to_animation() {
        let client = PredictionClient::new(Fixed(vec![
            CharPrediction::new("r", 0.8),
            CharPrediction::new("SPACE", 0.1),
        ]));
        let mut app = KeyboardApp::new(Arc::new(Layout::qwerty()), Config::default());
        let t0 = Instant::now();

        let mut request = None;
        for c in "I need to go to the sto".chars() {
            request = app.activate(&KeyId::from_char(c).unwrap(), t0);
        }
        let request = request.unwrap();
        assert_eq!(request.text, "i need to go to the sto");

        let prediction = client.predict(&request.text).await;
        assert_eq!(prediction.trailing, Some('o'));
        assert!(app.complete_prediction(PredictionCompletion::new(request, prediction), t0));

        assert!(app.tick(t0 + Duration::from_millis(1000)));
        let animation = app.animation();
        assert!((animation.value(&KeyId::Char('R'), VisualProperty::Flex) - 2.2).abs() < EPSILON);
        assert!((animation.value(&KeyId::Char('R'), VisualProperty::Height) - 2.0).abs() < EPSILON);
        assert!((animation.value(&KeyId::Space, VisualProperty::Flex) - 1.15).abs() < EPSILON);
        assert!((animation.value(&KeyId::Space, VisualProperty::Height) - 1.15).abs() < EPSILON);
        assert_eq!(animation.value(&KeyId::Char('T'), VisualProperty::Flex), 1.0);
    }

    /// Integration Test 2: JSON layout drives sizing
    ///
    /// Keys predicted but absent from the loaded layout are ignored.
    #[test]
    fn test_json_layout_sizing() {
        let json = r#"{
            "name": "ABC",
            "rows": [
                { "keys": [ { "id": "a" }, { "id": "b" }, { "id": "c" } ] },
                { "keys": [ { "id": "SPACE", "width": "double" }, { "id": "BACKSPACE" } ] }
            ]
        }"#;
        let layout = Arc::new(parse_layout_from_string(json).unwrap().into_layout());
        let resolver = KeySizeResolver::new(Arc::clone(&layout));

        let confidences: ConfidenceMap = vec![(KeyId::Char('B'), 0.6), (KeyId::Char('Z'), 0.9)]
            .into_iter()
            .collect();
        let sizes = resolver.resolve(&confidences, KeyboardMode::Accessible);

        assert_eq!(sizes.len(), 5);
        assert!((sizes.get(&KeyId::Char('B')).unwrap() - 1.9).abs() < EPSILON);
        assert_eq!(sizes.get(&KeyId::Char('Z')), None);

        let app = KeyboardApp::new(layout, Config::default());
        let snapshot = app.snapshot();
        assert_eq!(snapshot.keys.len(), 5);
        assert_eq!(snapshot.key(&KeyId::Space).unwrap().flex, 2.0);
        assert_eq!(snapshot.key(&KeyId::Char('C')).unwrap().row, 0);
    }

    /// Integration Test 3: Input semantics through the session
    #[test]
    fn test_input_semantics() {
        let mut app = KeyboardApp::new(Arc::new(Layout::qwerty()), Config::default());
        let now = Instant::now();

        app.update(Message::KeyActivated(KeyId::Shift), now);
        app.update(Message::KeyActivated(KeyId::Char('A')), now);
        assert_eq!(app.text(), "A");
        assert!(!app.shift_active());
        app.update(Message::KeyActivated(KeyId::Char('A')), now);
        assert_eq!(app.text(), "Aa");

        let mut app = KeyboardApp::new(Arc::new(Layout::qwerty()), Config::default());
        for key in [KeyId::Char('C'), KeyId::Char('A'), KeyId::Char('T'), KeyId::Backspace] {
            app.update(Message::KeyActivated(key), now);
        }
        assert_eq!(app.text(), "ca");
        app.update(Message::KeyActivated(KeyId::Space), now);
        app.update(Message::KeyActivated(KeyId::Char('T')), now);
        assert_eq!(app.text(), "ca t");
    }

    /// Integration Test 4: A failing service leaves every key at base size
    #[tokio::test]
    async fn test_failing_service_means_no_emphasis() {
        struct Down;

        impl PredictionService for Down {
            async fn predict_char(
                &self,
                _text: &str,
            ) -> Result<Vec<CharPrediction>, PredictionError> {
                Err(PredictionError::Status(503))
            }
        }

        let app = KeyboardApp::new(Arc::new(Layout::qwerty()), Config::default());
        let mut handle = SessionHandle::spawn(app, Arc::new(PredictionClient::new(Down)));
        handle.send(Message::KeyActivated(KeyId::Char('H'))).await.unwrap();

        let app = handle.shutdown().await.unwrap();
        assert_eq!(app.text(), "h");
        assert!(app.confidences().is_empty());
        assert!(app
            .snapshot()
            .keys
            .iter()
            .filter(|key| key.id != KeyId::Space)
            .all(|key| key.flex == 1.0 && key.height == 1.0));
    }

    /// Integration Test 5: Word insertion through the running session
    #[tokio::test]
    async fn test_word_insertion_session() {
        let app = KeyboardApp::new(Arc::new(Layout::qwerty()), Config::default());
        let mut handle = SessionHandle::spawn(app, Arc::new(PredictionClient::new(FrequencyStub)));

        handle.send(Message::InsertWord("I".into())).await.unwrap();
        handle.send(Message::InsertWord("am".into())).await.unwrap();
        handle.send(Message::KeyActivated(KeyId::Char('Q'))).await.unwrap();

        let app = handle.shutdown().await.unwrap();
        assert_eq!(app.text(), "I am q");
    }
}
