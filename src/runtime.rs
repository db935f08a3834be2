// SPDX-License-Identifier: GPL-3.0-only

//! Async driver for a keyboard session.
//!
//! `SessionHandle::spawn` moves a `KeyboardApp` onto a tokio task that:
//!
//! - receives `Message`s from a bounded channel
//! - spawns one task per prediction request, so typing never waits on the
//!   prediction service
//! - ticks the animation every frame while a run is in progress, and not
//!   at all otherwise
//! - publishes a `KeyboardSnapshot` on a watch channel after every change
//!
//! Prediction results come back through their own channel and go through
//! `KeyboardApp::update`, where stale ones are dropped.

use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

use crate::app::{
    Command, KeyboardApp, KeyboardSnapshot, Message, PredictionCompletion, PredictionRequest,
};
use crate::app_settings::{ANIMATION_FRAME_INTERVAL_MS, MESSAGE_CHANNEL_CAPACITY};
use crate::prediction::{PredictionClient, PredictionService};

/// Handle to a running keyboard session.
#[derive(Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<Message>,
    snapshots: watch::Receiver<KeyboardSnapshot>,
    task: JoinHandle<KeyboardApp>,
}

impl SessionHandle {
    /// Starts the session on the current tokio runtime.
    pub fn spawn<S: PredictionService>(app: KeyboardApp, client: Arc<PredictionClient<S>>) -> Self {
        let (sender, receiver) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshots) = watch::channel(app.snapshot());

        let task = tokio::spawn(run_session(app, client, receiver, snapshot_tx));

        Self {
            sender,
            snapshots,
            task,
        }
    }

    /// Sends one message to the session.
    ///
    /// # Errors
    ///
    /// Fails if the session has already stopped.
    pub async fn send(&mut self, message: Message) -> Result<(), mpsc::SendError> {
        self.sender.send(message).await
    }

    /// Returns a receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<KeyboardSnapshot> {
        self.snapshots.clone()
    }

    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> KeyboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stops the session and returns its final state.
    pub async fn shutdown(mut self) -> Result<KeyboardApp, JoinError> {
        if self.sender.send(Message::Quit).await.is_err() {
            tracing::debug!("Session already stopped");
        }
        self.task.await
    }
}

async fn run_session<S: PredictionService>(
    mut app: KeyboardApp,
    client: Arc<PredictionClient<S>>,
    mut messages: mpsc::Receiver<Message>,
    snapshots: watch::Sender<KeyboardSnapshot>,
) -> KeyboardApp {
    let (completion_tx, mut completions) =
        mpsc::channel::<PredictionCompletion>(MESSAGE_CHANNEL_CAPACITY);

    let mut frames = tokio::time::interval(Duration::from_millis(ANIMATION_FRAME_INTERVAL_MS));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            message = messages.next() => {
                let Some(message) = message else {
                    tracing::debug!("All session senders dropped");
                    break;
                };
                match app.update(message, Instant::now().into_std()) {
                    Command::None => {}
                    Command::Predict(request) => {
                        spawn_prediction(Arc::clone(&client), request, completion_tx.clone());
                    }
                    Command::Quit => break,
                }
            }
            Some(completion) = completions.next() => {
                app.update(Message::PredictionReady(completion), Instant::now().into_std());
            }
            _ = frames.tick(), if app.is_animating() => {
                app.tick(Instant::now().into_std());
            }
        }

        snapshots.send_replace(app.snapshot());
    }

    app
}

fn spawn_prediction<S: PredictionService>(
    client: Arc<PredictionClient<S>>,
    request: PredictionRequest,
    mut completions: mpsc::Sender<PredictionCompletion>,
) {
    tokio::spawn(async move {
        let generation = request.generation;
        let prediction = client.predict(&request.text).await;
        let completion = PredictionCompletion::new(request, prediction);
        if completions.send(completion).await.is_err() {
            tracing::debug!("Session stopped before prediction #{} arrived", generation);
        }
    });
}

// ============================================================================
// Tests
// ============================================================================
