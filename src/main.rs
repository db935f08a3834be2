// SPDX-License-Identifier: GPL-3.0-only

//! Predboard terminal demo
//!
//! Runs one keyboard session over stdin. Every character of a line is a key
//! press; lines starting with `:` are commands:
//!
//! - `:shift`, `:back`, `:enter`: the action keys
//! - `:mode`: toggle accessible mode
//! - `:theme`: toggle the theme
//! - `:duration <ms>`: set the animation duration
//! - `:word <word>`: insert a whole word
//! - `:suggest <word> <word> ...`: predict the next word from a list
//! - `:quit`: end the session
//!
//! Set `PREDBOARD_CONFIG` to a JSON config file to pick a prediction server
//! or a layout.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use predboard::app::{KeyboardApp, KeyboardSnapshot, Message};
use predboard::app_settings;
use predboard::config::Config;
use predboard::layout::{parse_layout_file, KeyId, Layout};
use predboard::prediction::{FrequencyStub, HttpService, PredictionClient, PredictionService};
use predboard::runtime::SessionHandle;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "PREDBOARD_CONFIG";

/// Number of emphasised keys printed after each line.
const SHOWN_KEYS: usize = 5;

/// One parsed line of demo input.
#[derive(Debug, PartialEq)]
enum DemoInput {
    /// Messages for the session
    Messages(Vec<Message>),
    /// Candidate words to rank
    Suggest(Vec<String>),
    /// End of the session
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("{}=info", app_settings::APP_NAME).parse()?),
        )
        .init();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::default(),
    };

    let layout = match &config.layout_path {
        Some(path) => {
            let result = parse_layout_file(path)?;
            for warning in &result.warnings {
                tracing::warn!("{}", warning);
            }
            result.into_layout()
        }
        None => Layout::qwerty(),
    };
    let layout = Arc::new(layout);

    match config.service_url.clone() {
        Some(url) => {
            tracing::info!("Using prediction server at {}", url);
            let service = HttpService::new(url, config.request_timeout())?;
            run(layout, config, service).await
        }
        None => {
            tracing::info!("No service_url configured, using the frequency stub");
            run(layout, config, FrequencyStub).await
        }
    }
}

async fn run<S: PredictionService>(
    layout: Arc<Layout>,
    config: Config,
    service: S,
) -> Result<(), Box<dyn Error>> {
    let settle = Duration::from_millis(config.animation_duration_ms + config.request_timeout_ms);
    let client = Arc::new(PredictionClient::new(service).with_timeout(config.request_timeout()));
    let mut session = SessionHandle::spawn(KeyboardApp::new(layout, config), Arc::clone(&client));

    println!(
        "Type text and press enter. Commands: :shift :back :enter :mode :theme \
         :duration <ms> :word <w> :suggest <w>... :quit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            DemoInput::Quit => break,
            DemoInput::Suggest(words) => {
                let text = session.snapshot().text;
                let predicted = client.predict_words(&text, &words).await;
                if predicted.is_empty() {
                    println!("no word predictions");
                }
                for word in predicted {
                    println!("{:>12}  {:.2}", word.word, word.confidence);
                }
            }
            DemoInput::Messages(messages) => {
                for message in messages {
                    session.send(message).await?;
                }
                let snapshot = settled_snapshot(&session, settle).await;
                print_snapshot(&snapshot);
            }
        }
    }

    let app = session.shutdown().await?;
    println!("Final text: {:?}", app.text());
    Ok(())
}

/// Waits briefly for predictions to land and animations to finish.
async fn settled_snapshot(session: &SessionHandle, settle: Duration) -> KeyboardSnapshot {
    tokio::time::sleep(Duration::from_millis(app_settings::ANIMATION_FRAME_INTERVAL_MS * 4)).await;
    let mut snapshots = session.subscribe();
    if tokio::time::timeout(settle, snapshots.wait_for(|s| !s.animating))
        .await
        .is_err()
    {
        tracing::debug!("Keys still moving after {:?}", settle);
    }
    session.snapshot()
}

fn print_snapshot(snapshot: &KeyboardSnapshot) {
    let mut emphasised: Vec<_> = snapshot.keys.iter().filter(|key| key.height > 1.0).collect();
    emphasised.sort_by(|a, b| b.height.total_cmp(&a.height).then(b.flex.total_cmp(&a.flex)));

    println!(
        "text: {:?}{}  [{}{:?}]",
        snapshot.text,
        if snapshot.shift { "  (shift)" } else { "" },
        if snapshot.accessible { "accessible, " } else { "regular, " },
        snapshot.theme
    );
    for key in emphasised.iter().take(SHOWN_KEYS) {
        println!("{:>12}  flex {:.2}  height {:.2}", key.label, key.flex, key.height);
    }
}

fn parse_line(line: &str) -> DemoInput {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(command) = line.strip_prefix(':') {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let message = match name {
            "quit" => return DemoInput::Quit,
            "suggest" => return DemoInput::Suggest(parts.map(str::to_string).collect()),
            "shift" => Message::KeyActivated(KeyId::Shift),
            "back" => Message::KeyActivated(KeyId::Backspace),
            "enter" => Message::KeyActivated(KeyId::Enter),
            "mode" => Message::ToggleAccessible,
            "theme" => Message::ToggleTheme,
            "word" => Message::InsertWord(parts.collect::<Vec<_>>().join(" ")),
            "duration" => match parts.next().and_then(|ms| ms.parse().ok()) {
                Some(duration_ms) => Message::SetAnimationDuration(duration_ms),
                None => {
                    tracing::warn!("Usage: :duration <milliseconds>");
                    return DemoInput::Messages(Vec::new());
                }
            },
            other => {
                tracing::warn!("Unknown command ':{}'", other);
                return DemoInput::Messages(Vec::new());
            }
        };
        return DemoInput::Messages(vec![message]);
    }

    let mut messages = Vec::new();
    for c in line.chars() {
        let Some(key) = KeyId::from_char(c) else {
            tracing::warn!("No key for {:?}, skipped", c);
            continue;
        };
        if c.is_ascii_uppercase() {
            messages.push(Message::KeyActivated(KeyId::Shift));
        }
        messages.push(Message::KeyActivated(key));
    }
    DemoInput::Messages(messages)
}
