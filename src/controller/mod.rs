//! Controller module - the session engine
//!
//! The engine owns the session state and drives the launcher protocol: read one
//! event, update state, render the next screen, write it, repeat. It is
//! organized into submodules by responsibility:
//!
//! - `input`: Event decoding and dispatch
//! - `navigation`: Channel, playlist and video screens backed by the cache
//! - `playback`: External player launching

mod input;
mod navigation;
mod playback;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::model::{CacheStore, Channel, SessionState};
use crate::view::Screen;

pub use input::InputEvent;
pub use playback::{ExternalPlayer, PlayerLauncher};

/// Time the launcher gets to read the last screen before the process ends
pub const EXIT_GRACE: Duration = Duration::from_secs(2);

const INITIAL_MESSAGE: &str = "channels list";

/// What the loop does after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct SessionEngine {
    store: CacheStore,
    launcher: Box<dyn PlayerLauncher>,
    state: SessionState,
    /// Last rendered screen; re-emitted when an event changes nothing
    screen: Screen,
    channels: HashMap<String, Channel>,
    exit_grace: Duration,
}

impl SessionEngine {
    pub fn new(store: CacheStore, launcher: Box<dyn PlayerLauncher>) -> Self {
        Self {
            store,
            launcher,
            state: SessionState::default(),
            screen: Screen::default(),
            channels: HashMap::new(),
            exit_grace: EXIT_GRACE,
        }
    }

    pub fn with_exit_grace(mut self, grace: Duration) -> Self {
        self.exit_grace = grace;
        self
    }

    /// Show the channel list, then serve events until playback starts or the
    /// input ends. A line that is not a valid event ends the session with an error.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        // Initial screen, before any input is read
        self.show_channels(INITIAL_MESSAGE).await;
        self.emit(output).await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("failed to read input")? {
            // Blank lines carry no event
            if line.trim().is_empty() {
                continue;
            }

            let event: InputEvent = serde_json::from_str(&line)
                .with_context(|| format!("malformed input event: {line}"))?;
            tracing::debug!(name = %event.name, value = %event.value, data = %event.data, "Event received");

            if self.handle_event(&event, output).await? == Flow::Exit {
                tracing::info!(grace_ms = self.exit_grace.as_millis() as u64, "Playback started, exiting");
                // Give the launcher time to read the final screen
                tokio::time::sleep(self.exit_grace).await;
                return Ok(());
            }
        }

        tracing::info!("Input closed");
        Ok(())
    }

    /// Write the current screen as one JSON line and flush it
    pub(crate) async fn emit<W>(&mut self, output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        self.screen.input.clear();
        let mut json = serde_json::to_vec(&self.screen).context("failed to encode screen")?;
        json.push(b'\n');
        output.write_all(&json).await.context("failed to write screen")?;
        output.flush().await.context("failed to flush screen")?;
        Ok(())
    }

    fn channel_title(&self, channel_id: &str) -> String {
        self.channels
            .get(channel_id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| channel_id.to_string())
    }
}
