//! External player launching

use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use super::{Flow, SessionEngine};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL}{video_id}")
}

/// Starts playback of a video somewhere outside this process
pub trait PlayerLauncher: Send + Sync {
    /// Succeeds once the player process exists; playback itself is not observed
    fn launch(&self, video_id: &str) -> Result<()>;
}

/// Spawns a player executable with the watch URL as its only argument
#[derive(Clone, Debug)]
pub struct ExternalPlayer {
    program: String,
}

impl ExternalPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PlayerLauncher for ExternalPlayer {
    fn launch(&self, video_id: &str) -> Result<()> {
        let url = watch_url(video_id);
        // stdout belongs to the launcher protocol
        let child = Command::new(&self.program)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start {}", self.program))?;

        tracing::info!(program = %self.program, pid = child.id(), url = %url, "Player started");
        Ok(())
    }
}

impl SessionEngine {
    pub(crate) fn play_video(&mut self, video_id: &str) -> Flow {
        match self.launcher.launch(video_id) {
            Ok(()) => Flow::Exit,
            Err(e) => {
                tracing::error!(video_id, error = %e, "Player launch failed");
                self.screen.message.push_str(" : error");
                Flow::Continue
            }
        }
    }
}
