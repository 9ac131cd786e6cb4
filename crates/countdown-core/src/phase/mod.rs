mod celebration;
mod controller;

pub use celebration::{default_messages, CelebrationSequence};
pub use controller::{CountdownController, CountdownSettings};

use serde::{Deserialize, Serialize};

/// Top-level screen being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppPhase {
    Counting,
    Closing,
    Celebrating,
}

/// Progress of the closing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosingStage {
    /// Waiting before the lid starts to close.
    Preparing,
    /// Lid closing; confirmation not offered yet.
    Closing,
    /// Confirmation control visible.
    Ready,
}

/// Keyboard shortcuts understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Confirm closing -> celebrating.
    Enter,
    /// Start over from celebrating.
    Escape,
}

/// Delays and intervals driving the phase machine, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Countdown complete -> closing.
    #[serde(default = "default_closing_delay_ms")]
    pub closing_delay_ms: u64,
    /// Closing entered -> lid starts closing.
    #[serde(default = "default_lid_close_delay_ms")]
    pub lid_close_delay_ms: u64,
    /// Lid starts closing -> confirmation shown.
    #[serde(default = "default_confirm_reveal_ms")]
    pub confirm_reveal_ms: u64,
    #[serde(default = "default_confetti_ms")]
    pub confetti_ms: u64,
    /// Celebrating entered -> content shown.
    #[serde(default = "default_celebration_reveal_ms")]
    pub celebration_reveal_ms: u64,
    #[serde(default = "default_message_rotation_ms")]
    pub message_rotation_ms: u64,
}

fn default_tick_ms() -> u64 {
    1_000
}
fn default_closing_delay_ms() -> u64 {
    2_000
}
fn default_lid_close_delay_ms() -> u64 {
    1_000
}
fn default_confirm_reveal_ms() -> u64 {
    3_000
}
fn default_confetti_ms() -> u64 {
    5_000
}
fn default_celebration_reveal_ms() -> u64 {
    500
}
fn default_message_rotation_ms() -> u64 {
    3_000
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            closing_delay_ms: default_closing_delay_ms(),
            lid_close_delay_ms: default_lid_close_delay_ms(),
            confirm_reveal_ms: default_confirm_reveal_ms(),
            confetti_ms: default_confetti_ms(),
            celebration_reveal_ms: default_celebration_reveal_ms(),
            message_rotation_ms: default_message_rotation_ms(),
        }
    }
}

impl Timing {
    /// Dwell between entering closing and the confirmation becoming available.
    pub fn closing_dwell_ms(&self) -> u64 {
        self.lid_close_delay_ms.saturating_add(self.confirm_reveal_ms)
    }
}
