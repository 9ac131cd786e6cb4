use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::countdown::{CountdownSnapshot, JourneyProgress};
use crate::phase::{AppPhase, ClosingStage};

/// Every state change in the controller produces an Event.
/// Front ends render from accessors; events are for logs and traces.
///
/// `at_ms` is the controller's virtual time, not wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Tick {
        snapshot: CountdownSnapshot,
        at_ms: u64,
    },
    /// Remaining time reached zero; closing armed.
    CountdownCompleted {
        closing_in_ms: u64,
        at_ms: u64,
    },
    /// The armed closing transition was dropped because the countdown is
    /// running again (override moved back before the target).
    ClosingCancelled {
        at_ms: u64,
    },
    PhaseChanged {
        from: AppPhase,
        to: AppPhase,
        at_ms: u64,
    },
    ClosingStageChanged {
        stage: ClosingStage,
        at_ms: u64,
    },
    ConfettiStarted {
        duration_ms: u64,
        at_ms: u64,
    },
    ConfettiEnded {
        at_ms: u64,
    },
    CelebrationRevealed {
        at_ms: u64,
    },
    MessageRotated {
        index: usize,
        at_ms: u64,
    },
    OverrideChanged {
        date: Option<NaiveDateTime>,
        at_ms: u64,
    },
    Reset {
        at_ms: u64,
    },
    StateSnapshot {
        phase: AppPhase,
        closing_stage: Option<ClosingStage>,
        snapshot: CountdownSnapshot,
        progress: JourneyProgress,
        override_date: Option<NaiveDateTime>,
        now: NaiveDateTime,
        confetti: bool,
        at_ms: u64,
    },
}

impl Event {
    pub fn at_ms(&self) -> u64 {
        match self {
            Event::Tick { at_ms, .. }
            | Event::CountdownCompleted { at_ms, .. }
            | Event::ClosingCancelled { at_ms }
            | Event::PhaseChanged { at_ms, .. }
            | Event::ClosingStageChanged { at_ms, .. }
            | Event::ConfettiStarted { at_ms, .. }
            | Event::ConfettiEnded { at_ms }
            | Event::CelebrationRevealed { at_ms }
            | Event::MessageRotated { at_ms, .. }
            | Event::OverrideChanged { at_ms, .. }
            | Event::Reset { at_ms }
            | Event::StateSnapshot { at_ms, .. } => *at_ms,
        }
    }

    pub fn is_tick(&self) -> bool {
        matches!(self, Event::Tick { .. })
    }
}
