//! # Countdown Core Library
//!
//! Business logic for a celebratory countdown: how long until the target,
//! which screen to show, and when to move on. Front ends (the `countdown`
//! CLI and its terminal UI) are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Calculator**: pure function of "now" and the target instant
//! - **Phase controller**: `Counting -> Closing -> Celebrating -> Counting`,
//!   driven by a virtual-time scheduler the caller advances
//! - **Date override**: tester-picked "now" for previewing every screen
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`CountdownController`]: owns phase, override and timers
//! - [`CountdownSnapshot`]: days/hours/minutes/seconds remaining
//! - [`Scheduler`]: cancelable one-shot and recurring timers
//! - [`Config`]: application configuration management

pub mod clock;
pub mod countdown;
pub mod date_override;
pub mod error;
pub mod events;
pub mod phase;
pub mod scheduler;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{CountdownCalculator, CountdownSnapshot, DayCounting, JourneyProgress};
pub use date_override::{DatePicker, PickerAction, QuickPick};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use phase::{AppPhase, ClosingStage, CountdownController, CountdownSettings, Shortcut, Timing};
pub use scheduler::{Scheduler, TimerId};
pub use storage::Config;
