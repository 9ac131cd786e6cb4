//! Phase controller.
//!
//! Owns the phase, the override date, the date picker and every timer. The
//! controller is single-threaded: front ends call [`CountdownController::advance`]
//! with elapsed time and the user intents below, all on one context.
//!
//! ## State Transitions
//!
//! ```text
//! Counting --(complete, closing_delay)--> Closing
//! Closing  --(dwell + confirm)----------> Celebrating
//! Celebrating --(reset)-----------------> Counting   (override cleared)
//! Celebrating --(celebrate more)--------> Counting   (fresh start on real time)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut ctl = CountdownController::new(settings, SystemClock);
//! ctl.start();
//! // In a loop:
//! let events = ctl.advance(elapsed_ms);
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use super::{AppPhase, CelebrationSequence, ClosingStage, Shortcut, Timing};
use crate::clock::{Clock, SystemClock};
use crate::countdown::{CountdownCalculator, CountdownSnapshot, DayCounting, JourneyProgress};
use crate::date_override::{override_instant, DatePicker, PickerAction, PickerOutcome, QuickPick};
use crate::error::ValidationError;
use crate::events::Event;
use crate::scheduler::{Fired, Scheduler, TimerId};

/// Everything the controller needs to know up front.
#[derive(Debug, Clone)]
pub struct CountdownSettings {
    pub target: NaiveDateTime,
    pub journey_start: NaiveDateTime,
    pub day_counting: DayCounting,
    pub timing: Timing,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerTask {
    Tick,
    EnterClosing,
    StartLidClose,
    RevealConfirm,
    EndConfetti,
    RevealCelebration,
    RotateMessage,
}

pub struct CountdownController<C: Clock = SystemClock> {
    clock: C,
    calculator: CountdownCalculator,
    journey_start: NaiveDateTime,
    timing: Timing,

    phase: AppPhase,
    closing_stage: ClosingStage,
    override_at: Option<NaiveDateTime>,
    snapshot: CountdownSnapshot,
    confetti: bool,
    celebration: CelebrationSequence,
    picker: DatePicker,

    scheduler: Scheduler<TimerTask>,
    tick_timer: Option<TimerId>,
    closing_timer: Option<TimerId>,
    confetti_timer: Option<TimerId>,
    /// Timers belonging to the current phase; dropped when it is left.
    phase_timers: Vec<TimerId>,
}

impl<C: Clock> CountdownController<C> {
    pub fn new(settings: CountdownSettings, clock: C) -> Self {
        let calculator =
            CountdownCalculator::new(clock.resolve(settings.target), settings.day_counting);
        let snapshot = calculator.snapshot_at(&clock.now());
        Self {
            clock,
            calculator,
            journey_start: settings.journey_start,
            timing: settings.timing,
            phase: AppPhase::Counting,
            closing_stage: ClosingStage::Preparing,
            override_at: None,
            snapshot,
            confetti: false,
            celebration: CelebrationSequence::new(settings.messages),
            picker: DatePicker::new(settings.target.date()),
            scheduler: Scheduler::new(),
            tick_timer: None,
            closing_timer: None,
            confetti_timer: None,
            phase_timers: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    /// Stage of the closing screen; `None` outside `Closing`.
    pub fn closing_stage(&self) -> Option<ClosingStage> {
        (self.phase == AppPhase::Closing).then_some(self.closing_stage)
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        self.snapshot
    }

    pub fn override_date(&self) -> Option<NaiveDateTime> {
        self.override_at
    }

    /// Wall-clock reading all calculations use: the override if set, else the clock.
    pub fn effective_now(&self) -> NaiveDateTime {
        self.effective_instant().naive_local()
    }

    /// The real instant behind [`Self::effective_now`].
    pub fn effective_instant(&self) -> DateTime<FixedOffset> {
        match self.override_at {
            Some(at) => self.clock.resolve(at),
            None => self.clock.now(),
        }
    }

    pub fn progress(&self) -> JourneyProgress {
        JourneyProgress::compute(
            self.effective_now(),
            self.journey_start,
            self.calculator.target(),
            self.snapshot.is_complete,
        )
    }

    pub fn target(&self) -> NaiveDateTime {
        self.calculator.target()
    }

    pub fn journey_start(&self) -> NaiveDateTime {
        self.journey_start
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn confetti_active(&self) -> bool {
        self.confetti
    }

    pub fn celebration(&self) -> &CelebrationSequence {
        &self.celebration
    }

    pub fn picker(&self) -> &DatePicker {
        &self.picker
    }

    /// Whether Enter / the confirm button would move to `Celebrating`.
    pub fn can_confirm(&self) -> bool {
        self.phase == AppPhase::Closing
            && self.closing_stage == ClosingStage::Ready
            && self.snapshot.is_complete
    }

    pub fn is_running(&self) -> bool {
        self.tick_timer.is_some()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Armed timers, including the recurring tick.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Virtual time of the next timer, for sleeping front ends.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.scheduler.next_deadline_ms()
    }

    /// Build a full state snapshot event.
    pub fn status(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            closing_stage: self.closing_stage(),
            snapshot: self.snapshot,
            progress: self.progress(),
            override_date: self.override_at,
            now: self.effective_now(),
            confetti: self.confetti,
            at_ms: self.now_ms(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Arm the recurring tick and recompute immediately. No-op when running.
    pub fn start(&mut self) -> Vec<Event> {
        if self.tick_timer.is_some() {
            return Vec::new();
        }
        self.tick_timer = Some(self.scheduler.every(self.timing.tick_ms, TimerTask::Tick));
        debug!(tick_ms = self.timing.tick_ms, "countdown started");
        let mut events = Vec::new();
        self.refresh(&mut events);
        events
    }

    /// Cancel every timer. The controller keeps its state and can be started again.
    pub fn shutdown(&mut self) {
        let dropped = self.scheduler.cancel_all();
        self.tick_timer = None;
        self.closing_timer = None;
        self.confetti_timer = None;
        self.phase_timers.clear();
        debug!(dropped, "countdown shut down");
    }

    /// Move virtual time forward, firing due timers in order.
    pub fn advance(&mut self, by_ms: u64) -> Vec<Event> {
        let until = self.scheduler.now_ms().saturating_add(by_ms);
        let mut events = Vec::new();
        while let Some(fired) = self.scheduler.pop_due(until) {
            self.dispatch(fired, &mut events);
        }
        self.scheduler.advance_clock_to(until);
        events
    }

    // ── Intents ──────────────────────────────────────────────────────

    /// Closing -> Celebrating. Empty when not eligible.
    pub fn confirm(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.can_confirm() {
            debug!(phase = ?self.phase, stage = ?self.closing_stage, "confirm ignored");
            return events;
        }
        self.leave_phase();
        self.stop_confetti(&mut events);
        self.set_phase(AppPhase::Celebrating, &mut events);
        self.begin_celebration();
        events
    }

    /// Celebrating -> Counting, clearing the override. Empty when not celebrating.
    pub fn reset(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.phase != AppPhase::Celebrating {
            debug!(phase = ?self.phase, "reset ignored");
            return events;
        }
        self.start_over(&mut events);
        events
    }

    /// Run the whole experience again as a fresh launch would: back to
    /// `Counting` on real time. If the target has already passed, the
    /// closing transition and its confetti follow on their own.
    pub fn celebrate_more(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.phase != AppPhase::Celebrating {
            return events;
        }
        self.picker.finish(PickerAction::Cancel);
        self.start_over(&mut events);
        events
    }

    pub fn handle_shortcut(&mut self, key: Shortcut) -> Vec<Event> {
        match key {
            Shortcut::Enter => self.confirm(),
            Shortcut::Escape => self.reset(),
        }
    }

    /// Substitute `at` for the real time (or go back to it with `None`) and
    /// recompute right away.
    pub fn set_override(&mut self, at: Option<NaiveDateTime>) -> Vec<Event> {
        let mut events = Vec::new();
        if self.override_at == at {
            return events;
        }
        self.override_at = at;
        debug!(override_date = ?at, "override changed");
        events.push(Event::OverrideChanged {
            date: at,
            at_ms: self.now_ms(),
        });
        self.refresh(&mut events);
        events
    }

    pub fn set_override_date(&mut self, date: NaiveDate) -> Vec<Event> {
        self.set_override(Some(override_instant(date)))
    }

    // ── Date picker ──────────────────────────────────────────────────

    /// Returns `false` when already open.
    pub fn open_picker(&mut self) -> bool {
        let current = self.override_at.map(|at| at.date());
        let today = self.clock.now().date_naive();
        self.picker.open(current, today)
    }

    pub fn picker_input(&mut self, text: &str) -> Result<NaiveDate, ValidationError> {
        self.picker.input(text).inspect_err(|err| {
            warn!(%err, "override date rejected");
        })
    }

    pub fn picker_quick_pick(&mut self, pick: QuickPick) -> NaiveDate {
        self.picker.quick_pick(pick)
    }

    pub fn close_picker(&mut self, action: PickerAction) -> Vec<Event> {
        match self.picker.finish(action) {
            Some(PickerOutcome::Set(date)) => self.set_override_date(date),
            Some(PickerOutcome::Clear) => self.set_override(None),
            Some(PickerOutcome::Unchanged) | None => Vec::new(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn dispatch(&mut self, fired: Fired<TimerTask>, events: &mut Vec<Event>) {
        let at_ms = fired.at_ms;
        match fired.task {
            TimerTask::Tick => {
                self.refresh(events);
                events.push(Event::Tick {
                    snapshot: self.snapshot,
                    at_ms,
                });
            }
            TimerTask::EnterClosing => {
                self.closing_timer = None;
                if self.phase == AppPhase::Counting {
                    self.enter_closing(events);
                }
            }
            TimerTask::StartLidClose => {
                self.forget_phase_timer(fired.id);
                if self.phase == AppPhase::Closing {
                    self.closing_stage = ClosingStage::Closing;
                    events.push(Event::ClosingStageChanged {
                        stage: ClosingStage::Closing,
                        at_ms,
                    });
                    let id = self
                        .scheduler
                        .after(self.timing.confirm_reveal_ms, TimerTask::RevealConfirm);
                    self.phase_timers.push(id);
                }
            }
            TimerTask::RevealConfirm => {
                self.forget_phase_timer(fired.id);
                if self.phase == AppPhase::Closing {
                    self.closing_stage = ClosingStage::Ready;
                    events.push(Event::ClosingStageChanged {
                        stage: ClosingStage::Ready,
                        at_ms,
                    });
                }
            }
            TimerTask::EndConfetti => {
                self.confetti_timer = None;
                if self.confetti {
                    self.confetti = false;
                    events.push(Event::ConfettiEnded { at_ms });
                }
            }
            TimerTask::RevealCelebration => {
                self.forget_phase_timer(fired.id);
                if self.phase == AppPhase::Celebrating {
                    self.celebration.reveal();
                    events.push(Event::CelebrationRevealed { at_ms });
                }
            }
            TimerTask::RotateMessage => {
                if self.phase == AppPhase::Celebrating {
                    let index = self.celebration.rotate();
                    events.push(Event::MessageRotated { index, at_ms });
                }
            }
        }
    }

    /// Recompute the snapshot and arm or drop the closing transition.
    fn refresh(&mut self, events: &mut Vec<Event>) {
        self.snapshot = self.calculator.snapshot_at(&self.effective_instant());
        if self.phase != AppPhase::Counting {
            return;
        }

        match (self.snapshot.is_complete, self.closing_timer) {
            (true, None) => {
                let delay = self.timing.closing_delay_ms;
                self.closing_timer = Some(self.scheduler.after(delay, TimerTask::EnterClosing));
                debug!(closing_in_ms = delay, "countdown complete");
                events.push(Event::CountdownCompleted {
                    closing_in_ms: delay,
                    at_ms: self.now_ms(),
                });
            }
            (false, Some(id)) => {
                self.scheduler.cancel(id);
                self.closing_timer = None;
                debug!("pending closing cancelled");
                events.push(Event::ClosingCancelled {
                    at_ms: self.now_ms(),
                });
            }
            _ => {}
        }
    }

    /// Drop every phase timer and the override, then count again on real time.
    fn start_over(&mut self, events: &mut Vec<Event>) {
        self.leave_phase();
        self.stop_confetti(events);
        self.celebration.restart();
        self.closing_stage = ClosingStage::Preparing;
        self.set_phase(AppPhase::Counting, events);
        if self.override_at.take().is_some() {
            events.push(Event::OverrideChanged {
                date: None,
                at_ms: self.now_ms(),
            });
        }
        events.push(Event::Reset {
            at_ms: self.now_ms(),
        });
        self.refresh(events);
    }

    fn enter_closing(&mut self, events: &mut Vec<Event>) {
        self.closing_stage = ClosingStage::Preparing;
        self.set_phase(AppPhase::Closing, events);
        self.start_confetti(events);
        let id = self
            .scheduler
            .after(self.timing.lid_close_delay_ms, TimerTask::StartLidClose);
        self.phase_timers.push(id);
    }

    fn begin_celebration(&mut self) {
        self.celebration.restart();
        let reveal = self
            .scheduler
            .after(self.timing.celebration_reveal_ms, TimerTask::RevealCelebration);
        let rotate = self
            .scheduler
            .every(self.timing.message_rotation_ms, TimerTask::RotateMessage);
        self.phase_timers.push(reveal);
        self.phase_timers.push(rotate);
    }

    fn set_phase(&mut self, to: AppPhase, events: &mut Vec<Event>) {
        let from = self.phase;
        self.phase = to;
        info!(?from, ?to, "phase changed");
        events.push(Event::PhaseChanged {
            from,
            to,
            at_ms: self.now_ms(),
        });
    }

    /// Cancel the timers started by the phase being left.
    fn leave_phase(&mut self) {
        for id in self.phase_timers.drain(..) {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.closing_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn forget_phase_timer(&mut self, id: TimerId) {
        self.phase_timers.retain(|t| *t != id);
    }

    fn start_confetti(&mut self, events: &mut Vec<Event>) {
        if let Some(id) = self.confetti_timer.take() {
            self.scheduler.cancel(id);
        }
        self.confetti = true;
        self.confetti_timer = Some(
            self.scheduler
                .after(self.timing.confetti_ms, TimerTask::EndConfetti),
        );
        events.push(Event::ConfettiStarted {
            duration_ms: self.timing.confetti_ms,
            at_ms: self.now_ms(),
        });
    }

    fn stop_confetti(&mut self, events: &mut Vec<Event>) {
        if let Some(id) = self.confetti_timer.take() {
            self.scheduler.cancel(id);
        }
        if self.confetti {
            self.confetti = false;
            events.push(Event::ConfettiEnded {
                at_ms: self.now_ms(),
            });
        }
    }
}
