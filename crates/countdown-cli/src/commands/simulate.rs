//! Headless run of the phase sequence on virtual time.
//!
//! The wall clock starts at the real local time and moves with the
//! scheduler, so a run of N seconds finishes instantly.

use chrono::Local;
use clap::Args;
use countdown_core::{AppPhase, Config, CountdownController, Event, ManualClock};

use super::OverrideArgs;

const STEP_MS: u64 = 100;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub over: OverrideArgs,
    /// Virtual seconds to run
    #[arg(long, default_value_t = 15)]
    pub seconds: u64,
    /// Confirm as soon as the closing screen allows it
    #[arg(long)]
    pub confirm: bool,
    /// Start over once the celebration content is shown
    #[arg(long)]
    pub reset: bool,
    /// Include per-second tick events
    #[arg(long)]
    pub ticks: bool,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let clock = ManualClock::in_zone(Local, Local::now().naive_local());
    let mut ctl = CountdownController::new(config.settings(), clock.clone());

    let mut trace = Vec::new();
    if let Some(date) = args.over.resolve(ctl.target())? {
        trace.extend(ctl.set_override_date(date));
    }
    trace.extend(ctl.start());
    emit(&trace, args.ticks)?;

    let mut reset_done = false;
    let total_ms = args.seconds.saturating_mul(1_000);
    let mut elapsed = 0;
    while elapsed < total_ms {
        let step = STEP_MS.min(total_ms - elapsed);
        clock.advance_ms(step);
        let mut events = ctl.advance(step);
        elapsed += step;

        if args.confirm && ctl.can_confirm() {
            events.extend(ctl.confirm());
        }
        if args.reset
            && !reset_done
            && ctl.phase() == AppPhase::Celebrating
            && ctl.celebration().content_visible()
        {
            events.extend(ctl.reset());
            reset_done = true;
        }
        emit(&events, args.ticks)?;
    }

    ctl.shutdown();
    println!("{}", serde_json::to_string(&ctl.status())?);
    Ok(())
}

fn emit(events: &[Event], ticks: bool) -> Result<(), serde_json::Error> {
    for event in events.iter().filter(|e| ticks || !e.is_tick()) {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
