//! Integration tests for the phase controller driven on virtual time.

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::America::New_York;
use countdown_core::{
    AppPhase, ClosingStage, Config, CountdownController, DayCounting, Event, ManualClock,
    PickerAction, QuickPick, Shortcut,
};
use proptest::prelude::*;

fn target() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 17)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Advance the wall clock and the controller together, one tick at a time.
fn run_for<Tz: TimeZone>(
    ctl: &mut CountdownController<ManualClock<Tz>>,
    clock: &ManualClock<Tz>,
    ms: u64,
) -> Vec<Event> {
    let mut events = Vec::new();
    let mut left = ms;
    while left > 0 {
        let step = left.min(1_000);
        clock.advance_ms(step);
        events.extend(ctl.advance(step));
        left -= step;
    }
    events
}

fn phase_changes(events: &[Event]) -> Vec<(AppPhase, AppPhase)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseChanged { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

#[test]
fn real_time_crossing_the_target_runs_full_sequence() {
    let clock = ManualClock::new(target() - Duration::seconds(3));
    let mut ctl = CountdownController::new(Config::default().settings(), clock.clone());
    let mut events = ctl.start();
    assert_eq!(ctl.snapshot().seconds, 3);

    events.extend(run_for(&mut ctl, &clock, 2_000));
    assert_eq!(ctl.snapshot().seconds, 1);
    assert_eq!(ctl.phase(), AppPhase::Counting);

    // Tick at T: complete, closing armed for T+2s.
    events.extend(run_for(&mut ctl, &clock, 1_000));
    assert!(ctl.snapshot().is_complete);
    assert_eq!(ctl.phase(), AppPhase::Counting);

    events.extend(run_for(&mut ctl, &clock, 2_000));
    assert_eq!(ctl.phase(), AppPhase::Closing);
    assert!(ctl.confetti_active());

    events.extend(run_for(&mut ctl, &clock, 4_000));
    assert_eq!(ctl.closing_stage(), Some(ClosingStage::Ready));
    events.extend(ctl.handle_shortcut(Shortcut::Enter));
    assert_eq!(ctl.phase(), AppPhase::Celebrating);

    events.extend(run_for(&mut ctl, &clock, 10_000));
    assert!(ctl.celebration().content_visible());
    assert_eq!(ctl.celebration().index(), 3);

    assert_eq!(
        phase_changes(&events),
        vec![
            (AppPhase::Counting, AppPhase::Closing),
            (AppPhase::Closing, AppPhase::Celebrating),
        ]
    );
}

#[test]
fn override_preview_reports_two_days() {
    let clock = ManualClock::new(target() - Duration::days(90));
    let mut ctl = CountdownController::new(Config::default().settings(), clock.clone());
    ctl.start();
    ctl.open_picker();
    ctl.picker_quick_pick(QuickPick::TwoDaysLeft);
    assert_eq!(ctl.picker().preview_days(), 2);
    ctl.close_picker(PickerAction::Apply);

    // Real time keeps moving, the override does not.
    run_for(&mut ctl, &clock, 5_000);
    assert_eq!(ctl.snapshot().days, 2);
    assert_eq!((ctl.snapshot().hours, ctl.snapshot().seconds), (0, 0));
}

#[test]
fn confetti_cue_runs_independently_of_phase_timing() {
    let clock = ManualClock::new(target() + Duration::hours(1));
    let mut ctl = CountdownController::new(Config::default().settings(), clock.clone());
    ctl.start();
    let events = run_for(&mut ctl, &clock, 12_000);
    let started = events
        .iter()
        .find_map(|e| match e {
            Event::ConfettiStarted { at_ms, .. } => Some(*at_ms),
            _ => None,
        })
        .unwrap();
    let ended = events
        .iter()
        .find_map(|e| match e {
            Event::ConfettiEnded { at_ms } => Some(*at_ms),
            _ => None,
        })
        .unwrap();
    assert_eq!(started, 2_000);
    assert_eq!(ended, 7_000);
    // Still waiting for confirmation.
    assert_eq!(ctl.phase(), AppPhase::Closing);
}

#[test]
fn countdown_keeps_falling_through_a_dst_fall_back() {
    let wall = |d: u32, h: u32, m: u32| {
        NaiveDate::from_ymd_opt(2025, 11, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    };
    let mut config = Config::default();
    config.target.at = wall(3, 0, 0);
    config.display.day_counting = DayCounting::Elapsed;
    let clock = ManualClock::in_zone(New_York, wall(2, 0, 30));
    let mut ctl = CountdownController::new(config.settings(), clock.clone());
    ctl.start();

    // 00:30 EDT until 01:30 EST: two real hours, one wall-clock hour.
    let ticks: Vec<u64> = run_for(&mut ctl, &clock, 2 * 3_600_000)
        .iter()
        .filter_map(|e| match e {
            Event::Tick { snapshot, .. } => Some(
                snapshot.days * 86_400
                    + snapshot.hours * 3_600
                    + snapshot.minutes * 60
                    + snapshot.seconds,
            ),
            _ => None,
        })
        .collect();
    assert_eq!(ticks.len(), 7_200);
    assert!(ticks.windows(2).all(|w| w[1] < w[0]));
    assert_eq!(ctl.effective_now(), wall(2, 1, 30));
    assert_eq!((ctl.snapshot().hours, ctl.snapshot().minutes), (22, 30));
}

#[derive(Debug, Clone)]
enum Action {
    Advance(u64),
    Enter,
    Escape,
    CelebrateMore,
    Override(i64),
    ClearOverride,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (1u64..5_000).prop_map(Action::Advance),
        Just(Action::Enter),
        Just(Action::Escape),
        Just(Action::CelebrateMore),
        (-10i64..3).prop_map(Action::Override),
        Just(Action::ClearOverride),
    ]
}

proptest! {
    #[test]
    fn phase_never_skips_closing(
        start_offset_s in -30i64..30,
        actions in prop::collection::vec(action(), 1..60),
    ) {
        let clock = ManualClock::new(target() + Duration::seconds(start_offset_s));
        let mut ctl = CountdownController::new(Config::default().settings(), clock.clone());
        let mut events = ctl.start();

        for action in actions {
            let before = ctl.phase();
            let produced = match action {
                Action::Advance(ms) => run_for(&mut ctl, &clock, ms),
                Action::Enter => ctl.handle_shortcut(Shortcut::Enter),
                Action::Escape => ctl.handle_shortcut(Shortcut::Escape),
                Action::CelebrateMore => ctl.celebrate_more(),
                Action::Override(days) => {
                    ctl.set_override_date(target().date() + Duration::days(days))
                }
                Action::ClearOverride => ctl.set_override(None),
            };
            if before == AppPhase::Celebrating && ctl.phase() == AppPhase::Counting {
                prop_assert_eq!(ctl.override_date(), None);
            }
            events.extend(produced);
        }

        for (from, to) in phase_changes(&events) {
            let allowed = matches!(
                (from, to),
                (AppPhase::Counting, AppPhase::Closing)
                    | (AppPhase::Closing, AppPhase::Celebrating)
                    | (AppPhase::Celebrating, AppPhase::Counting)
            );
            prop_assert!(allowed, "illegal transition {:?} -> {:?}", from, to);
        }

        ctl.shutdown();
        prop_assert_eq!(ctl.pending_timers(), 0);
    }
}
