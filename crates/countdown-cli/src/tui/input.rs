use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use countdown_core::{Clock, PickerAction, QuickPick, Shortcut};

use super::App;

/// Longest accepted test-date input ("YYYY-MM-DD").
const DATE_INPUT_MAX: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

pub fn handle_key<C: Clock>(app: &mut App<C>, key: KeyEvent) -> KeyOutcome {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyOutcome::Quit;
    }
    if app.ctl.picker().is_open() {
        handle_picker_key(app, key.code);
        return KeyOutcome::Continue;
    }

    let events = match key.code {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Enter => app.ctl.handle_shortcut(Shortcut::Enter),
        KeyCode::Esc => app.ctl.handle_shortcut(Shortcut::Escape),
        KeyCode::Char('m') => app.ctl.celebrate_more(),
        KeyCode::Char('t') => {
            if app.ctl.open_picker() {
                app.date_input.clear();
                app.notice = None;
            }
            Vec::new()
        }
        _ => Vec::new(),
    };
    app.log_events(&events);
    KeyOutcome::Continue
}

fn quick_pick_for(c: char) -> Option<QuickPick> {
    match c {
        'a' => Some(QuickPick::TwoDaysLeft),
        'b' => Some(QuickPick::SevenDaysLeft),
        'c' => Some(QuickPick::TargetDay),
        'd' => Some(QuickPick::AfterTarget),
        _ => None,
    }
}

fn handle_picker_key<C: Clock>(app: &mut App<C>, code: KeyCode) {
    let events = match code {
        KeyCode::Esc => app.ctl.close_picker(PickerAction::Cancel),
        KeyCode::Char('r') => app.ctl.close_picker(PickerAction::UseRealDate),
        KeyCode::Enter => {
            let text = app.date_input.trim().to_string();
            if !text.is_empty() {
                if let Err(err) = app.ctl.picker_input(&text) {
                    app.notice = Some(err.to_string());
                    return;
                }
            }
            app.date_input.clear();
            app.notice = None;
            app.ctl.close_picker(PickerAction::Apply)
        }
        KeyCode::Char(c) if quick_pick_for(c).is_some() => {
            if let Some(pick) = quick_pick_for(c) {
                app.ctl.picker_quick_pick(pick);
                app.date_input.clear();
            }
            Vec::new()
        }
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
            if app.date_input.len() < DATE_INPUT_MAX {
                app.date_input.push(c);
            }
            Vec::new()
        }
        KeyCode::Backspace => {
            app.date_input.pop();
            Vec::new()
        }
        _ => Vec::new(),
    };
    app.log_events(&events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use countdown_core::{AppPhase, Config, CountdownController, ManualClock};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn app(now: NaiveDateTime) -> App<ManualClock> {
        let config = Config::default();
        let mut ctl = CountdownController::new(config.settings(), ManualClock::new(now));
        ctl.start();
        App::new(ctl, &config)
    }

    fn press(app: &mut App<ManualClock>, code: KeyCode) -> KeyOutcome {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App<ManualClock>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let mut a = app(at(2025, 9, 1));
        assert_eq!(press(&mut a, KeyCode::Char('q')), KeyOutcome::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut a, ctrl_c), KeyOutcome::Quit);
    }

    #[test]
    fn typed_date_applies_override() {
        let mut a = app(at(2025, 9, 1));
        press(&mut a, KeyCode::Char('t'));
        assert!(a.ctl.picker().is_open());
        type_text(&mut a, "2025-10-15");
        press(&mut a, KeyCode::Enter);
        assert!(!a.ctl.picker().is_open());
        assert_eq!(a.ctl.snapshot().days, 2);
    }

    #[test]
    fn rejected_date_keeps_picker_open_with_notice() {
        let mut a = app(at(2025, 9, 1));
        press(&mut a, KeyCode::Char('t'));
        type_text(&mut a, "2025-10-20");
        press(&mut a, KeyCode::Enter);
        assert!(a.ctl.picker().is_open());
        assert!(a.notice.as_deref().unwrap_or("").contains("after the target"));
        assert_eq!(a.ctl.override_date(), None);

        press(&mut a, KeyCode::Esc);
        assert!(!a.ctl.picker().is_open());
        assert_eq!(a.ctl.override_date(), None);
    }

    #[test]
    fn quick_pick_then_real_date() {
        let mut a = app(at(2025, 9, 1));
        press(&mut a, KeyCode::Char('t'));
        press(&mut a, KeyCode::Char('d'));
        press(&mut a, KeyCode::Enter);
        assert!(a.ctl.snapshot().is_complete);

        press(&mut a, KeyCode::Char('t'));
        press(&mut a, KeyCode::Char('r'));
        assert_eq!(a.ctl.override_date(), None);
        assert!(!a.ctl.snapshot().is_complete);
    }

    #[test]
    fn enter_and_escape_drive_phases() {
        let mut a = app(at(2025, 10, 20));
        a.ctl.advance(6_000);
        assert_eq!(a.ctl.phase(), AppPhase::Closing);
        press(&mut a, KeyCode::Enter);
        assert_eq!(a.ctl.phase(), AppPhase::Celebrating);
        press(&mut a, KeyCode::Esc);
        assert_eq!(a.ctl.phase(), AppPhase::Counting);
    }

    #[test]
    fn backspace_edits_input() {
        let mut a = app(at(2025, 9, 1));
        press(&mut a, KeyCode::Char('t'));
        type_text(&mut a, "2025-10-155");
        assert_eq!(a.date_input, "2025-10-15");
        press(&mut a, KeyCode::Backspace);
        assert_eq!(a.date_input, "2025-10-1");
    }
}
