use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use countdown_core::{AppPhase, Clock, ClosingStage, QuickPick};

use super::App;
use crate::commands::{long_date, short_date};

const ACCENT: Color = Color::Magenta;
const MUTED: Color = Color::Gray;
const CONFETTI_COLORS: [Color; 4] = [
    Color::Yellow,
    Color::LightMagenta,
    Color::LightBlue,
    Color::LightGreen,
];
const CONFETTI_PIECES: usize = 60;
/// Fixed so every frame scatters the same pieces and only the fall moves them.
const CONFETTI_SEED: u64 = 0x5EED;

const CELEBRATION_STATS: [(&str, &str); 3] = [
    ("Target Reached", "Mission Complete"),
    ("Perfect Timing", "Right on Schedule"),
    ("Next Chapter", "Journey Continues"),
];

pub fn draw<C: Clock>(frame: &mut Frame, app: &App<C>) {
    let [body, footer] =
        Layout::vertical([Constraint::Min(10), Constraint::Length(3)]).areas(frame.area());

    if app.ctl.confetti_active() {
        render_confetti(frame, body, app.ctl.now_ms());
    }

    match app.ctl.phase() {
        AppPhase::Counting => render_countdown(frame, body, app),
        AppPhase::Closing => render_closing(frame, body, app),
        AppPhase::Celebrating => render_celebration(frame, body, app),
    }
    render_footer(frame, footer, app);

    if app.ctl.picker().is_open() {
        render_picker(frame, app);
    }
}

fn bold(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn muted(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(MUTED)))
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

fn render_countdown<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let snap = app.ctl.snapshot();
    let [header, grid, progress] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .areas(area);

    let header_lines = vec![
        Line::from(""),
        bold(app.title.clone()),
        muted(format!("to {}", long_date(app.ctl.target()))),
        Line::from(app.subtitle.clone()),
    ];
    frame.render_widget(
        Paragraph::new(header_lines).alignment(Alignment::Center),
        header,
    );

    if snap.is_complete {
        let done = Paragraph::new(vec![
            bold("TIME'S UP!"),
            Line::from(format!("{} has arrived!", long_date(app.ctl.target()))),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(done, grid);
    } else {
        let cells = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(grid);
        for ((label, value), cell) in snap.units().iter().zip(cells.iter()) {
            let widget = Paragraph::new(vec![bold(format!("{value:02}")), muted(label.to_uppercase())])
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(widget, *cell);
        }
    }

    if app.show_progress {
        render_progress(frame, progress, app);
    }
}

fn render_progress<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let progress = app.ctl.progress();
    let [gauge_area, detail] =
        Layout::vertical([Constraint::Length(3), Constraint::Length(1)]).areas(area);

    let title = format!(
        " {}  ·  Journey Progress  ·  {} ",
        short_date(app.ctl.journey_start()),
        short_date(app.ctl.target())
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(ACCENT))
        .ratio(progress.ratio().clamp(0.0, 1.0))
        .label(progress.percent_label());
    frame.render_widget(gauge, gauge_area);

    let detail_line = muted(format!(
        "{} days spent   {} total days",
        progress.days_spent, progress.total_days
    ));
    frame.render_widget(
        Paragraph::new(detail_line).alignment(Alignment::Center),
        detail,
    );
}

// ---------------------------------------------------------------------------
// Closing
// ---------------------------------------------------------------------------

fn lid_art(stage: ClosingStage) -> &'static [&'static str] {
    match stage {
        ClosingStage::Preparing => &[
            " ________________ ",
            "|  > Let's begin |",
            "|  _             |",
            "|                |",
            "|________________|",
            "/________________\\",
        ],
        ClosingStage::Closing => &[
            "",
            "",
            " ________________ ",
            "|________________|",
            "/________________\\",
            "",
        ],
        ClosingStage::Ready => &["", "", "", " ________________ ", "/________________\\", ""],
    }
}

fn render_closing<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let stage = app.ctl.closing_stage().unwrap_or(ClosingStage::Preparing);
    let status = match stage {
        ClosingStage::Preparing => "Preparing your experience...",
        ClosingStage::Closing => "Closing up...",
        ClosingStage::Ready => "Ready to continue!",
    };

    let mut lines = vec![
        Line::from(""),
        bold("Time to Get Started!"),
        muted("Your new journey begins now..."),
        Line::from(""),
    ];
    lines.extend(lid_art(stage).iter().map(|row| Line::from(*row)));
    lines.push(Line::from(""));
    lines.push(muted(status));
    if app.ctl.can_confirm() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[ Let's Go! ]",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

// ---------------------------------------------------------------------------
// Celebrating
// ---------------------------------------------------------------------------

fn render_celebration<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let celebration = app.ctl.celebration();
    if !celebration.content_visible() {
        return;
    }

    let [message, stats, _] = Layout::vertical([
        Constraint::Length(8),
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            celebration.current_message().to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        bold(format!("{} is here!", long_date(app.ctl.target()))),
        Line::from(app.headline.clone()),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        message,
    );

    let cells = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(stats);
    for ((title, caption), cell) in CELEBRATION_STATS.iter().zip(cells.iter()) {
        let widget = Paragraph::new(vec![bold(*title), muted(*caption)])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(widget, *cell);
    }
}

// ---------------------------------------------------------------------------
// Confetti
// ---------------------------------------------------------------------------

fn render_confetti(frame: &mut Frame, area: Rect, now_ms: u64) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    // Pieces fall one row every 150ms.
    let fall = now_ms / 150;
    let mut rng = Mcg128Xsl64::seed_from_u64(CONFETTI_SEED);
    let buf = frame.buffer_mut();
    for _ in 0..CONFETTI_PIECES {
        let x = area.x + rng.gen_range(0..area.width);
        let row = rng.gen_range(0..u64::from(area.height));
        let y = area.y + ((row + fall) % u64::from(area.height)) as u16;
        let color = CONFETTI_COLORS[rng.gen_range(0..CONFETTI_COLORS.len())];
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_char('*').set_fg(color);
        }
    }
}

// ---------------------------------------------------------------------------
// Footer and picker
// ---------------------------------------------------------------------------

fn render_footer<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let hints = match app.ctl.phase() {
        AppPhase::Counting => "t test date  q quit",
        AppPhase::Closing if app.ctl.can_confirm() => "Enter let's go  t test date  q quit",
        AppPhase::Closing => "t test date  q quit",
        AppPhase::Celebrating => "Esc start over  m celebrate more  t test date  q quit",
    };

    let mut spans = vec![Span::styled(hints, Style::default().fg(MUTED))];
    if let Some(at) = app.ctl.override_date() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("test date {}", at.date()),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(notice) = &app.notice {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Red)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP)),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_picker<C: Clock>(frame: &mut Frame, app: &App<C>) {
    let picker = app.ctl.picker();
    let area = centered(frame.area(), 56, 18);
    let target_date = picker.target_date();
    let current = app.ctl.effective_now();
    let remaining = countdown_core::date_override::days_remaining(current.date(), target_date);

    let remaining_span = if remaining == 0 {
        Span::styled("COMPLETED!", Style::default().fg(Color::Red))
    } else {
        Span::styled(format!("{remaining} days"), Style::default().fg(Color::Green))
    };

    let input = if app.date_input.is_empty() {
        Span::styled(picker.selected().to_string(), Style::default().fg(MUTED))
    } else {
        Span::raw(format!("{}_", app.date_input))
    };

    let mut lines = vec![
        Line::from(format!("Current date:   {}", long_date(current))),
        Line::from(format!("Target date:    {}", long_date(app.ctl.target()))),
        Line::from(vec![Span::raw("Days remaining: "), remaining_span]),
        Line::from(""),
        Line::from(vec![Span::raw("Date: "), input]),
        muted(format!("Date cannot be after {target_date}")),
        Line::from(format!("Preview: {} days remaining", picker.preview_days())),
        Line::from(""),
    ];
    for (key, pick) in ['a', 'b', 'c', 'd'].iter().zip(QuickPick::ALL) {
        lines.push(Line::from(format!(
            "[{key}] {:<14} {}",
            pick.label(),
            pick.date_for(target_date)
        )));
    }
    lines.push(Line::from(""));
    lines.push(muted("Enter apply  r use real date  Esc cancel"));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Set Test Date "),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use countdown_core::{Config, CountdownController, ManualClock};
    use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use ratatui::{backend::TestBackend, Terminal};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn screen_text(app: &App<ManualClock>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn app(now: NaiveDateTime) -> App<ManualClock> {
        let config = Config::default();
        let mut ctl = CountdownController::new(config.settings(), ManualClock::new(now));
        ctl.start();
        App::new(ctl, &config)
    }

    #[test]
    fn countdown_screen_shows_grid_and_progress() {
        let a = app(at(2025, 10, 15, 12));
        let text = screen_text(&a);
        assert!(text.contains("to October 17, 2025"));
        assert!(text.contains("DAYS"));
        assert!(text.contains("02"));
        assert!(text.contains("Journey Progress"));
        assert!(text.contains("total days"));
    }

    #[test]
    fn closing_screen_offers_confirmation_when_ready() {
        let mut a = app(at(2025, 10, 20, 9));
        a.ctl.advance(2_000);
        assert!(screen_text(&a).contains("Preparing your experience"));
        a.ctl.advance(4_000);
        let text = screen_text(&a);
        assert!(text.contains("Ready to continue!"));
        assert!(text.contains("Let's Go!"));
    }

    #[test]
    fn confetti_holds_still_within_a_frame_and_falls_between_frames() {
        let mut a = app(at(2025, 10, 20, 9));
        a.ctl.advance(2_000);
        assert!(a.ctl.confetti_active());
        let first = screen_text(&a);
        assert!(first.contains('*'));
        assert_eq!(first, screen_text(&a));

        a.ctl.advance(150);
        assert_ne!(first, screen_text(&a));

        a.ctl.advance(5_000);
        assert!(!a.ctl.confetti_active());
        assert!(!screen_text(&a).contains('*'));
    }

    #[test]
    fn celebration_screen_reveals_after_delay() {
        let mut a = app(at(2025, 10, 20, 9));
        a.ctl.advance(6_000);
        a.ctl.confirm();
        assert!(!screen_text(&a).contains("Best of Luck!"));
        a.ctl.advance(500);
        let text = screen_text(&a);
        assert!(text.contains("Best of Luck!"));
        assert!(text.contains("Target Reached"));
        assert!(text.contains("Esc start over"));
    }

    #[test]
    fn picker_popup_lists_quick_picks() {
        let mut a = app(at(2025, 9, 1, 9));
        a.ctl.open_picker();
        let text = screen_text(&a);
        assert!(text.contains("Set Test Date"));
        assert!(text.contains("2 days left"));
        assert!(text.contains("2025-10-18"));
    }
}
