use clap::Args;
use countdown_core::{Config, CountdownController, SystemClock};

use super::{long_date, short_date, OverrideArgs};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub over: OverrideArgs,
    /// Print the full state snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut ctl = CountdownController::new(config.settings(), SystemClock);
    if let Some(date) = args.over.resolve(ctl.target())? {
        ctl.set_override_date(date);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ctl.status())?);
        return Ok(());
    }

    let snap = ctl.snapshot();
    println!("{} to {}", config.target.title, long_date(ctl.target()));
    println!("{}", config.target.subtitle);
    if let Some(at) = ctl.override_date() {
        println!("(test date {})", at.date());
    }
    println!();

    if snap.is_complete {
        println!("  TIME'S UP! {} has arrived!", long_date(ctl.target()));
    } else {
        let cells: Vec<String> = snap
            .units()
            .iter()
            .map(|(label, value)| format!("{value:02} {label}"))
            .collect();
        println!("  {}", cells.join("  "));
    }

    if config.display.show_progress {
        let progress = ctl.progress();
        println!();
        println!(
            "  {}  ->  {}",
            short_date(ctl.journey_start()),
            short_date(ctl.target())
        );
        println!(
            "  {} days spent | {} | {} total days",
            progress.days_spent,
            progress.percent_label(),
            progress.total_days
        );
    }
    Ok(())
}
