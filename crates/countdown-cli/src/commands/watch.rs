use clap::Args;
use countdown_core::{Config, CountdownController, SystemClock};

use super::OverrideArgs;
use crate::tui;

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub over: OverrideArgs,
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut ctl = CountdownController::new(config.settings(), SystemClock);
    if let Some(date) = args.over.resolve(ctl.target())? {
        ctl.set_override_date(date);
    }
    tui::run_watch(ctl, &config)
}
