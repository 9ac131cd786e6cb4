mod calculator;
mod progress;

pub use calculator::{
    compute, compute_between, compute_in, remaining_ms, resolve_local, CountdownCalculator,
    CountdownSnapshot, DayCounting, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND,
};
pub use progress::JourneyProgress;
