//! The sampling loop. Once a second the [tracker::UsageTracker] asks the foreground sampler which
//! application is focused and attributes that second to it in the shared log.

pub mod months;
pub mod tracker;
