//! Scheduler core: tick buckets, contract, configuration and wiring.
//!
//! Modules:
//! - [`schedule`]: the public scheduling contract ([`Schedule`])
//! - [`ticked`]: the tick-bucket scheduler ([`TickedScheduler`])
//! - [`config`]: construction-time settings ([`Config`])
//! - [`builder`]: subscriber wiring ([`SchedulerBuilder`])
//! - [`global`]: the explicitly installed process-wide default

mod builder;
mod config;
mod global;
mod schedule;
mod ticked;

pub use builder::SchedulerBuilder;
pub use config::Config;
pub use global::{default_scheduler, init_default};
pub use schedule::Schedule;
pub use ticked::TickedScheduler;
