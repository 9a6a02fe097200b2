//! # Process-wide default scheduler.
//!
//! Hosts usually run one scheduler per game session plus a single
//! process-wide default. The default is an explicitly constructed instance
//! handed over exactly once — not hidden mutable global state — so tests can
//! always build isolated instances and nothing in this crate consults the
//! default implicitly.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tickvisor::{Config, TickedScheduler, default_scheduler, init_default};
//!
//! let scheduler = Arc::new(TickedScheduler::new(Config::default()));
//! if init_default(scheduler).is_ok() {
//!     let shared = default_scheduler().expect("just initialized");
//!     assert_eq!(shared.current_tick(), 0);
//! }
//! ```

use std::sync::{Arc, OnceLock};

use crate::core::ticked::TickedScheduler;
use crate::error::ScheduleError;

static DEFAULT_SCHEDULER: OnceLock<Arc<TickedScheduler>> = OnceLock::new();

/// Installs the process-wide default scheduler.
///
/// One-shot: a second call fails with [`ScheduleError::DefaultAlreadySet`]
/// and leaves the original in place.
pub fn init_default(scheduler: Arc<TickedScheduler>) -> Result<(), ScheduleError> {
    DEFAULT_SCHEDULER
        .set(scheduler)
        .map_err(|_| ScheduleError::DefaultAlreadySet)
}

/// Returns the process-wide default scheduler, if one was installed.
pub fn default_scheduler() -> Option<Arc<TickedScheduler>> {
    DEFAULT_SCHEDULER.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;

    // The only test in the crate touching the process-wide static.
    #[test]
    fn test_second_install_fails_and_keeps_the_first() {
        let first = Arc::new(TickedScheduler::new(Config::default()));
        init_default(first.clone()).expect("first install");

        let err = init_default(Arc::new(TickedScheduler::new(Config::default()))).unwrap_err();
        assert!(matches!(err, ScheduleError::DefaultAlreadySet));

        let installed = default_scheduler().expect("still installed");
        assert!(Arc::ptr_eq(&first, &installed));
    }
}
