//! # Scheduler configuration.
//!
//! Provides [`Config`] centralized settings for a [`TickedScheduler`](crate::TickedScheduler).
//!
//! Config is consumed at construction time, either directly
//! (`TickedScheduler::new(config)`) or through the builder
//! (`TickedScheduler::builder(config)`).
//!
//! ## Sentinel values
//! - `bus_capacity` is clamped to a minimum of 1 by the bus.
//! - `start_tick` is normally 0; a host that persists its own tick counter can
//!   resume from it, though snapshots only ever store *relative* delays so
//!   this is cosmetic.

/// Configuration for a ticked scheduler.
///
/// ## Field semantics
/// - `start_tick`: initial value of the tick counter
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `trap_panics`: catch panics from task bodies so one bad task cannot
///   stall the rest of its tick batch
#[derive(Clone, Debug)]
pub struct Config {
    /// Initial value of the internal tick counter.
    ///
    /// The counter only ever moves forward; a bucket for a tick below the
    /// counter can never reappear.
    pub start_tick: u64,

    /// Ring buffer size of the event bus.
    ///
    /// A receiver that falls more than this many events behind observes
    /// `Lagged` and skips the oldest items. Minimum value is 1 (enforced by
    /// Bus).
    pub bus_capacity: usize,

    /// Whether to trap panics from task bodies at tick time.
    ///
    /// - `true`: a panic is published as `EventKind::TaskPanicked` and the
    ///   rest of the batch still runs
    /// - `false`: a panic unwinds through `tick()` (useful in tests that
    ///   want panics loud)
    pub trap_panics: bool,
}

impl Config {
    /// Returns `bus_capacity` raised to at least 1, the smallest channel the
    /// bus can construct.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Defaults:
    ///
    /// - `start_tick = 0`
    /// - `bus_capacity = 1024`
    /// - `trap_panics = true` (one bad task never stalls the tick pipeline)
    fn default() -> Self {
        Self {
            start_tick: 0,
            bus_capacity: 1024,
            trap_panics: true,
        }
    }
}
