//! # period-engine
//!
//! Calendar-aware time period arithmetic.
//!
//! A period is a span between two instants. The engine classifies how two
//! periods relate (overlap, containment, adjacency, ordering), moves and
//! resizes periods by calendar units such as months and years, and groups
//! periods into independent collections or contiguous chains with aggregate
//! queries.
//!
//! ## Modules
//!
//! - [`calendar`]: calendar units and sizes, the `Calendar` service trait, and the chrono-backed `GregorianCalendar`
//! - [`period`]: `Period` and its relation algebra
//! - [`group`]: aggregate behavior shared by collections and chains
//! - [`collection`]: independent, sortable, filterable period collections
//! - [`chain`]: contiguous end-to-start period chains
//! - [`error`]: error types
//!
//! Container mutations and ignored out-of-range operations emit `tracing`
//! debug events. The crate never installs a subscriber.

pub mod calendar;
pub mod chain;
pub mod collection;
pub mod error;
pub mod group;
pub mod period;

pub use calendar::{
    is_leap_year, Calendar, CalendarOptions, CalendarRef, CalendarUnit, GregorianCalendar,
    Instant, PeriodSize,
};
pub use chain::PeriodChain;
pub use collection::PeriodCollection;
pub use error::{PeriodError, Result};
pub use group::PeriodGroup;
pub use period::{AnchorPoint, IntervalBoundary, Period, PeriodRelation};
