//! Behavior shared by every ordered group of periods.
//!
//! [`PeriodCollection`](crate::PeriodCollection) and
//! [`PeriodChain`](crate::PeriodChain) both implement [`PeriodGroup`]. The
//! trait supplies aggregate durations and the structural pre-check used by
//! both equality operations; the containers supply storage, aggregate
//! bounds, and bulk shifts.

use crate::calendar::{CalendarRef, CalendarUnit, Instant, PeriodSize};
use crate::error::Result;
use crate::period::Period;

/// An ordered sequence of periods evaluated on one calendar.
pub trait PeriodGroup {
    /// Members in their current order.
    fn periods(&self) -> &[Period];

    fn calendar(&self) -> &CalendarRef;

    /// Aggregate start, `None` when empty.
    fn start(&self) -> Option<Instant>;

    /// Aggregate end, `None` when empty.
    fn end(&self) -> Option<Instant>;

    /// Move every member later by `size`.
    ///
    /// # Errors
    ///
    /// Propagates the first calendar failure; the group is unchanged on error.
    fn shift_later(&mut self, size: PeriodSize) -> Result<()>;

    /// Move every member earlier by `size`.
    ///
    /// # Errors
    ///
    /// Propagates the first calendar failure; the group is unchanged on error.
    fn shift_earlier(&mut self, size: PeriodSize) -> Result<()>;

    fn len(&self) -> usize {
        self.periods().len()
    }

    fn is_empty(&self) -> bool {
        self.periods().is_empty()
    }

    /// Whole `unit`s between the aggregate bounds; zero when empty.
    fn duration_in(&self, unit: CalendarUnit) -> i64 {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) if start <= end => {
                self.calendar().units_between(start, end, unit)
            }
            (Some(start), Some(end)) => self.calendar().units_between(end, start, unit),
            _ => 0,
        }
    }

    fn duration_in_years(&self) -> i64 {
        self.duration_in(CalendarUnit::Year)
    }

    fn duration_in_months(&self) -> i64 {
        self.duration_in(CalendarUnit::Month)
    }

    fn duration_in_weeks(&self) -> i64 {
        self.duration_in(CalendarUnit::Week)
    }

    fn duration_in_days(&self) -> i64 {
        self.duration_in(CalendarUnit::Day)
    }

    fn duration_in_hours(&self) -> i64 {
        self.duration_in(CalendarUnit::Hour)
    }

    fn duration_in_minutes(&self) -> i64 {
        self.duration_in(CalendarUnit::Minute)
    }

    fn duration_in_seconds(&self) -> i64 {
        self.duration_in(CalendarUnit::Second)
    }

    /// Same member count and, unless both are empty, the same aggregate
    /// bounds.
    fn has_same_characteristics_as(&self, other: &dyn PeriodGroup) -> bool {
        if self.len() != other.len() {
            return false;
        }
        if self.is_empty() {
            return true;
        }
        self.start() == other.start() && self.end() == other.end()
    }
}

/// Shift every member by `size`, committing only if all shifts succeed.
pub(crate) fn shift_members(periods: &mut [Period], size: PeriodSize) -> Result<()> {
    let shifted = periods
        .iter()
        .map(|period| {
            let mut moved = period.clone();
            moved.shift_later(size)?;
            Ok(moved)
        })
        .collect::<Result<Vec<_>>>()?;
    for (slot, moved) in periods.iter_mut().zip(shifted) {
        *slot = moved;
    }
    Ok(())
}
