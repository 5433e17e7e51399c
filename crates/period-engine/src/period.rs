//! Time periods and their relation algebra.
//!
//! A [`Period`] is a pair of instants plus a shared calendar handle. It
//! answers containment, overlap and ordering questions against another
//! period, counts its own length in calendar units, and moves or resizes
//! itself through the calendar.
//!
//! Two policies differ:
//!
//! - Durations are direction-insensitive. A period whose start is after its
//!   end reports the same durations as its mirror image.
//! - [`Period::relation_to`] is not. Either period being malformed
//!   (`start >= end`) yields [`PeriodRelation::Indeterminate`].

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::calendar::{CalendarRef, CalendarUnit, Instant, PeriodSize};
use crate::error::Result;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

// ── Enumerations ────────────────────────────────────────────────────────────

/// How another period's boundaries interleave with a reference period's.
///
/// Read each variant as "the other period is ... relative to this one", e.g.
/// `Before` means the other period starts after this one ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodRelation {
    After,
    StartTouching,
    StartInside,
    InsideStartTouching,
    EnclosingStartTouching,
    Enclosing,
    EnclosingEndTouching,
    ExactMatch,
    Inside,
    InsideEndTouching,
    EndInside,
    EndTouching,
    Before,
    /// One of the periods is malformed (`start >= end`).
    Indeterminate,
}

/// Whether [`Period::contains_date`] counts the bounds themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalBoundary {
    /// Excludes `start` and `end`.
    Open,
    /// Includes `start` and `end`.
    Closed,
}

/// The point held fixed while lengthening or shortening a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPoint {
    Start,
    Center,
    End,
}

// ── Period ──────────────────────────────────────────────────────────────────

/// A span of time between two instants, evaluated on a shared calendar.
///
/// `Clone` is the period copy: the bounds are duplicated, the calendar handle
/// is shared. Equality compares the bounds only.
///
/// # Examples
///
/// ```
/// use period_engine::{CalendarUnit, GregorianCalendar, Period, PeriodRelation};
///
/// let calendar = GregorianCalendar::utc();
/// let start = calendar.date(2000, 1, 1).unwrap();
/// let january = Period::starting_at(CalendarUnit::Month, start, calendar.shared()).unwrap();
/// assert_eq!(january.end(), calendar.date(2000, 2, 1).unwrap());
///
/// let february =
///     Period::starting_at(CalendarUnit::Month, january.end(), calendar.shared()).unwrap();
/// assert_eq!(january.relation_to(&february), PeriodRelation::EndTouching);
/// assert!(january.intersects(&february));
/// assert!(!january.overlaps_with(&february));
/// ```
#[derive(Clone)]
pub struct Period {
    start: Instant,
    end: Instant,
    calendar: CalendarRef,
}

impl Period {
    pub fn new(start: Instant, end: Instant, calendar: CalendarRef) -> Self {
        Self {
            start,
            end,
            calendar,
        }
    }

    /// A period of `size` beginning at `start`.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure when the end is not representable.
    pub fn starting_at(
        size: impl Into<PeriodSize>,
        start: Instant,
        calendar: CalendarRef,
    ) -> Result<Self> {
        let end = calendar.add_size(start, size.into())?;
        Ok(Self::new(start, end, calendar))
    }

    /// A period of `size` finishing at `end`.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure when the start is not representable.
    pub fn ending_at(
        size: impl Into<PeriodSize>,
        end: Instant,
        calendar: CalendarRef,
    ) -> Result<Self> {
        let start = calendar.subtract_size(end, size.into())?;
        Ok(Self::new(start, end, calendar))
    }

    /// The largest representable period.
    pub fn all_time(calendar: CalendarRef) -> Self {
        Self::new(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC, calendar)
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn set_start(&mut self, start: Instant) {
        self.start = start;
    }

    pub fn set_end(&mut self, end: Instant) {
        self.end = end;
    }

    pub fn calendar(&self) -> &CalendarRef {
        &self.calendar
    }

    pub fn is_moment(&self) -> bool {
        self.start == self.end
    }

    /// `start < end`.
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    // ── Durations ───────────────────────────────────────────────────────

    fn ordered_bounds(&self) -> (Instant, Instant) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    /// Whole `unit`s between the bounds, whichever comes first.
    pub fn duration_in(&self, unit: CalendarUnit) -> i64 {
        let (earlier, later) = self.ordered_bounds();
        self.calendar.units_between(earlier, later, unit)
    }

    /// Raw elapsed time between the bounds, never negative.
    pub fn duration(&self) -> TimeDelta {
        let (earlier, later) = self.ordered_bounds();
        later - earlier
    }

    pub fn duration_in_years(&self) -> i64 {
        self.duration_in(CalendarUnit::Year)
    }

    pub fn duration_in_months(&self) -> i64 {
        self.duration_in(CalendarUnit::Month)
    }

    pub fn duration_in_weeks(&self) -> i64 {
        self.duration_in(CalendarUnit::Week)
    }

    pub fn duration_in_days(&self) -> i64 {
        self.duration_in(CalendarUnit::Day)
    }

    pub fn duration_in_hours(&self) -> f64 {
        self.duration_in_seconds() / 3600.0
    }

    pub fn duration_in_minutes(&self) -> f64 {
        self.duration_in_seconds() / 60.0
    }

    pub fn duration_in_seconds(&self) -> f64 {
        let elapsed = self.duration();
        elapsed.num_seconds() as f64 + f64::from(elapsed.subsec_nanos()) / NANOS_PER_SECOND
    }

    // ── Comparisons ─────────────────────────────────────────────────────

    pub fn is_equal_to(&self, other: &Period) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// This period lies within `other`, bounds included.
    pub fn is_inside(&self, other: &Period) -> bool {
        other.start <= self.start && self.end <= other.end
    }

    /// `other` lies within this period, bounds included.
    pub fn contains(&self, other: &Period) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The periods share time beyond a single touching instant.
    pub fn overlaps_with(&self, other: &Period) -> bool {
        (other.start < self.start && other.end > self.start)
            || (other.start >= self.start && other.end <= self.end)
            || (other.start < self.end && other.end > self.end)
    }

    /// The periods share any time, a touching instant included.
    pub fn intersects(&self, other: &Period) -> bool {
        (other.start < self.start && other.end >= self.start)
            || (other.start >= self.start && other.end <= self.end)
            || (other.start <= self.end && other.end > self.end)
    }

    /// Classify where `other` lies relative to this period.
    ///
    /// The checks run from the most specific case to the most general, so a
    /// shared boundary is classified as touching before any inequality row
    /// can claim it.
    pub fn relation_to(&self, other: &Period) -> PeriodRelation {
        if !self.is_well_formed() || !other.is_well_formed() {
            return PeriodRelation::Indeterminate;
        }

        let (s, o) = (self, other);
        if o.end < s.start {
            PeriodRelation::After
        } else if o.end == s.start {
            PeriodRelation::StartTouching
        } else if o.start < s.start && o.end < s.end {
            PeriodRelation::StartInside
        } else if o.start == s.start && o.end > s.end {
            PeriodRelation::InsideStartTouching
        } else if o.start == s.start && o.end < s.end {
            PeriodRelation::EnclosingStartTouching
        } else if o.start > s.start && o.end < s.end {
            PeriodRelation::Enclosing
        } else if o.start > s.start && o.end == s.end {
            PeriodRelation::EnclosingEndTouching
        } else if o.start == s.start && o.end == s.end {
            PeriodRelation::ExactMatch
        } else if o.start < s.start && o.end > s.end {
            PeriodRelation::Inside
        } else if o.start < s.start && o.end == s.end {
            PeriodRelation::InsideEndTouching
        } else if o.start < s.end && o.end > s.end {
            PeriodRelation::EndInside
        } else if o.start == s.end && o.end > s.end {
            PeriodRelation::EndTouching
        } else if o.start > s.end {
            PeriodRelation::Before
        } else {
            PeriodRelation::Indeterminate
        }
    }

    /// Time between the nearer bounds of two disjoint periods; zero when they
    /// intersect.
    pub fn gap_between(&self, other: &Period) -> TimeDelta {
        if self.end < other.start {
            other.start - self.end
        } else if other.end < self.start {
            self.start - other.end
        } else {
            TimeDelta::zero()
        }
    }

    pub fn contains_date(&self, instant: Instant, boundary: IntervalBoundary) -> bool {
        match boundary {
            IntervalBoundary::Open => self.start < instant && instant < self.end,
            IntervalBoundary::Closed => self.start <= instant && instant <= self.end,
        }
    }

    // ── Mutation ────────────────────────────────────────────────────────
    //
    // Each operation computes both new bounds before writing either, so a
    // calendar failure leaves the period untouched.

    /// Move both bounds later by `size`. A negative amount moves them earlier.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure; the period is unchanged on error.
    pub fn shift_later(&mut self, size: impl Into<PeriodSize>) -> Result<()> {
        let size = size.into();
        let start = self.calendar.add_size(self.start, size)?;
        let end = self.calendar.add_size(self.end, size)?;
        self.start = start;
        self.end = end;
        Ok(())
    }

    /// Move both bounds earlier by `size`. A negative amount moves them later.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure; the period is unchanged on error.
    pub fn shift_earlier(&mut self, size: impl Into<PeriodSize>) -> Result<()> {
        self.shift_later(size.into().negated()?)
    }

    /// Grow the period by `size` around `anchor`.
    ///
    /// A `Center` anchor moves each bound by half of `size`, truncated toward
    /// zero.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure; the period is unchanged on error.
    pub fn lengthen(&mut self, anchor: AnchorPoint, size: impl Into<PeriodSize>) -> Result<()> {
        let size = size.into();
        let (start, end) = match anchor {
            AnchorPoint::Start => (self.start, self.calendar.add_size(self.end, size)?),
            AnchorPoint::Center => {
                let half = size.half();
                (
                    self.calendar.subtract_size(self.start, half)?,
                    self.calendar.add_size(self.end, half)?,
                )
            }
            AnchorPoint::End => (self.calendar.subtract_size(self.start, size)?, self.end),
        };
        self.start = start;
        self.end = end;
        Ok(())
    }

    /// Shrink the period by `size` around `anchor`.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure; the period is unchanged on error.
    pub fn shorten(&mut self, anchor: AnchorPoint, size: impl Into<PeriodSize>) -> Result<()> {
        self.lengthen(anchor, size.into().negated()?)
    }
}

impl PartialEq for Period {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_to(other)
    }
}

impl Eq for Period {}

impl fmt::Debug for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Period")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Period", 2)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.end()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
