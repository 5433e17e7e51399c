//! Independent, re-orderable groups of periods.
//!
//! A [`PeriodCollection`] stores members in insertion order and never
//! touches their bounds on insert or remove. Its aggregate start and end are
//! the earliest member start and the latest member end.
//!
//! # Examples
//!
//! ```
//! use period_engine::{CalendarUnit, GregorianCalendar, Period, PeriodCollection, PeriodGroup};
//!
//! let calendar = GregorianCalendar::utc();
//! let jan1 = calendar.date(2010, 1, 1).unwrap();
//!
//! let mut collection = PeriodCollection::new(calendar.shared());
//! collection.add(Period::starting_at(CalendarUnit::Month.times(2), jan1, calendar.shared()).unwrap());
//! collection.add(Period::starting_at(CalendarUnit::Month, jan1, calendar.shared()).unwrap());
//! collection.sort_by_duration_ascending();
//!
//! assert_eq!(collection[0].end(), calendar.date(2010, 2, 1).unwrap());
//! assert_eq!(collection.end(), Some(calendar.date(2010, 3, 1).unwrap()));
//! assert_eq!(collection.duration_in_months(), 2);
//! ```

use std::ops::{Index, IndexMut};

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::calendar::{CalendarRef, Instant, PeriodSize};
use crate::error::Result;
use crate::group::{shift_members, PeriodGroup};
use crate::period::{IntervalBoundary, Period};

/// Periods with no contiguity constraint.
///
/// `Clone` copies the member list. `==` holds when the unordered comparison
/// of [`PeriodCollection::is_equal_to`] succeeds in both directions.
#[derive(Debug, Clone)]
pub struct PeriodCollection {
    periods: Vec<Period>,
    calendar: CalendarRef,
}

impl PeriodCollection {
    pub fn new(calendar: CalendarRef) -> Self {
        Self {
            periods: Vec::new(),
            calendar,
        }
    }

    pub fn from_periods(calendar: CalendarRef, periods: impl IntoIterator<Item = Period>) -> Self {
        Self {
            periods: periods.into_iter().collect(),
            calendar,
        }
    }

    pub fn add(&mut self, period: Period) {
        debug!(start = %period.start(), end = %period.end(), "collection member added");
        self.periods.push(period);
    }

    /// Insert `period` before position `index`. An index past the end is a
    /// no-op.
    pub fn insert(&mut self, period: Period, index: usize) {
        if index > self.periods.len() {
            debug!(index, len = self.periods.len(), "collection insert out of range, ignored");
            return;
        }
        debug!(index, "collection member inserted");
        self.periods.insert(index, period);
    }

    /// Remove and return the member at `index`, `None` if out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<Period> {
        if index >= self.periods.len() {
            debug!(index, len = self.periods.len(), "collection remove out of range, ignored");
            return None;
        }
        debug!(index, "collection member removed");
        Some(self.periods.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Period> {
        self.periods.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Period> {
        self.periods.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Period> {
        self.periods.iter()
    }

    // ── Sorting ─────────────────────────────────────────────────────────
    //
    // All sorts are stable: members comparing equal keep their relative
    // order.

    pub fn sort_by_start_ascending(&mut self) {
        self.periods.sort_by_key(Period::start);
    }

    pub fn sort_by_start_descending(&mut self) {
        self.periods.sort_by(|a, b| b.start().cmp(&a.start()));
    }

    pub fn sort_by_end_ascending(&mut self) {
        self.periods.sort_by_key(Period::end);
    }

    pub fn sort_by_end_descending(&mut self) {
        self.periods.sort_by(|a, b| b.end().cmp(&a.end()));
    }

    /// Order by raw elapsed time, shortest first.
    pub fn sort_by_duration_ascending(&mut self) {
        self.periods.sort_by_key(Period::duration);
    }

    pub fn sort_by_duration_descending(&mut self) {
        self.periods.sort_by(|a, b| b.duration().cmp(&a.duration()));
    }

    // ── Filtering ───────────────────────────────────────────────────────

    /// Members lying within `period`.
    pub fn periods_inside(&self, period: &Period) -> PeriodCollection {
        self.filtered(|member| member.is_inside(period))
    }

    /// Members sharing any time with `period`, touching included.
    pub fn periods_intersected_by_period(&self, period: &Period) -> PeriodCollection {
        self.filtered(|member| member.intersects(period))
    }

    /// Members sharing more than a touching instant with `period`.
    pub fn periods_overlapped_by_period(&self, period: &Period) -> PeriodCollection {
        self.filtered(|member| member.overlaps_with(period))
    }

    /// Members containing `instant`, bounds included.
    pub fn periods_intersected_by_date(&self, instant: Instant) -> PeriodCollection {
        self.filtered(|member| member.contains_date(instant, IntervalBoundary::Closed))
    }

    fn filtered(&self, keep: impl Fn(&Period) -> bool) -> PeriodCollection {
        Self::from_periods(
            self.calendar.clone(),
            self.periods.iter().filter(|member| keep(member)).cloned(),
        )
    }

    // ── Equality ────────────────────────────────────────────────────────

    /// Compare against `other` after the aggregate pre-check.
    ///
    /// With `consider_order`, members must match position by position.
    /// Without it, every member of `self` needs an equal counterpart
    /// somewhere in `other`.
    pub fn is_equal_to(&self, other: &PeriodCollection, consider_order: bool) -> bool {
        if !self.has_same_characteristics_as(other) {
            return false;
        }
        if consider_order {
            self.periods.iter().zip(&other.periods).all(|(a, b)| a == b)
        } else {
            self.periods
                .iter()
                .all(|period| other.periods.contains(period))
        }
    }
}

impl PeriodGroup for PeriodCollection {
    fn periods(&self) -> &[Period] {
        &self.periods
    }

    fn calendar(&self) -> &CalendarRef {
        &self.calendar
    }

    fn start(&self) -> Option<Instant> {
        self.periods.iter().map(Period::start).min()
    }

    fn end(&self) -> Option<Instant> {
        self.periods.iter().map(Period::end).max()
    }

    fn shift_later(&mut self, size: PeriodSize) -> Result<()> {
        shift_members(&mut self.periods, size)
    }

    fn shift_earlier(&mut self, size: PeriodSize) -> Result<()> {
        shift_members(&mut self.periods, size.negated()?)
    }
}

impl Index<usize> for PeriodCollection {
    type Output = Period;

    fn index(&self, index: usize) -> &Period {
        &self.periods[index]
    }
}

impl IndexMut<usize> for PeriodCollection {
    fn index_mut(&mut self, index: usize) -> &mut Period {
        &mut self.periods[index]
    }
}

impl<'a> IntoIterator for &'a PeriodCollection {
    type Item = &'a Period;
    type IntoIter = std::slice::Iter<'a, Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}

impl PartialEq for PeriodCollection {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_to(other, false) && other.is_equal_to(self, false)
    }
}

impl Serialize for PeriodCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.periods)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarUnit, GregorianCalendar};

    fn at(year: i32, month: u32, day: u32) -> Instant {
        GregorianCalendar::utc().date(year, month, day).unwrap()
    }

    fn calendar() -> CalendarRef {
        GregorianCalendar::utc().shared()
    }

    fn starting(size: PeriodSize, start: Instant) -> Period {
        Period::starting_at(size, start, calendar()).unwrap()
    }

    fn ending(size: PeriodSize, end: Instant) -> Period {
        Period::ending_at(size, end, calendar()).unwrap()
    }

    /// month, two months, month after month, two months after two weeks.
    fn members() -> [Period; 4] {
        let start = at(2010, 1, 1);
        let month = starting(CalendarUnit::Month.into(), start);
        let two_months = starting(CalendarUnit::Month.times(2), start);
        let month_after_month = starting(CalendarUnit::Month.into(), month.end());
        let two_months_after_two_weeks = starting(
            CalendarUnit::Month.times(2),
            starting(CalendarUnit::Week.times(2), start).end(),
        );
        [month, two_months, month_after_month, two_months_after_two_weeks]
    }

    fn sample() -> PeriodCollection {
        PeriodCollection::from_periods(calendar(), members())
    }

    fn assert_order(collection: &PeriodCollection, expected: &[usize]) {
        let all = members();
        let expected: Vec<&Period> = expected.iter().map(|&i| &all[i]).collect();
        let actual: Vec<&Period> = collection.iter().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_fixture_bounds() {
        let [m, t, ma, tw] = members();
        assert_eq!((m.start(), m.end()), (at(2010, 1, 1), at(2010, 2, 1)));
        assert_eq!((t.start(), t.end()), (at(2010, 1, 1), at(2010, 3, 1)));
        assert_eq!((ma.start(), ma.end()), (at(2010, 2, 1), at(2010, 3, 1)));
        assert_eq!((tw.start(), tw.end()), (at(2010, 1, 15), at(2010, 3, 15)));
    }

    // ── membership ──────────────────────────────────────────────────────

    #[test]
    fn test_add_keeps_bounds() {
        let mut collection = PeriodCollection::new(calendar());
        let [m, t, ..] = members();
        collection.add(m.clone());
        collection.add(t.clone());
        assert_eq!(collection.len(), 2);
        assert_eq!(collection[0], m);
        assert_eq!(collection[1], t);
        assert_eq!(collection.start(), Some(at(2010, 1, 1)));
        assert_eq!(collection.end(), Some(at(2010, 3, 1)));
    }

    #[test]
    fn test_insert_in_range() {
        let mut collection = sample();
        let inserted = starting(CalendarUnit::Day.into(), at(2011, 1, 1));
        collection.insert(inserted.clone(), 1);
        assert_eq!(collection.len(), 5);
        assert_eq!(collection[1], inserted);
        assert_eq!(collection.end(), Some(at(2011, 1, 2)));

        collection.insert(inserted.clone(), 5);
        assert_eq!(collection.len(), 6);
        assert_eq!(collection[5], inserted);
    }

    #[test]
    fn test_insert_out_of_range_is_noop() {
        let mut collection = sample();
        collection.insert(starting(CalendarUnit::Day.into(), at(2011, 1, 1)), 10);
        assert_eq!(collection.len(), 4);
        assert_eq!(collection.end(), Some(at(2010, 3, 15)));
    }

    #[test]
    fn test_remove_at() {
        let mut collection = sample();
        let removed = collection.remove_at(3).unwrap();
        assert_eq!(removed, members()[3]);
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.end(), Some(at(2010, 3, 1)));
        assert!(collection.remove_at(10).is_none());
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_empty_collection_aggregates() {
        let empty = PeriodCollection::new(calendar());
        assert!(empty.is_empty());
        assert_eq!(empty.start(), None);
        assert_eq!(empty.end(), None);
        assert_eq!(empty.duration_in_days(), 0);
        assert_eq!(empty.duration_in_seconds(), 0);
    }

    #[test]
    fn test_aggregate_durations() {
        let collection = sample();
        assert_eq!(collection.start(), Some(at(2010, 1, 1)));
        assert_eq!(collection.end(), Some(at(2010, 3, 15)));
        assert_eq!(collection.duration_in_years(), 0);
        assert_eq!(collection.duration_in_months(), 2);
        assert_eq!(collection.duration_in_weeks(), 10);
        assert_eq!(collection.duration_in_days(), 73);
        assert_eq!(collection.duration_in_hours(), 73 * 24);
        assert_eq!(collection.duration_in_minutes(), 73 * 24 * 60);
        assert_eq!(collection.duration_in_seconds(), 73 * 24 * 60 * 60);
    }

    #[test]
    fn test_index_mut_replaces_member() {
        let mut collection = sample();
        collection[2] = starting(CalendarUnit::Year.into(), at(2010, 1, 1));
        assert_eq!(collection.end(), Some(at(2011, 1, 1)));
        collection
            .get_mut(0)
            .unwrap()
            .shift_later(CalendarUnit::Day)
            .unwrap();
        assert_eq!(collection[0].start(), at(2010, 1, 2));
        assert!(collection.get(4).is_none());
    }

    // ── sorting ─────────────────────────────────────────────────────────

    #[test]
    fn test_sort_by_start() {
        let mut collection = sample();
        collection.sort_by_start_ascending();
        assert_order(&collection, &[0, 1, 3, 2]);
        collection.sort_by_start_descending();
        assert_order(&collection, &[2, 3, 0, 1]);
    }

    #[test]
    fn test_sort_by_end() {
        let mut collection = sample();
        collection.sort_by_end_ascending();
        assert_order(&collection, &[0, 1, 2, 3]);
        let mut collection = sample();
        collection.sort_by_end_descending();
        assert_order(&collection, &[3, 1, 2, 0]);
    }

    #[test]
    fn test_sort_by_duration() {
        let mut collection = sample();
        collection.sort_by_duration_ascending();
        assert_order(&collection, &[2, 0, 1, 3]);
        let mut collection = sample();
        collection.sort_by_duration_descending();
        assert_order(&collection, &[1, 3, 0, 2]);
    }

    // ── filtering ───────────────────────────────────────────────────────

    #[test]
    fn test_periods_inside() {
        let collection = sample();
        let five_weeks = starting(CalendarUnit::Week.times(5), at(2010, 1, 1));
        assert_order(&collection.periods_inside(&five_weeks), &[0]);

        let last_two_months = ending(CalendarUnit::Month.times(2), at(2010, 3, 15));
        assert_order(&collection.periods_inside(&last_two_months), &[2, 3]);
    }

    #[test]
    fn test_periods_intersected_by_date() {
        let collection = sample();
        assert_order(&collection.periods_intersected_by_date(at(2010, 1, 20)), &[0, 1, 3]);
        assert_order(&collection.periods_intersected_by_date(at(2010, 3, 2)), &[3]);
        assert_order(&collection.periods_intersected_by_date(at(2010, 3, 15)), &[3]);
        assert!(collection
            .periods_intersected_by_date(at(2011, 1, 1))
            .is_empty());
    }

    #[test]
    fn test_periods_intersected_by_period() {
        let collection = sample();
        let around_start = starting(CalendarUnit::Week.times(5), at(2009, 12, 27));
        assert_order(&collection.periods_intersected_by_period(&around_start), &[0, 1, 3]);

        let march_week = starting(CalendarUnit::Week.into(), at(2010, 3, 1));
        assert_order(&collection.periods_intersected_by_period(&march_week), &[1, 2, 3]);
    }

    #[test]
    fn test_periods_overlapped_by_period() {
        let collection = sample();
        let around_start = starting(CalendarUnit::Month.times(2), at(2009, 12, 1));
        assert_order(&collection.periods_overlapped_by_period(&around_start), &[0, 1, 3]);

        let march_week = starting(CalendarUnit::Week.into(), at(2010, 3, 1));
        assert_order(&collection.periods_overlapped_by_period(&march_week), &[3]);
    }

    #[test]
    fn test_filter_result_shares_calendar() {
        let collection = sample();
        let filtered = collection.periods_intersected_by_date(at(2010, 1, 20));
        assert!(std::sync::Arc::ptr_eq(filtered.calendar(), collection.calendar()));
    }

    // ── bulk shifts ─────────────────────────────────────────────────────

    #[test]
    fn test_shift_later() {
        let mut collection = sample();
        collection
            .shift_later(CalendarUnit::Week.into())
            .unwrap();
        assert_eq!(collection[0].start(), at(2010, 1, 8));
        assert_eq!(collection[0].end(), at(2010, 2, 8));
        assert_eq!(collection[3].start(), at(2010, 1, 22));
        assert_eq!(collection[3].end(), at(2010, 3, 22));
    }

    #[test]
    fn test_shift_earlier() {
        let mut collection = sample();
        collection
            .shift_earlier(CalendarUnit::Month.times(2))
            .unwrap();
        assert_eq!(collection[0].start(), at(2009, 11, 1));
        assert_eq!(collection[0].end(), at(2009, 12, 1));
        assert_eq!(collection[3].start(), at(2009, 11, 15));
        assert_eq!(collection[3].end(), at(2010, 1, 15));
    }

    // ── equality ────────────────────────────────────────────────────────

    #[test]
    fn test_is_equal_to_considering_order() {
        let collection = sample();
        let mut copy = collection.clone();
        assert!(collection.is_equal_to(&copy, true));

        let first = copy[0].clone();
        copy[0] = copy[1].clone();
        copy[1] = first;
        assert!(!collection.is_equal_to(&copy, true));
        assert!(collection.is_equal_to(&copy, false));
        assert_eq!(collection, copy);
    }

    #[test]
    fn test_is_equal_to_rejects_different_characteristics() {
        let collection = sample();
        let mut copy = collection.clone();
        copy[1] = starting(CalendarUnit::Month.times(4), at(2010, 1, 1));
        assert!(!collection.has_same_characteristics_as(&copy));
        assert!(!collection.is_equal_to(&copy, false));
    }

    #[test]
    fn test_is_equal_to_rejects_missing_member() {
        let collection = sample();
        let mut copy = collection.clone();
        copy[0] = starting(CalendarUnit::Week.times(2), at(2010, 1, 1));
        assert!(collection.has_same_characteristics_as(&copy));
        assert!(!collection.is_equal_to(&copy, false));
        assert_ne!(collection, copy);
    }

    #[test]
    fn test_eq_is_symmetric_with_repeated_members() {
        let [m, t, _, tw] = members();
        let twin = m.clone();
        let repeated = PeriodCollection::from_periods(calendar(), [m.clone(), tw.clone(), twin]);
        let distinct = PeriodCollection::from_periods(calendar(), [m, t, tw]);

        assert!(repeated.has_same_characteristics_as(&distinct));
        assert!(repeated.is_equal_to(&distinct, false));
        assert!(!distinct.is_equal_to(&repeated, false));
        assert_ne!(repeated, distinct);
        assert_ne!(distinct, repeated);
    }

    #[test]
    fn test_serializes_as_sequence() {
        let value = serde_json::to_value(sample()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[3]["start"], "2010-01-15T00:00:00Z");
    }
}
