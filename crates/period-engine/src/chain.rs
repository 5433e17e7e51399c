//! Contiguous chains of periods.
//!
//! A [`PeriodChain`] keeps its members laid end to end:
//! `chain[i].end() == chain[i + 1].start()` for every adjacent pair. Adding,
//! inserting or removing a member re-derives bounds so the invariant holds,
//! while each member keeps its length in whole seconds.
//!
//! Members are rebuilt on the chain's calendar using `Second` arithmetic, so
//! a member added to a chain keeps its elapsed length but not its original
//! bounds. The one exception is the first member of an empty chain, which is
//! stored as given.
//!
//! # Examples
//!
//! ```
//! use period_engine::{CalendarUnit, GregorianCalendar, Period, PeriodChain, PeriodGroup};
//!
//! let calendar = GregorianCalendar::utc();
//! let jan1 = calendar.date(2010, 1, 1).unwrap();
//! let week = Period::starting_at(CalendarUnit::Week, jan1, calendar.shared()).unwrap();
//!
//! let mut chain = PeriodChain::new(calendar.shared());
//! chain.add(week.clone()).unwrap();
//! chain.add(week.clone()).unwrap();
//! assert_eq!(chain[1].start(), calendar.date(2010, 1, 8).unwrap());
//! assert_eq!(chain.end(), Some(calendar.date(2010, 1, 15).unwrap()));
//!
//! chain.insert(week, 0).unwrap();
//! assert_eq!(chain.start(), Some(calendar.date(2009, 12, 25).unwrap()));
//! ```

use std::ops::Index;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::calendar::{CalendarRef, CalendarUnit, Instant, PeriodSize};
use crate::error::Result;
use crate::group::{shift_members, PeriodGroup};
use crate::period::Period;

/// Periods kept contiguous end to start.
///
/// Members are readable by index but never handed out mutably, so the
/// contiguity invariant cannot be broken from outside.
#[derive(Debug, Clone)]
pub struct PeriodChain {
    periods: Vec<Period>,
    calendar: CalendarRef,
}

/// The length a member keeps when re-linked into a chain.
fn link_size(period: &Period) -> PeriodSize {
    CalendarUnit::Second.times(period.duration_in(CalendarUnit::Second))
}

impl PeriodChain {
    pub fn new(calendar: CalendarRef) -> Self {
        Self {
            periods: Vec::new(),
            calendar,
        }
    }

    /// Build a chain by adding each period in turn.
    ///
    /// # Errors
    ///
    /// Propagates the first calendar failure while re-linking.
    pub fn from_periods(
        calendar: CalendarRef,
        periods: impl IntoIterator<Item = Period>,
    ) -> Result<Self> {
        let mut chain = Self::new(calendar);
        for period in periods {
            chain.add(period)?;
        }
        Ok(chain)
    }

    /// Append a member of `period`'s length starting at the chain's end.
    ///
    /// On an empty chain `period` is stored unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure; the chain is unchanged on error.
    pub fn add(&mut self, period: Period) -> Result<()> {
        let member = match self.periods.last() {
            Some(last) => {
                Period::starting_at(link_size(&period), last.end(), self.calendar.clone())?
            }
            None => period,
        };
        debug!(start = %member.start(), end = %member.end(), "chain member added");
        self.periods.push(member);
        Ok(())
    }

    /// Insert a member of `period`'s length at `index`.
    ///
    /// - At `0` on a non-empty chain the member ends where the chain started.
    /// - Anywhere else it starts at the previous member's end, and every
    ///   member from `index` on moves later by its length.
    /// - An index past the end is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure; the chain is unchanged on error.
    pub fn insert(&mut self, period: Period, index: usize) -> Result<()> {
        if index > self.periods.len() {
            debug!(index, len = self.periods.len(), "chain insert out of range, ignored");
            return Ok(());
        }
        if self.periods.is_empty() {
            return self.add(period);
        }

        let size = link_size(&period);
        if index == 0 {
            let member = Period::ending_at(size, self.periods[0].start(), self.calendar.clone())?;
            self.periods.insert(0, member);
        } else {
            let member =
                Period::starting_at(size, self.periods[index - 1].end(), self.calendar.clone())?;
            shift_members(&mut self.periods[index..], size)?;
            self.periods.insert(index, member);
        }
        debug!(index, %size, "chain member inserted");
        Ok(())
    }

    /// Remove the member at `index`; every later member moves earlier by its
    /// length. Returns `None` for an out-of-range index.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure; the chain is unchanged on error.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<Period>> {
        if index >= self.periods.len() {
            debug!(index, len = self.periods.len(), "chain remove out of range, ignored");
            return Ok(None);
        }
        let size = link_size(&self.periods[index]).negated()?;
        shift_members(&mut self.periods[index + 1..], size)?;
        debug!(index, %size, "chain member removed");
        Ok(Some(self.periods.remove(index)))
    }

    /// Remove the last member. No other member moves.
    pub fn remove_latest(&mut self) -> Option<Period> {
        let removed = self.periods.pop();
        if removed.is_some() {
            debug!(len = self.periods.len(), "chain latest member removed");
        }
        removed
    }

    /// Remove the first member and move every remaining member earlier by
    /// its length.
    ///
    /// The removed member is returned with its bounds as they were in the
    /// chain.
    ///
    /// # Errors
    ///
    /// Propagates the calendar's failure; the chain is unchanged on error.
    pub fn remove_earliest(&mut self) -> Result<Option<Period>> {
        let Some(first) = self.periods.first() else {
            return Ok(None);
        };
        let size = link_size(first).negated()?;
        shift_members(&mut self.periods[1..], size)?;
        debug!(%size, "chain earliest member removed");
        Ok(Some(self.periods.remove(0)))
    }

    pub fn first(&self) -> Option<&Period> {
        self.periods.first()
    }

    pub fn last(&self) -> Option<&Period> {
        self.periods.last()
    }

    pub fn get(&self, index: usize) -> Option<&Period> {
        self.periods.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Period> {
        self.periods.iter()
    }

    /// Every adjacent pair touches.
    pub fn is_contiguous(&self) -> bool {
        self.periods
            .windows(2)
            .all(|pair| pair[0].end() == pair[1].start())
    }

    /// Same aggregate characteristics and equal members position by position.
    pub fn is_equal_to(&self, other: &PeriodChain) -> bool {
        self.has_same_characteristics_as(other)
            && self.periods.iter().zip(&other.periods).all(|(a, b)| a == b)
    }
}

impl PeriodGroup for PeriodChain {
    fn periods(&self) -> &[Period] {
        &self.periods
    }

    fn calendar(&self) -> &CalendarRef {
        &self.calendar
    }

    fn start(&self) -> Option<Instant> {
        self.periods.first().map(Period::start)
    }

    fn end(&self) -> Option<Instant> {
        self.periods.last().map(Period::end)
    }

    fn shift_later(&mut self, size: PeriodSize) -> Result<()> {
        shift_members(&mut self.periods, size)
    }

    fn shift_earlier(&mut self, size: PeriodSize) -> Result<()> {
        shift_members(&mut self.periods, size.negated()?)
    }
}

impl Index<usize> for PeriodChain {
    type Output = Period;

    fn index(&self, index: usize) -> &Period {
        &self.periods[index]
    }
}

impl<'a> IntoIterator for &'a PeriodChain {
    type Item = &'a Period;
    type IntoIter = std::slice::Iter<'a, Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}

impl PartialEq for PeriodChain {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_to(other)
    }
}

impl Serialize for PeriodChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.periods)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
