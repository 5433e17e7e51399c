//! Calendar arithmetic consumed by periods and period groups.
//!
//! A [`Calendar`] is the narrow service every [`Period`](crate::Period) talks
//! to when it needs to move a bound or count whole units between its bounds.
//! Periods hold it behind a shared [`CalendarRef`] and never mutate it, so a
//! test can swap in a fixed-rule fake without touching the period code.
//!
//! [`GregorianCalendar`] is the implementation shipped with the crate. It
//! delegates all component math to `chrono`:
//!
//! - Second, minute and hour arithmetic is absolute elapsed time.
//! - Day, week, month and year arithmetic runs on the local wall clock of the
//!   configured IANA timezone (UTC by default), so "+1 day" keeps the
//!   wall-clock time across a DST transition and "+1 month" clamps to the
//!   last day of a shorter month.

use std::fmt;
use std::sync::Arc;

use chrono::{
    DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{PeriodError, Result};

/// A point in time. Periods and calendars work on UTC instants; wall-clock
/// interpretation is the calendar's concern.
pub type Instant = DateTime<Utc>;

/// Shared, read-only handle to a calendar.
pub type CalendarRef = Arc<dyn Calendar>;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const DAYS_PER_WEEK: i64 = 7;
const MONTHS_PER_YEAR: i64 = 12;

// ── Units and sizes ─────────────────────────────────────────────────────────

/// Granularity used for period arithmetic and duration counting.
///
/// Units are multipliers, not fixed lengths: a month or a year has a
/// different length depending on where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl CalendarUnit {
    /// Build a [`PeriodSize`] of `amount` of this unit.
    pub const fn times(self, amount: i64) -> PeriodSize {
        PeriodSize::new(self, amount)
    }

    /// Fixed length in seconds for the sub-day units, `None` for calendar units.
    pub const fn fixed_seconds(self) -> Option<i64> {
        match self {
            CalendarUnit::Second => Some(1),
            CalendarUnit::Minute => Some(SECONDS_PER_MINUTE),
            CalendarUnit::Hour => Some(SECONDS_PER_HOUR),
            CalendarUnit::Day | CalendarUnit::Week | CalendarUnit::Month | CalendarUnit::Year => {
                None
            }
        }
    }
}

/// A signed multiple of a calendar unit, e.g. "2 weeks" or "-4 years".
///
/// Converting a bare [`CalendarUnit`] gives an amount of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodSize {
    pub unit: CalendarUnit,
    pub amount: i64,
}

impl PeriodSize {
    pub const fn new(unit: CalendarUnit, amount: i64) -> Self {
        Self { unit, amount }
    }

    /// The same size pointing the other way.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::CalendarOverflow`] for an amount of `i64::MIN`.
    pub fn negated(self) -> Result<Self> {
        let amount = self.amount.checked_neg().ok_or_else(|| {
            PeriodError::CalendarOverflow(format!("cannot negate {} {:?}", self.amount, self.unit))
        })?;
        Ok(Self { amount, ..self })
    }

    /// Half of this size, truncated toward zero.
    pub const fn half(self) -> Self {
        Self {
            unit: self.unit,
            amount: self.amount / 2,
        }
    }
}

impl From<CalendarUnit> for PeriodSize {
    fn from(unit: CalendarUnit) -> Self {
        Self::new(unit, 1)
    }
}

impl fmt::Display for PeriodSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.amount, self.unit)
    }
}

// ── Calendar service ────────────────────────────────────────────────────────

/// The calendar service a period delegates its date-component math to.
pub trait Calendar: fmt::Debug + Send + Sync {
    /// Add `amount` (possibly negative) of `unit` to `instant`.
    ///
    /// An amount of zero returns `instant` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::CalendarOverflow`] when the result is not
    /// representable.
    fn add_units(&self, instant: Instant, unit: CalendarUnit, amount: i64) -> Result<Instant>;

    /// Count the whole `unit`s from `earlier` to `later`.
    ///
    /// Non-negative when `earlier <= later`, negated when the arguments are
    /// reversed. For months this is the total month difference including the
    /// years, not the month-of-year difference.
    fn units_between(&self, earlier: Instant, later: Instant, unit: CalendarUnit) -> i64;

    fn is_leap_year(&self, year: i32) -> bool {
        is_leap_year(year)
    }

    fn add_size(&self, instant: Instant, size: PeriodSize) -> Result<Instant> {
        self.add_units(instant, size.unit, size.amount)
    }

    fn subtract_size(&self, instant: Instant, size: PeriodSize) -> Result<Instant> {
        self.add_size(instant, size.negated()?)
    }
}

/// Gregorian leap-year rule.
///
/// ```
/// use period_engine::is_leap_year;
///
/// assert!(is_leap_year(2000));
/// assert!(!is_leap_year(2100));
/// ```
pub fn is_leap_year(year: i32) -> bool {
    (year % 400 == 0) || (year % 4 == 0 && year % 100 != 0)
}

// ── GregorianCalendar ───────────────────────────────────────────────────────

/// Options for [`GregorianCalendar::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarOptions {
    /// Zone whose wall clock day/week/month/year arithmetic runs on.
    pub timezone: Tz,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self { timezone: Tz::UTC }
    }
}

/// Proleptic Gregorian calendar backed by `chrono`.
///
/// # Examples
///
/// ```
/// use period_engine::{Calendar, CalendarUnit, GregorianCalendar};
///
/// let calendar = GregorianCalendar::utc();
/// let jan31 = calendar.date(2010, 1, 31).unwrap();
/// let end = calendar.add_units(jan31, CalendarUnit::Month, 1).unwrap();
/// assert_eq!(end, calendar.date(2010, 2, 28).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GregorianCalendar {
    timezone: Tz,
}

impl Default for GregorianCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl GregorianCalendar {
    pub fn new(options: CalendarOptions) -> Self {
        Self {
            timezone: options.timezone,
        }
    }

    pub fn utc() -> Self {
        Self::new(CalendarOptions::default())
    }

    /// Build a calendar evaluating on the wall clock of an IANA timezone.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidTimezone`] if `name` is not a valid IANA
    /// timezone.
    pub fn from_timezone_name(name: &str) -> Result<Self> {
        let timezone = name
            .parse::<Tz>()
            .map_err(|_| PeriodError::InvalidTimezone(format!("'{}'", name)))?;
        Ok(Self::new(CalendarOptions { timezone }))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Wrap this calendar in a shared handle for periods and groups.
    pub fn shared(self) -> CalendarRef {
        Arc::new(self)
    }

    /// Midnight of the given date on this calendar's wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidDate`] for an impossible date, or
    /// [`PeriodError::NonexistentLocalTime`] if midnight is skipped by a DST
    /// transition in the calendar's timezone.
    pub fn date(&self, year: i32, month: u32, day: u32) -> Result<Instant> {
        self.datetime(year, month, day, 0, 0, 0)
    }

    /// The given wall-clock date and time on this calendar.
    ///
    /// # Errors
    ///
    /// Same as [`GregorianCalendar::date`].
    pub fn datetime(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Instant> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .ok_or_else(|| {
                PeriodError::InvalidDate(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                ))
            })?;
        self.resolve_wall_clock(naive)
    }

    /// Local wall-clock time of `instant`, `None` when the zone offset pushes
    /// it past the representable range.
    fn wall_clock(&self, instant: Instant) -> Option<NaiveDateTime> {
        let utc = instant.naive_utc();
        utc.checked_add_offset(self.timezone.offset_from_utc_datetime(&utc).fix())
    }

    /// Wall-clock time for counting units, falling back to the UTC reading at
    /// the edges of the range.
    fn counting_clock(&self, instant: Instant) -> NaiveDateTime {
        self.wall_clock(instant).unwrap_or_else(|| instant.naive_utc())
    }

    /// Map a wall-clock time back to an instant; ambiguous times take the
    /// earlier mapping.
    fn resolve_wall_clock(&self, naive: NaiveDateTime) -> Result<Instant> {
        let offset = self
            .timezone
            .offset_from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| {
                PeriodError::NonexistentLocalTime(format!("'{}' in {}", naive, self.timezone))
            })?;
        naive
            .checked_sub_offset(offset.fix())
            .map(|utc| Utc.from_utc_datetime(&utc))
            .ok_or_else(|| {
                PeriodError::CalendarOverflow(format!("'{}' in {}", naive, self.timezone))
            })
    }

    fn add_elapsed(&self, instant: Instant, seconds: i64) -> Option<Instant> {
        instant.checked_add_signed(TimeDelta::try_seconds(seconds)?)
    }

    fn add_local_days(&self, instant: Instant, days: i64) -> Result<Option<Instant>> {
        let shifted = TimeDelta::try_days(days)
            .zip(self.wall_clock(instant))
            .and_then(|(delta, local)| local.checked_add_signed(delta));
        shifted.map(|naive| self.resolve_wall_clock(naive)).transpose()
    }

    fn add_local_months(&self, instant: Instant, months: i64) -> Result<Option<Instant>> {
        self.wall_clock(instant)
            .and_then(|local| shift_months(local, months))
            .map(|naive| self.resolve_wall_clock(naive))
            .transpose()
    }

    fn months_between(&self, earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
        let mut months = i64::from(later.year() - earlier.year()) * MONTHS_PER_YEAR
            + i64::from(later.month())
            - i64::from(earlier.month());
        // The month fields overcount by one when the later day-of-month and
        // time are before the earlier one's.
        while months > 0 && shift_months(earlier, months).is_none_or(|shifted| shifted > later) {
            months -= 1;
        }
        months.max(0)
    }
}

impl Calendar for GregorianCalendar {
    fn add_units(&self, instant: Instant, unit: CalendarUnit, amount: i64) -> Result<Instant> {
        if amount == 0 {
            return Ok(instant);
        }

        let shifted = match unit {
            CalendarUnit::Second | CalendarUnit::Minute | CalendarUnit::Hour => {
                let per_unit = unit.fixed_seconds().unwrap_or(1);
                amount
                    .checked_mul(per_unit)
                    .and_then(|seconds| self.add_elapsed(instant, seconds))
            }
            CalendarUnit::Day => self.add_local_days(instant, amount)?,
            CalendarUnit::Week => match amount.checked_mul(DAYS_PER_WEEK) {
                Some(days) => self.add_local_days(instant, days)?,
                None => None,
            },
            CalendarUnit::Month => self.add_local_months(instant, amount)?,
            CalendarUnit::Year => match amount.checked_mul(MONTHS_PER_YEAR) {
                Some(months) => self.add_local_months(instant, months)?,
                None => None,
            },
        };

        shifted.ok_or_else(|| {
            PeriodError::CalendarOverflow(format!(
                "{} {:?} from {}",
                amount,
                unit,
                instant.to_rfc3339()
            ))
        })
    }

    fn units_between(&self, earlier: Instant, later: Instant, unit: CalendarUnit) -> i64 {
        if later < earlier {
            return -self.units_between(later, earlier, unit);
        }

        match unit {
            CalendarUnit::Second | CalendarUnit::Minute | CalendarUnit::Hour => {
                let per_unit = unit.fixed_seconds().unwrap_or(1);
                (later - earlier).num_seconds() / per_unit
            }
            CalendarUnit::Day | CalendarUnit::Week => {
                let days = local_days_between(
                    self.counting_clock(earlier),
                    self.counting_clock(later),
                );
                if unit == CalendarUnit::Week {
                    days / DAYS_PER_WEEK
                } else {
                    days
                }
            }
            CalendarUnit::Month | CalendarUnit::Year => {
                let months =
                    self.months_between(self.counting_clock(earlier), self.counting_clock(later));
                if unit == CalendarUnit::Year {
                    months / MONTHS_PER_YEAR
                } else {
                    months
                }
            }
        }
    }
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// Add a signed number of months, clamping the day to the target month.
fn shift_months(naive: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        naive.checked_add_months(magnitude)
    } else {
        naive.checked_sub_months(magnitude)
    }
}

/// Whole wall-clock days between two local times, never negative.
fn local_days_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    later.signed_duration_since(earlier).num_days().max(0)
}

// ── Tests ───────────────────────────────────────────────────────────────────
