//! RF2 effective time.
//!
//! RF2 rows carry an `effectiveTime` column of exactly eight ASCII digits in
//! `YYYYMMDD` form. The persisted graph format stores the same value as a tick
//! count (100 ns units since 0001-01-01), so both encodings live here.

use std::fmt;

use chrono::{Days, Local, NaiveDate};

/// A validated calendar date taken from an RF2 `effectiveTime` column.
///
/// # Examples
///
/// ```
/// use snomed_types::EffectiveTime;
///
/// let time = EffectiveTime::from_yyyymmdd("20020131").unwrap();
/// assert_eq!(time.to_string(), "20020131");
/// assert!(EffectiveTime::from_yyyymmdd("20020231").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectiveTime(NaiveDate);

impl EffectiveTime {
    /// Number of 100 ns ticks in one day.
    pub const TICKS_PER_DAY: i64 = 864_000_000_000;

    /// Creates an effective time from year, month and day.
    ///
    /// Returns `None` for dates that do not exist on the calendar and for
    /// years before 1, which the tick encoding cannot represent.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if year < 1 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses the RF2 textual form.
    ///
    /// The value must be exactly eight ASCII digits forming a valid date.
    pub fn from_yyyymmdd(value: &str) -> Option<Self> {
        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = value[0..4].parse().ok()?;
        let month = value[4..6].parse().ok()?;
        let day = value[6..8].parse().ok()?;
        Self::from_ymd(year, month, day)
    }

    /// Today's date in the local time zone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Returns the underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Converts to ticks since 0001-01-01.
    pub fn to_ticks(&self) -> i64 {
        (self.0 - tick_epoch()).num_days() * Self::TICKS_PER_DAY
    }

    /// Converts back from ticks since 0001-01-01.
    ///
    /// Returns `None` for negative tick counts, counts that are not whole days,
    /// and dates beyond chrono's supported range.
    pub fn from_ticks(ticks: i64) -> Option<Self> {
        if ticks < 0 || ticks % Self::TICKS_PER_DAY != 0 {
            return None;
        }
        let days = u64::try_from(ticks / Self::TICKS_PER_DAY).ok()?;
        tick_epoch().checked_add_days(Days::new(days)).map(Self)
    }
}

impl From<NaiveDate> for EffectiveTime {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for EffectiveTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

/// 0001-01-01, day zero of the tick encoding.
fn tick_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}
