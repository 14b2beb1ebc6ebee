//! Calendar dates for CF style time coordinates.
//!
//! Climate model output routinely uses calendars other than the Gregorian one (365 day years,
//! 360 day years, ...), so a date here always carries the calendar it belongs to. Year
//! arithmetic keeps month, day and time of day, and refuses to produce a day the target year
//! doesn't have.
//!
//! The `standard` calendar is treated as proleptic Gregorian. The Julian/Gregorian switch in
//! October 1582 is not modelled.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::errors::{Error, Result};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Calendar {
    Standard,
    ProlepticGregorian,
    Julian,
    NoLeap,
    AllLeap,
    Day360,
}

impl Calendar {
    /// The CF name of this calendar
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::ProlepticGregorian => "proleptic_gregorian",
            Self::Julian => "julian",
            Self::NoLeap => "noleap",
            Self::AllLeap => "all_leap",
            Self::Day360 => "360_day",
        }
    }

    pub fn is_leap(&self, year: i32) -> bool {
        match self {
            Self::Standard | Self::ProlepticGregorian => {
                (year.rem_euclid(4) == 0 && year.rem_euclid(100) != 0) || year.rem_euclid(400) == 0
            }
            Self::Julian => year.rem_euclid(4) == 0,
            Self::NoLeap | Self::Day360 => false,
            Self::AllLeap => true,
        }
    }

    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        if let Self::Day360 = self {
            return 30;
        }

        match month {
            2 => {
                if self.is_leap(year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    fn days_in_year(&self, year: i32) -> i64 {
        (1..=12).map(|month| self.days_in_month(year, month) as i64).sum()
    }

    fn check(&self, year: i32, month: u32, day: u32) -> Result<()> {
        if month < 1 || month > 12 || day < 1 || day > self.days_in_month(year, month) {
            Err(Error::InvalidDate {
                year,
                month,
                day,
                calendar: self.name(),
            })
        } else {
            Ok(())
        }
    }

    /// Count of days from an arbitrary, calendar specific origin. Only differences between two
    /// ordinals of the same calendar are meaningful.
    ///
    fn ordinal(&self, year: i32, month: u32, day: u32) -> Result<i64> {
        self.check(year, month, day)?;
        match self {
            Self::Standard | Self::ProlepticGregorian => NaiveDate::from_ymd_opt(year, month, day)
                .map(|date| date.num_days_from_ce() as i64)
                .ok_or(Error::InvalidDate {
                    year,
                    month,
                    day,
                    calendar: self.name(),
                }),
            Self::Julian => {
                // Julian day number
                let a = (14 - month as i64) / 12;
                let y = year as i64 + 4800 - a;
                let m = month as i64 + 12 * a - 3;
                Ok(day as i64 + (153 * m + 2) / 5 + 365 * y + y.div_euclid(4) - 32083)
            }
            Self::NoLeap | Self::AllLeap | Self::Day360 => {
                let before: i64 = (1..month)
                    .map(|m| self.days_in_month(year, m) as i64)
                    .sum();
                Ok(year as i64 * self.days_in_year(year) + before + day as i64 - 1)
            }
        }
    }

    fn from_ordinal(&self, ordinal: i64) -> Result<(i32, u32, u32)> {
        match self {
            Self::Standard | Self::ProlepticGregorian => i32::try_from(ordinal)
                .ok()
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .map(|date| (date.year(), date.month(), date.day()))
                .ok_or(Error::DateOutOfRange(ordinal as f64)),
            Self::Julian => {
                let c = ordinal + 32082;
                let d = (4 * c + 3).div_euclid(1461);
                let e = c - (1461 * d).div_euclid(4);
                let m = (5 * e + 2) / 153;
                let day = e - (153 * m + 2) / 5 + 1;
                let month = m + 3 - 12 * (m / 10);
                let year = d - 4800 + m / 10;
                let year = i32::try_from(year).map_err(|_| Error::DateOutOfRange(ordinal as f64))?;

                Ok((year, month as u32, day as u32))
            }
            Self::NoLeap | Self::AllLeap | Self::Day360 => {
                // Every year has the same length in these calendars
                let days_in_year = self.days_in_year(0);
                let year = i32::try_from(ordinal.div_euclid(days_in_year))
                    .map_err(|_| Error::DateOutOfRange(ordinal as f64))?;
                let mut remainder = ordinal.rem_euclid(days_in_year);
                let mut month = 1;
                while remainder >= self.days_in_month(year, month) as i64 {
                    remainder -= self.days_in_month(year, month) as i64;
                    month += 1;
                }

                Ok((year, month, remainder as u32 + 1))
            }
        }
    }
}

impl FromStr for Calendar {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" | "gregorian" => Ok(Self::Standard),
            "proleptic_gregorian" => Ok(Self::ProlepticGregorian),
            "julian" => Ok(Self::Julian),
            "noleap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            _ => Err(Error::UnknownCalendar(name.to_string())),
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A date and time of day in a specific calendar.
///
/// Ordering compares the date, then the time of day. Comparing dates from different calendars
/// is allowed but rarely meaningful.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CfDatetime {
    year: i32,
    month: u32,
    day: u32,
    time: NaiveTime,
    calendar: Calendar,
}

impl CfDatetime {
    /// Midnight on the given day. Fails if the calendar has no such day.
    pub fn new(calendar: Calendar, year: i32, month: u32, day: u32) -> Result<Self> {
        calendar.check(year, month, day)?;

        Ok(Self {
            year,
            month,
            day,
            time: NaiveTime::MIN,
            calendar,
        })
    }

    /// Same day, at the given time of day.
    pub fn and_hms(self, hour: u32, minute: u32, second: u32) -> Result<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or(Error::InvalidDate {
            year: self.year,
            month: self.month,
            day: self.day,
            calendar: self.calendar.name(),
        })?;

        Ok(Self { time, ..self })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// The same month, day and time of day, `years` years later (or earlier, if negative).
    ///
    /// Fails when the target year lacks the day, ie 29 February in a non-leap year.
    ///
    pub fn add_years(&self, years: i32) -> Result<Self> {
        let year = self
            .year
            .checked_add(years)
            .ok_or_else(|| Error::ShiftOverflow {
                value: self.to_string(),
                amount: years.into(),
            })?;
        self.calendar.check(year, self.month, self.day)?;

        Ok(Self { year, ..*self })
    }

    /// Signed number of seconds from `other` to `self`, counted in `self`'s calendar.
    pub fn seconds_since(&self, other: &CfDatetime) -> Result<i64> {
        let calendar = self.calendar;
        let days = calendar.ordinal(self.year, self.month, self.day)?
            - calendar.ordinal(other.year, other.month, other.day)?;

        Ok(days * SECONDS_PER_DAY + self.seconds_of_day() - other.seconds_of_day())
    }

    fn seconds_of_day(&self) -> i64 {
        self.time.num_seconds_from_midnight() as i64
    }
}

impl fmt::Display for CfDatetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {}",
            self.year,
            self.month,
            self.day,
            self.time.format("%H:%M:%S")
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn seconds(&self) -> i64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3_600,
            Self::Days => SECONDS_PER_DAY,
        }
    }

    fn parse(unit: &str) -> Option<Self> {
        match unit.to_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => Some(Self::Seconds),
            "minutes" | "minute" | "mins" | "min" => Some(Self::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(Self::Hours),
            "days" | "day" | "d" => Some(Self::Days),
            _ => None,
        }
    }
}

/// Parsed form of a `"<unit> since <epoch>"` units attribute, used to decode raw time offsets
/// to dates and back.
///
/// Month and year units are rejected: they have no fixed length. Datasets using them have to
/// be handled with time decoding switched off.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: CfDatetime,
}

impl TimeUnits {
    pub fn parse(units: &str, calendar: Calendar) -> Result<Self> {
        let bad = || Error::InvalidTimeUnits(units.to_string());
        let mut words = units.split_whitespace();
        let unit = words.next().and_then(TimeUnit::parse).ok_or_else(bad)?;
        if words.next().map(|word| word.to_lowercase()) != Some(String::from("since")) {
            return Err(bad());
        }

        let stamp = words.next().ok_or_else(bad)?;
        let (date, time) = match stamp.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (stamp, words.next()),
        };

        let (year, month, day) = parse_date(date).ok_or_else(bad)?;
        let (hour, minute, second) = match time {
            Some(time) => parse_time(time).ok_or_else(bad)?,
            None => (0, 0, 0),
        };
        let epoch = CfDatetime::new(calendar, year, month, day)?.and_hms(hour, minute, second)?;

        Ok(Self { unit, epoch })
    }

    /// Convert a raw offset to a date. Offsets are rounded to the nearest second.
    pub fn decode(&self, value: f64) -> Result<CfDatetime> {
        let offset = (value * self.unit.seconds() as f64).round();
        if !offset.is_finite() || offset.abs() >= (i64::MAX / 2) as f64 {
            return Err(Error::DateOutOfRange(value));
        }

        let calendar = self.epoch.calendar;
        let total = self.epoch.seconds_of_day() + offset as i64;
        let ordinal = calendar.ordinal(self.epoch.year, self.epoch.month, self.epoch.day)?
            + total.div_euclid(SECONDS_PER_DAY);
        let (year, month, day) = calendar.from_ordinal(ordinal)?;
        let seconds = total.rem_euclid(SECONDS_PER_DAY) as u32;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .ok_or(Error::DateOutOfRange(value))?;

        Ok(CfDatetime {
            year,
            month,
            day,
            time,
            calendar,
        })
    }

    /// Convert a date to a raw offset, reading the date in the epoch's calendar.
    pub fn encode(&self, date: &CfDatetime) -> Result<f64> {
        let date = CfDatetime {
            calendar: self.epoch.calendar,
            ..*date
        };
        let seconds = date.seconds_since(&self.epoch)?;

        Ok(seconds as f64 / self.unit.seconds() as f64)
    }
}

fn parse_date(date: &str) -> Option<(i32, u32, u32)> {
    let (sign, date) = match date.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, date),
    };
    let mut parts = date.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month = parts.next().map_or(Some(1), |m| m.parse().ok())?;
    let day = parts.next().map_or(Some(1), |d| d.parse().ok())?;

    Some((sign * year, month, day))
}

fn parse_time(time: &str) -> Option<(u32, u32, u32)> {
    let time = time.trim_end_matches('Z');
    let mut parts = time.splitn(3, ':');
    let hour = parts.next()?.parse().ok()?;
    let minute = parts.next().map_or(Some(0), |m| m.parse().ok())?;
    let second = parts
        .next()
        .map_or(Some(0.0), |s| s.parse::<f64>().ok())?
        .floor() as u32;

    Some((hour, minute, second))
}
