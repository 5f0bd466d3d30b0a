//! Date format hints and normalization of statement dates.
//!
//! Banks disagree about the order of date components in their statement
//! exports, and two-digit years are still common in QIF files. User-facing
//! forms let the user pick the format their bank uses, and every date is
//! normalized to an unambiguous `YYYY-MM-DD` string before it goes any
//! further through the import pipeline.

use std::{fmt::Display, str::FromStr};

use crate::Error;

/// The order of date components used by a statement file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// Month first, e.g. `03/14/2025`. The common format for US banks.
    #[default]
    MonthDayYear,
    /// Day first, e.g. `14/03/2025`.
    DayMonthYear,
    /// Year first, e.g. `2025-03-14`.
    YearMonthDay,
}

impl DateFormat {
    /// Every supported date format, in the order they should be offered to
    /// the user.
    pub const ALL: [DateFormat; 3] = [
        DateFormat::MonthDayYear,
        DateFormat::DayMonthYear,
        DateFormat::YearMonthDay,
    ];
}

impl Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DateFormat::MonthDayYear => "MM/DD/YYYY",
            DateFormat::DayMonthYear => "DD/MM/YYYY",
            DateFormat::YearMonthDay => "YYYY-MM-DD",
        };

        write!(f, "{label}")
    }
}

impl FromStr for DateFormat {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "MM/DD/YYYY" => Ok(DateFormat::MonthDayYear),
            "DD/MM/YYYY" => Ok(DateFormat::DayMonthYear),
            "YYYY-MM-DD" => Ok(DateFormat::YearMonthDay),
            _ => Err(Error::UnknownDateFormat(string.to_owned())),
        }
    }
}

/// Normalize a date token from a statement file into a `YYYY-MM-DD` string.
///
/// The token is split on `/` or `-` and its components are interpreted
/// according to `date_format`. Two-digit years are pivoted at 50: values
/// above 50 fall in the 1900s, the rest in the 2000s.
///
/// # Errors
///
/// Returns [Error::InvalidDate] when the token does not have three numeric
/// components, or when a component falls outside the accepted range (months
/// 1-12, days 1-31, years 1900-2100).
pub fn normalize_date(token: &str, date_format: DateFormat) -> Result<String, Error> {
    let token = token.trim();
    let parts: Vec<&str> = token.split(['/', '-']).collect();

    let [first, second, third] = parts.as_slice() else {
        return Err(Error::InvalidDate(token.to_owned()));
    };

    let (year_part, month_part, day_part) = match date_format {
        DateFormat::MonthDayYear => (third, first, second),
        DateFormat::DayMonthYear => (third, second, first),
        DateFormat::YearMonthDay => (first, second, third),
    };

    let year: i32 = parse_component(year_part, token)?;
    let month: u32 = parse_component(month_part, token)?;
    let day: u32 = parse_component(day_part, token)?;

    let year = if year < 100 {
        if year > 50 { 1900 + year } else { 2000 + year }
    } else {
        year
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) || !(1900..=2100).contains(&year) {
        return Err(Error::InvalidDate(token.to_owned()));
    }

    Ok(format!("{year:04}-{month:02}-{day:02}"))
}

fn parse_component<N: FromStr>(part: &str, token: &str) -> Result<N, Error> {
    part.trim()
        .parse()
        .map_err(|_| Error::InvalidDate(token.to_owned()))
}
