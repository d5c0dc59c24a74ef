use std::fmt;
use std::str::FromStr;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Datelike,
  NaiveDate,
  NaiveTime,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};

pub const MILLIS_PER_DAY: i64 =
  86_400_000;

pub const MONTH_LABELS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May",
  "Jun", "Jul", "Aug", "Sep", "Oct",
  "Nov", "Dec"
];

/// A UTC calendar date without a
/// time-of-day component.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
pub struct ReferenceDate(NaiveDate);

impl ReferenceDate {
  #[must_use]
  pub fn new(date: NaiveDate) -> Self {
    Self(date)
  }

  #[must_use]
  pub fn from_ymd(
    year: i32,
    month: u32,
    day: u32
  ) -> Option<Self> {
    NaiveDate::from_ymd_opt(
      year, month, day
    )
    .map(Self)
  }

  #[must_use]
  pub fn today_utc() -> Self {
    Self(Utc::now().date_naive())
  }

  pub fn parse(
    raw: &str
  ) -> anyhow::Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(anyhow!(
        "date cannot be empty"
      ));
    }

    NaiveDate::parse_from_str(
      trimmed, "%Y-%m-%d"
    )
    .map(Self)
    .with_context(|| {
      format!(
        "invalid date {trimmed:?}; \
         expected YYYY-MM-DD"
      )
    })
  }

  #[must_use]
  pub fn date(&self) -> NaiveDate {
    self.0
  }

  #[must_use]
  pub fn year(&self) -> i32 {
    self.0.year()
  }

  #[must_use]
  pub fn midnight_utc(
    &self
  ) -> DateTime<Utc> {
    utc_midnight(self.0)
  }
}

impl FromStr for ReferenceDate {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for ReferenceDate {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{}",
      self.0.format("%Y-%m-%d")
    )
  }
}

#[must_use]
pub fn utc_midnight(
  date: NaiveDate
) -> DateTime<Utc> {
  date.and_time(NaiveTime::MIN).and_utc()
}

#[must_use]
pub fn same_utc_day(
  a: DateTime<Utc>,
  b: DateTime<Utc>
) -> bool {
  utc_midnight(a.date_naive())
    == utc_midnight(b.date_naive())
}

/// Remaps a Sunday-first index
/// (0=Sunday) to Monday-first
/// (0=Monday, 6=Sunday).
#[must_use]
pub fn weekday_monday_first(
  sunday_first: u32
) -> u32 {
  (sunday_first + 6) % 7
}

#[must_use]
pub fn weekday_of(
  date: NaiveDate
) -> u32 {
  weekday_monday_first(
    date
      .weekday()
      .num_days_from_sunday()
  )
}

#[must_use]
pub fn is_leap_year(year: i32) -> bool {
  (year % 4 == 0 && year % 100 != 0)
    || year % 400 == 0
}

#[must_use]
pub fn total_days(year: i32) -> u32 {
  if is_leap_year(year) {
    366
  } else {
    365
  }
}

/// `month0` is zero-based (0 = January).
#[must_use]
pub fn days_in_month(
  year: i32,
  month0: u32
) -> u32 {
  match month0 {
    | 1 => {
      if is_leap_year(year) {
        29
      } else {
        28
      }
    }
    | 3 | 5 | 8 | 10 => 30,
    | _ => 31
  }
}

/// Monday-first weekday of the first
/// day of the month.
#[must_use]
pub fn month_start_offset(
  year: i32,
  month0: u32
) -> u32 {
  NaiveDate::from_ymd_opt(
    year,
    month0 + 1,
    1
  )
  .map(weekday_of)
  .unwrap_or(0)
}

#[must_use]
pub fn day_of_year(
  date: NaiveDate
) -> u32 {
  let start =
    date.with_ordinal(1).unwrap_or(date);
  let diff = utc_midnight(date)
    .timestamp_millis()
    - utc_midnight(start)
      .timestamp_millis();
  (diff.div_euclid(MILLIS_PER_DAY) + 1)
    as u32
}

#[must_use]
pub fn mmdd(
  month0: u32,
  day: u32
) -> String {
  format!("{:02}-{:02}", month0 + 1, day)
}

#[cfg(test)]
mod tests {
  use chrono::{
    Duration,
    TimeZone
  };

  use super::*;

  #[test]
  fn month_lengths_sum_to_year_length()
  {
    for year in 1890..2110 {
      let sum: u32 = (0..12)
        .map(|m| days_in_month(year, m))
        .sum();
      assert_eq!(
        sum,
        total_days(year),
        "year {year}"
      );
    }
  }

  #[test]
  fn gregorian_leap_rule() {
    assert!(is_leap_year(2024));
    assert!(is_leap_year(2000));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
    assert_eq!(days_in_month(2024, 1), 29);
    assert_eq!(days_in_month(2100, 1), 28);
    assert_eq!(days_in_month(2023, 3), 30);
  }

  #[test]
  fn monday_first_is_a_bijection() {
    let mut seen: Vec<u32> = (0..7)
      .map(weekday_monday_first)
      .collect();
    assert_eq!(weekday_monday_first(0), 6);
    assert_eq!(weekday_monday_first(1), 0);
    seen.sort_unstable();
    assert_eq!(
      seen,
      (0..7).collect::<Vec<_>>()
    );
  }

  #[test]
  fn day_of_year_matches_ordinal() {
    let mut day =
      NaiveDate::from_ymd_opt(2023, 1, 1)
        .expect("valid date");
    let end =
      NaiveDate::from_ymd_opt(2025, 1, 1)
        .expect("valid date");
    while day < end {
      assert_eq!(
        day_of_year(day),
        day.ordinal()
      );
      day = day
        .succ_opt()
        .expect("next day exists");
    }

    let leap_march =
      NaiveDate::from_ymd_opt(2024, 3, 1)
        .expect("valid date");
    assert_eq!(day_of_year(leap_march), 61);
  }

  #[test]
  fn january_2024_starts_on_monday() {
    assert_eq!(
      month_start_offset(2024, 0),
      0
    );
    // 2023-10-01 was a Sunday.
    assert_eq!(
      month_start_offset(2023, 9),
      6
    );
  }

  #[test]
  fn parses_reference_dates() {
    let date = ReferenceDate::parse(
      " 2024-03-28 "
    )
    .expect("parse date");
    assert_eq!(date.year(), 2024);
    assert_eq!(
      date.to_string(),
      "2024-03-28"
    );
    assert!(
      ReferenceDate::parse("2024-02-30")
        .is_err()
    );
    assert!(
      ReferenceDate::parse("").is_err()
    );
    assert!(
      "tomorrow"
        .parse::<ReferenceDate>()
        .is_err()
    );
  }

  #[test]
  fn same_day_ignores_time_of_day() {
    let morning = Utc
      .with_ymd_and_hms(
        2026, 2, 17, 0, 0, 1
      )
      .single()
      .expect("valid time");
    let night = Utc
      .with_ymd_and_hms(
        2026, 2, 17, 23, 59, 59
      )
      .single()
      .expect("valid time");
    assert!(same_utc_day(morning, night));
    assert!(!same_utc_day(
      morning,
      night + Duration::seconds(1)
    ));
  }

  #[test]
  fn mmdd_is_zero_padded() {
    assert_eq!(mmdd(2, 8), "03-08");
    assert_eq!(mmdd(10, 24), "11-24");
  }
}
