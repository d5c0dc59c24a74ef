use serde::Serialize;

use crate::calendar::{ReferenceDate, day_of_year, total_days};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearProgress {
    pub day_of_year: u32,
    pub total_days: u32,
    pub days_left: u32,
    pub fraction: f64,
    pub percent: u32,
}

impl YearProgress {
    pub fn for_date(date: ReferenceDate) -> Self {
        Self::from_counts(day_of_year(date.date()), total_days(date.year()))
    }

    pub fn from_counts(day_of_year: u32, total_days: u32) -> Self {
        let fraction = if total_days == 0 {
            0.0
        } else {
            (day_of_year as f64 / total_days as f64).clamp(0.0, 1.0)
        };

        Self {
            day_of_year,
            total_days,
            days_left: total_days.saturating_sub(day_of_year),
            fraction,
            percent: (fraction * 100.0).round() as u32,
        }
    }

    /// Filled share of the bar in percent, one decimal place.
    pub fn bar_fill_percent(&self) -> f64 {
        (self.fraction * 1000.0).round() / 10.0
    }

    pub fn summary(&self) -> String {
        format!(
            "day {}/{}, {} days left, {}%",
            self.day_of_year, self.total_days, self.days_left, self.percent
        )
    }
}
