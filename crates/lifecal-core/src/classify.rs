use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{ReferenceDate, same_utc_day, utc_midnight};
use crate::grid::{DAYS_PER_WEEK, MonthGrid};
use crate::style::BirthdaySet;

pub const SATURDAY: u32 = 5;
pub const SUNDAY: u32 = 6;

/// Everything the appearance rules need to know about one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayClass {
    pub date: NaiveDate,
    pub day_number: u32,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday_index: u32,
    pub is_saturday: bool,
    pub is_sunday: bool,
    pub is_today: bool,
    pub is_past: bool,
    pub is_birthday: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DaySlot {
    Blank,
    Day(DayClass),
}

impl DaySlot {
    pub fn day(&self) -> Option<&DayClass> {
        match self {
            DaySlot::Blank => None,
            DaySlot::Day(day) => Some(day),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DayClassifier<'a> {
    reference: ReferenceDate,
    birthdays: &'a BirthdaySet,
}

impl<'a> DayClassifier<'a> {
    pub fn new(reference: ReferenceDate, birthdays: &'a BirthdaySet) -> Self {
        Self { reference, birthdays }
    }

    /// Classifies `day_number` of the month whose first day sits at `start_offset`.
    /// Returns `None` when the day does not exist.
    pub fn classify(
        &self,
        year: i32,
        month0: u32,
        start_offset: u32,
        day_number: u32,
    ) -> Option<DayClass> {
        let date = NaiveDate::from_ymd_opt(year, month0 + 1, day_number)?;

        let weekday_index = (start_offset + day_number - 1) % DAYS_PER_WEEK;
        let day_midnight = utc_midnight(date);
        let reference_midnight = self.reference.midnight_utc();

        Some(DayClass {
            date,
            day_number,
            weekday_index,
            is_saturday: weekday_index == SATURDAY,
            is_sunday: weekday_index == SUNDAY,
            is_today: same_utc_day(day_midnight, reference_midnight),
            is_past: day_midnight < reference_midnight,
            is_birthday: self.birthdays.contains_day(month0, day_number),
        })
    }

    pub fn classify_grid(&self, grid: &MonthGrid) -> Vec<DaySlot> {
        grid.slots()
            .iter()
            .map(|slot| {
                slot.and_then(|day| self.classify(grid.year, grid.month0, grid.start_offset, day))
                    .map_or(DaySlot::Blank, DaySlot::Day)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;
    use crate::calendar::weekday_of;
    use crate::grid::build_year;

    fn reference(y: i32, m: u32, d: u32) -> ReferenceDate {
        ReferenceDate::from_ymd(y, m, d).expect("valid reference date")
    }

    fn year_slots(year: i32, today: ReferenceDate, birthdays: &BirthdaySet) -> Vec<DayClass> {
        let classifier = DayClassifier::new(today, birthdays);
        build_year(year)
            .iter()
            .flat_map(|grid| classifier.classify_grid(grid))
            .filter_map(|slot| slot.day().copied())
            .collect()
    }

    #[test]
    fn weekday_index_matches_chrono() {
        let birthdays = BirthdaySet::default();
        for day in year_slots(2026, reference(2026, 6, 1), &birthdays) {
            assert_eq!(day.weekday_index, weekday_of(day.date), "{}", day.date);
        }
    }

    #[test]
    fn exactly_one_today_in_reference_year() {
        let birthdays = BirthdaySet::default();
        let today = reference(2024, 2, 29);

        let days = year_slots(2024, today, &birthdays);
        assert_eq!(days.len(), 366);
        let todays: Vec<_> = days.iter().filter(|d| d.is_today).collect();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].date, today.date());

        let other_year = year_slots(2025, today, &birthdays);
        assert!(other_year.iter().all(|d| !d.is_today));
        assert!(other_year.iter().all(|d| !d.is_past));
    }

    #[test]
    fn past_is_monotonic_and_excludes_today() {
        let birthdays = BirthdaySet::default();
        let days = year_slots(2026, reference(2026, 10, 17), &birthdays);

        let mut seen_future = false;
        for day in &days {
            assert!(!(day.is_past && day.is_today));
            if !day.is_past {
                seen_future = true;
            }
            assert!(!(seen_future && day.is_past), "past after future at {}", day.date);
        }
        assert_eq!(days.iter().filter(|d| d.is_past).count(), 289);
    }

    #[test]
    fn birthdays_and_weekends() {
        let birthdays = BirthdaySet::from_entries(["03-28"]);
        let classifier = DayClassifier::new(reference(2027, 1, 1), &birthdays);

        // 2027-03-28 is a Sunday.
        let start = crate::calendar::month_start_offset(2027, 2);
        let day = classifier.classify(2027, 2, start, 28).expect("day exists");
        assert!(day.is_birthday);
        assert!(day.is_sunday);
        assert!(!day.is_saturday);
        assert!(!day.is_past && !day.is_today);
        assert_eq!(day.date.weekday(), chrono::Weekday::Sun);

        let saturday = classifier.classify(2027, 2, start, 27).expect("day exists");
        assert!(saturday.is_saturday);
        assert!(!saturday.is_birthday);

        assert_eq!(classifier.classify(2027, 1, 0, 30), None);
    }

    #[test]
    fn padding_slots_stay_blank() {
        let birthdays = BirthdaySet::default();
        let classifier = DayClassifier::new(reference(2023, 10, 1), &birthdays);
        let grid = MonthGrid::build(2023, 9);

        let slots = classifier.classify_grid(&grid);
        assert_eq!(slots.len(), grid.slots().len());
        assert!(slots[..6].iter().all(|s| *s == DaySlot::Blank));
        assert!(slots[6].day().is_some_and(|d| d.is_today && d.is_sunday));
    }
}
