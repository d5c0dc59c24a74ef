use crate::calendar::{days_in_month, month_start_offset};

pub const DAYS_PER_WEEK: u32 = 7;

/// Weeks any month can span in a Monday-first grid.
pub const MAX_WEEKS: u32 = 6;

/// One month laid out as whole weeks. `None` entries are padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month0: u32,
    pub start_offset: u32,
    pub days_in_month: u32,
    slots: Vec<Option<u32>>,
}

impl MonthGrid {
    #[tracing::instrument(level = "trace")]
    pub fn build(year: i32, month0: u32) -> Self {
        let start_offset = month_start_offset(year, month0);
        let dim = days_in_month(year, month0);
        let padded_total = (start_offset + dim).div_ceil(DAYS_PER_WEEK) * DAYS_PER_WEEK;

        let slots = (0..padded_total)
            .map(|idx| {
                let day = idx as i64 - start_offset as i64 + 1;
                if day < 1 || day > dim as i64 {
                    None
                } else {
                    Some(day as u32)
                }
            })
            .collect();

        Self {
            year,
            month0,
            start_offset,
            days_in_month: dim,
            slots,
        }
    }

    pub fn slots(&self) -> &[Option<u32>] {
        &self.slots
    }

    pub fn weeks(&self) -> u32 {
        self.slots.len() as u32 / DAYS_PER_WEEK
    }

    pub fn day_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }
}

/// All twelve months of `year`, January first.
pub fn build_year(year: i32) -> Vec<MonthGrid> {
    (0..12).map(|month0| MonthGrid::build(year, month0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn january_2024_is_five_full_weeks() {
        let grid = MonthGrid::build(2024, 0);
        assert_eq!(grid.start_offset, 0);
        assert_eq!(grid.days_in_month, 31);
        assert_eq!(grid.slots().len(), 35);
        assert_eq!(grid.weeks(), 5);
        assert_eq!(grid.slots()[0], Some(1));
        assert_eq!(grid.slots()[30], Some(31));
        assert!(grid.slots()[31..].iter().all(Option::is_none));
    }

    #[test]
    fn every_month_pads_to_whole_weeks() {
        for year in [1900, 2000, 2023, 2024, 2025, 2026, 2100] {
            for grid in build_year(year) {
                assert_eq!(grid.slots().len() % 7, 0, "{year}-{}", grid.month0 + 1);
                assert!(grid.weeks() <= MAX_WEEKS);
                assert_eq!(grid.day_numbers().count() as u32, grid.days_in_month);

                let leading = grid.slots().iter().take_while(|s| s.is_none()).count();
                assert_eq!(leading as u32, grid.start_offset);
            }
        }
    }

    #[test]
    fn day_numbers_are_consecutive() {
        let grid = MonthGrid::build(2026, 1);
        let days: Vec<u32> = grid.day_numbers().collect();
        assert_eq!(days, (1..=28).collect::<Vec<_>>());
    }

    #[test]
    fn sunday_first_month_needs_six_weeks() {
        // 2023-10-01 is a Sunday, so 6 leading blanks + 31 days.
        let grid = MonthGrid::build(2023, 9);
        assert_eq!(grid.start_offset, 6);
        assert_eq!(grid.weeks(), 6);
    }
}
