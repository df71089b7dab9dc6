use chrono::{Months, NaiveDate};

use fintrack_data::Budget;

/// Today's date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// First and last day of a calendar month.
/// The month must be in 1..=12; this is enforced when budgets
/// and transactions enter the system.
pub fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let last = first
        .checked_add_months(Months::new(1))
        .unwrap()
        .pred_opt()
        .unwrap();
    (first, last)
}

/// The calendar month window an item covers.
pub trait MonthWindow {
    fn month_window(&self) -> (NaiveDate, NaiveDate);
}

impl MonthWindow for Budget {
    fn month_window(&self) -> (NaiveDate, NaiveDate) {
        month_bounds(self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds(2024, 1);
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());

        // Leap year february
        let (first, last) = month_bounds(2024, 2);
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        // December rolls the year
        let (_, last) = month_bounds(2023, 12);
        assert_eq!(last, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_budget_month_window() {
        let budget = Budget {
            month: 6,
            year: 2024,
            ..Default::default()
        };
        let (first, last) = budget.month_window();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }
}
