//! Half-open date ranges `[check_in, check_out)` for room stays.

use chrono::NaiveDate;

use crate::shared::errors::{DateRule, DomainError, DomainResult};

/// Longest stay a single booking may cover.
pub const MAX_NIGHTS: i64 = 365;

/// A validated stay: `check_in < check_out`, at most [`MAX_NIGHTS`] nights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayDates {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayDates {
    /// Build a stay, checking only the ordering of the two dates.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> DomainResult<Self> {
        if check_out < check_in {
            return Err(DomainError::InvalidDateRange(DateRule::CheckOutBeforeCheckIn));
        }
        if check_out == check_in {
            return Err(DomainError::InvalidDateRange(DateRule::CheckOutEqualsCheckIn));
        }
        let stay = Self {
            check_in,
            check_out,
        };
        if stay.nights() > MAX_NIGHTS {
            return Err(DomainError::Validation(format!(
                "a stay cannot exceed {MAX_NIGHTS} nights"
            )));
        }
        Ok(stay)
    }

    /// Build a stay for a new request: check-in must not lie before `today`.
    pub fn upcoming(check_in: NaiveDate, check_out: NaiveDate, today: NaiveDate) -> DomainResult<Self> {
        if check_in < today {
            return Err(DomainError::InvalidDateRange(DateRule::CheckInInPast));
        }
        Self::new(check_in, check_out)
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of whole nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Every occupied night, i.e. each date in `[check_in, check_out)`.
    /// `[a1, b1)` and `[a2, b2)` overlap (`a1 < b2 && a2 < b1`) exactly when
    /// they share one of these nights.
    pub fn nights_iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.check_in
            .iter_days()
            .take_while(move |night| *night < self.check_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn counts_nights() {
        let stay = StayDates::new(d(2025, 1, 1), d(2025, 1, 4)).unwrap();
        assert_eq!(stay.nights(), 3);
        let nights: Vec<_> = stay.nights_iter().collect();
        assert_eq!(nights, vec![d(2025, 1, 1), d(2025, 1, 2), d(2025, 1, 3)]);
    }

    #[test]
    fn rejects_zero_and_negative_ranges() {
        let same = StayDates::new(d(2025, 1, 1), d(2025, 1, 1)).unwrap_err();
        assert!(matches!(
            same,
            DomainError::InvalidDateRange(DateRule::CheckOutEqualsCheckIn)
        ));

        let reversed = StayDates::new(d(2025, 1, 5), d(2025, 1, 1)).unwrap_err();
        assert!(matches!(
            reversed,
            DomainError::InvalidDateRange(DateRule::CheckOutBeforeCheckIn)
        ));
    }

    #[test]
    fn rejects_check_in_before_today() {
        let err = StayDates::upcoming(d(2025, 1, 1), d(2025, 1, 3), d(2025, 1, 2)).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidDateRange(DateRule::CheckInInPast)
        ));
        assert!(StayDates::upcoming(d(2025, 1, 2), d(2025, 1, 3), d(2025, 1, 2)).is_ok());
    }

    #[test]
    fn rejects_overlong_stays() {
        let err = StayDates::new(d(2025, 1, 1), d(2026, 6, 1)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn overlapping_stays_share_a_night() {
        let shares = |a: &StayDates, b: &StayDates| {
            let nights: Vec<_> = a.nights_iter().collect();
            b.nights_iter().any(|n| nights.contains(&n))
        };
        let a = StayDates::new(d(2025, 3, 1), d(2025, 3, 5)).unwrap();
        let touching = StayDates::new(d(2025, 3, 5), d(2025, 3, 7)).unwrap();
        let inside = StayDates::new(d(2025, 3, 2), d(2025, 3, 3)).unwrap();
        let straddling = StayDates::new(d(2025, 2, 27), d(2025, 3, 2)).unwrap();

        assert!(!shares(&a, &touching));
        assert!(!shares(&touching, &a));
        assert!(shares(&a, &inside));
        assert!(shares(&inside, &a));
        assert!(shares(&a, &straddling));
    }
}
