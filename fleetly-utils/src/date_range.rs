use std::fmt::{Display, Formatter};
use thiserror::*;

use time::Date;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Range must end after it starts, got [{0} .. {1})")]
    EmptyRange(Date, Date),
}

/// Half-open day interval `[start, end)`.
///
/// Every date comparison in the rental domain goes through this type, so the
/// boundary convention is decided exactly once: the end day is excluded. A
/// booking that ends on day D does not block a rental starting on day D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, DateRangeError> {
        if end <= start {
            return Err(DateRangeError::EmptyRange(start, end));
        }
        Ok(Self { start, end })
    }

    /// `[day, day + 1)` — the default "today" query interval.
    pub fn single_day(day: Date) -> Self {
        Self {
            start: day,
            end: day.next_day().expect("A day after today exists, right? :-O"),
        }
    }

    /// `[first, last + 1)` — normalization for caller-supplied filters where
    /// both days are meant inclusively.
    pub fn days_inclusive(first: Date, last: Date) -> Result<Self, DateRangeError> {
        if last < first {
            return Err(DateRangeError::EmptyRange(first, last));
        }
        Ok(Self {
            start: first,
            end: last
                .next_day()
                .expect("A day after the last day exists, right? :-O"),
        })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, day: Date) -> bool {
        self.start <= day && day < self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.overlaps_span(other.start, other.end)
    }

    /// Intersection test against a raw `[start, end)` pair, for callers which
    /// hold the two dates without a constructed range.
    pub fn overlaps_span(&self, start: Date, end: Date) -> bool {
        start < self.end && self.start < end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::date;

    #[test]
    fn test_new_rejects_empty_range() {
        assert_eq!(
            DateRange::new(date!(2024 - 06 - 15), date!(2024 - 06 - 15)),
            Err(DateRangeError::EmptyRange(
                date!(2024 - 06 - 15),
                date!(2024 - 06 - 15)
            ))
        );
        assert!(DateRange::new(date!(2024 - 06 - 15), date!(2024 - 06 - 10)).is_err());
        assert!(DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 15)).is_ok());
    }

    #[test]
    fn test_single_day_is_one_day_wide() {
        let range = DateRange::single_day(date!(2024 - 06 - 10));
        assert_eq!(range.start(), date!(2024 - 06 - 10));
        assert_eq!(range.end(), date!(2024 - 06 - 11));
        assert!(range.contains(date!(2024 - 06 - 10)));
        assert!(!range.contains(date!(2024 - 06 - 11)));
    }

    #[test]
    fn test_days_inclusive_extends_past_last_day() {
        let range =
            DateRange::days_inclusive(date!(2024 - 06 - 10), date!(2024 - 06 - 12)).unwrap();
        assert!(range.contains(date!(2024 - 06 - 12)));
        assert!(!range.contains(date!(2024 - 06 - 13)));

        // A single inclusive day is a valid one-day range.
        let range =
            DateRange::days_inclusive(date!(2024 - 06 - 10), date!(2024 - 06 - 10)).unwrap();
        assert_eq!(range, DateRange::single_day(date!(2024 - 06 - 10)));
    }

    #[test]
    fn test_overlaps_contained_range() {
        let booking =
            DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 15)).unwrap();
        let query = DateRange::new(date!(2024 - 06 - 12), date!(2024 - 06 - 13)).unwrap();
        assert!(query.overlaps(&booking));
        assert!(booking.overlaps(&query));
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        let booking =
            DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 15)).unwrap();
        let query = DateRange::new(date!(2024 - 06 - 15), date!(2024 - 06 - 20)).unwrap();
        assert!(!query.overlaps(&booking));
        assert!(!booking.overlaps(&query));
    }

    #[test]
    fn test_partial_overlap() {
        let booking =
            DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 15)).unwrap();
        let query = DateRange::new(date!(2024 - 06 - 14), date!(2024 - 06 - 20)).unwrap();
        assert!(query.overlaps(&booking));
    }

    // The legacy system expressed the intersection test as a three-clause
    // disjunction (starts inside / ends inside / fully contained). The
    // collapsed inequality must agree with it on every pair of valid ranges.
    proptest! {
        #[test]
        fn overlap_agrees_with_three_clause_form(
            a in 2_440_588i32..2_480_000,
            b in 2_440_588i32..2_480_000,
            c in 2_440_588i32..2_480_000,
            d in 2_440_588i32..2_480_000,
        ) {
            prop_assume!(a != b && c != d);
            let booking_start = Date::from_julian_day(a.min(b)).unwrap();
            let booking_end = Date::from_julian_day(a.max(b)).unwrap();
            let query = DateRange::new(
                Date::from_julian_day(c.min(d)).unwrap(),
                Date::from_julian_day(c.max(d)).unwrap(),
            )
            .unwrap();

            let three_clause = (booking_start <= query.start() && booking_end > query.start())
                || (booking_start < query.end() && booking_end >= query.end())
                || (booking_start >= query.start() && booking_end <= query.end());

            prop_assert_eq!(query.overlaps_span(booking_start, booking_end), three_clause);
        }
    }
}
