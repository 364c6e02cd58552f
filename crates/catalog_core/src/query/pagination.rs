//! Page metadata for catalog listing.
//!
//! # Invariants
//! - `total_page == ceil(records_count / limit)`, `0` when there are no records.
//! - `1 <= current_page <= total_page`; with zero records every page is out of range.
//! - `previous`/`next` use `0` for "none".

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page size used when configuration does not override it.
pub const DEFAULT_PAGE_SIZE: u32 = 2;

/// Pagination metadata returned with each catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pagination {
    pub next: u64,
    pub previous: u64,
    pub record_per_page: u32,
    pub current_page: u64,
    pub total_page: u64,
}

impl Pagination {
    /// Rows to skip before the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.record_per_page) * (self.current_page - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationError {
    /// Page size of zero cannot paginate anything.
    ZeroLimit,
    /// Caller asked for a negative page number.
    NegativePage(i64),
    /// Requested page is past the last page.
    OutOfRange { page: u64, total_page: u64 },
}

impl Display for PaginationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLimit => write!(f, "page size must be greater than zero"),
            Self::NegativePage(page) => write!(f, "page number {page} is negative"),
            Self::OutOfRange { page, total_page } => {
                write!(f, "page {page} is out of range (total pages: {total_page})")
            }
        }
    }
}

impl Error for PaginationError {}

/// Computes page metadata for `records_count` rows split into pages of `limit`.
///
/// `page == 0` is normalized to the first page.
///
/// # Errors
/// - `ZeroLimit` when `limit == 0`.
/// - `NegativePage` when `page < 0`.
/// - `OutOfRange` when the normalized page exceeds the total page count.
pub fn compute_pagination(
    records_count: u64,
    limit: u32,
    page: i64,
) -> Result<Pagination, PaginationError> {
    if limit == 0 {
        return Err(PaginationError::ZeroLimit);
    }
    if page < 0 {
        return Err(PaginationError::NegativePage(page));
    }

    let page = u64::try_from(page).unwrap_or(0).max(1);
    let total_page = records_count.div_ceil(u64::from(limit));
    if page > total_page {
        return Err(PaginationError::OutOfRange { page, total_page });
    }

    Ok(Pagination {
        next: if page < total_page { page + 1 } else { 0 },
        previous: if page > 1 { page - 1 } else { 0 },
        record_per_page: limit,
        current_page: page,
        total_page,
    })
}

#[cfg(test)]
mod tests {
    use super::{compute_pagination, PaginationError};

    #[test]
    fn first_of_three_pages() {
        let pagination = compute_pagination(5, 2, 1).expect("page 1 of 3 should exist");
        assert_eq!(pagination.total_page, 3);
        assert_eq!(pagination.previous, 0);
        assert_eq!(pagination.next, 2);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn last_page_has_no_next() {
        let pagination = compute_pagination(5, 2, 3).expect("page 3 of 3 should exist");
        assert_eq!(pagination.previous, 2);
        assert_eq!(pagination.next, 0);
        assert_eq!(pagination.offset(), 4);
    }

    #[test]
    fn page_past_the_end_is_out_of_range() {
        assert_eq!(
            compute_pagination(5, 2, 4),
            Err(PaginationError::OutOfRange {
                page: 4,
                total_page: 3
            })
        );
    }

    #[test]
    fn empty_result_has_no_valid_page() {
        assert_eq!(
            compute_pagination(0, 2, 1),
            Err(PaginationError::OutOfRange {
                page: 1,
                total_page: 0
            })
        );
        assert!(matches!(
            compute_pagination(0, 2, 0),
            Err(PaginationError::OutOfRange { total_page: 0, .. })
        ));
    }

    #[test]
    fn page_zero_is_normalized_and_negative_page_rejected() {
        let pagination = compute_pagination(4, 2, 0).expect("page 0 should normalize to 1");
        assert_eq!(pagination.current_page, 1);
        assert_eq!(
            compute_pagination(4, 2, -1),
            Err(PaginationError::NegativePage(-1))
        );
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert_eq!(compute_pagination(4, 0, 1), Err(PaginationError::ZeroLimit));
    }

    #[test]
    fn neighbours_bracket_current_page_for_every_valid_request() {
        for records_count in 0..=13_u64 {
            for limit in 1..=4_u32 {
                let expected_total = records_count.div_ceil(u64::from(limit));
                for page in 1..=(expected_total as i64 + 2) {
                    match compute_pagination(records_count, limit, page) {
                        Ok(pagination) => {
                            let current = pagination.current_page;
                            assert_eq!(pagination.total_page, expected_total);
                            assert!(current <= expected_total);
                            assert!(pagination.previous == 0 || pagination.previous < current);
                            assert!(pagination.next == 0 || pagination.next > current);
                            assert_eq!(pagination.previous == 0, current == 1);
                            assert_eq!(pagination.next == 0, current == expected_total);
                        }
                        Err(PaginationError::OutOfRange { page: got, total_page }) => {
                            assert_eq!(total_page, expected_total);
                            assert!(got > expected_total);
                        }
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
            }
        }
    }
}
