use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: u64 = 9;
pub const MAX_PAGE_SIZE: u64 = 100;

pub const PAGE_OUT_OF_RANGE: &str = "Page is out of range.";

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, starting at 1.
    pub page: Option<i64>,
    /// Products per page, default 9.
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Returns `(page, limit, offset)`. Values below 1 fall back to the defaults.
    /// The offset has to fit a signed 64-bit SQL parameter.
    pub fn normalize(&self) -> AppResult<(u64, u64, u64)> {
        let page = self
            .page
            .and_then(|p| u64::try_from(p).ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = self
            .limit
            .and_then(|l| u64::try_from(l).ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| AppError::BadRequest(PAGE_OUT_OF_RANGE.into()))?;
        Ok((page, limit, offset))
    }
}

pub fn total_pages(count: u64, limit: u64) -> u64 {
    count.div_ceil(limit.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_nine() {
        assert_eq!(Pagination::default().normalize().unwrap(), (1, 9, 0));
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(Pagination::new(3, 2).normalize().unwrap(), (3, 2, 4));
    }

    #[test]
    fn non_positive_values_fall_back_to_defaults() {
        assert_eq!(Pagination::new(0, 0).normalize().unwrap(), (1, 9, 0));
        assert_eq!(Pagination::new(-4, -1).normalize().unwrap(), (1, 9, 0));
    }

    #[test]
    fn limit_is_capped() {
        let (_, limit, _) = Pagination::new(1, 10_000).normalize().unwrap();
        assert_eq!(limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn offset_must_fit_a_sql_parameter() {
        let (_, _, offset) = Pagination::new(i64::MAX / 100, 100).normalize().unwrap();
        assert!(i64::try_from(offset).is_ok());

        match Pagination::new(i64::MAX, 100).normalize() {
            Err(AppError::BadRequest(message)) => assert_eq!(message, PAGE_OUT_OF_RANGE),
            other => panic!("expected bad request, got {other:?}"),
        }
        assert!(Pagination::new(i64::MAX, 1).normalize().is_ok());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 9), 0);
        assert_eq!(total_pages(3, 9), 1);
        assert_eq!(total_pages(3, 2), 2);
        assert_eq!(total_pages(4, 2), 2);
    }
}
