//! 1-indexed, fixed size pages over an id ordered listing.

use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("pages are numbered from 1")]
    ZeroPage,
    #[error("page size must be positive")]
    ZeroSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    per_page: u32,
}

impl Page {
    pub fn new(number: u32, per_page: u32) -> Result<Self, PageError> {
        if number == 0 {
            return Err(PageError::ZeroPage);
        }
        if per_page == 0 {
            return Err(PageError::ZeroSize);
        }
        Ok(Page { number, per_page })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.per_page)
    }

    pub fn total_pages(total: i64, per_page: u32) -> i64 {
        if total <= 0 {
            return 0;
        }
        let per_page = i64::from(per_page.max(1));
        (total + per_page - 1) / per_page
    }

    /// The first page always exists, even when it is empty.
    pub fn is_in_range(&self, total: i64) -> bool {
        self.number == 1 || i64::from(self.number) <= Self::total_pages(total, self.per_page)
    }
}
