//! Fixed partition of the product id space into catalog pages.
//!
//! Page 0 holds the newest products (ids 10000 down to 9951), page 199 the oldest (50 down to 1).

use std::ops::RangeInclusive;

pub const CATALOG_PAGE_SIZE: i64 = 50;
pub const CATALOG_PAGE_COUNT: u32 = 200;
pub const CATALOG_MAX_PRODUCT_ID: i64 = 10_000;

/// Inclusive id bounds of one catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogPage {
    pub index: u32,
    pub from: i64,
    pub to: i64,
}

impl CatalogPage {
    /// Returns the page at `index`, or `None` past the last page.
    pub fn new(index: u32) -> Option<Self> {
        if index >= CATALOG_PAGE_COUNT {
            return None;
        }
        let to = CATALOG_MAX_PRODUCT_ID - i64::from(index) * CATALOG_PAGE_SIZE;
        let from = to - CATALOG_PAGE_SIZE + 1;
        Some(Self { index, from, to })
    }

    pub fn ids(&self) -> RangeInclusive<i64> {
        self.from..=self.to
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids().contains(&id)
    }
}

/// All catalog pages, newest first.
pub fn catalog_pages() -> impl Iterator<Item = CatalogPage> {
    (0..CATALOG_PAGE_COUNT).filter_map(CatalogPage::new)
}
