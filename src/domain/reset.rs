//! Baseline row counts restored by the administrative reset.

/// Highest ids kept per table; rows above them are deleted by a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetBaseline {
    pub max_user_id: i64,
    pub max_product_id: i64,
    pub max_comment_id: i64,
    pub max_history_id: i64,
}

impl Default for ResetBaseline {
    fn default() -> Self {
        Self {
            max_user_id: 5_000,
            max_product_id: 10_000,
            max_comment_id: 200_000,
            max_history_id: 500_000,
        }
    }
}

/// Rows removed per table by a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub users: u64,
    pub products: u64,
    pub comments: u64,
    pub histories: u64,
}
