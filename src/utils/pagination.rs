use serde::{Deserialize, Serialize};

/// limit 上限
pub const MAX_PAGE_LIMIT: u64 = 200;

/// offset / limit 分页窗口：limit 限定在 [1, 200]，offset 下限为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

impl PageWindow {
    pub fn new(limit: Option<i64>, offset: Option<i64>, default_limit: u64) -> Self {
        let limit = limit
            .unwrap_or(i64::try_from(default_limit).unwrap_or(i64::MAX))
            .clamp(1, MAX_PAGE_LIMIT as i64) as u64;
        let offset = offset.unwrap_or(0).max(0) as u64;
        Self { limit, offset }
    }
}
