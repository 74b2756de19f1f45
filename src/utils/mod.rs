pub mod pagination;
pub mod weighted;

pub use pagination::{MAX_PAGE_LIMIT, PageWindow};
pub use weighted::{ThreadRngDraw, WeightDraw, Weighted, pick_weighted, total_weight};
