//! Per-month sale statistics.
//!
//! The statistics are derived views over the transactions sold in one calendar
//! month. They are computed on request and never stored:
//! - sale totals,
//! - a histogram over ten fixed price ranges,
//! - and the number of sales per category.

mod aggregation;
mod handlers;

pub use aggregation::{
    CategoryCount, PRICE_BUCKETS, PriceBucket, PriceRangeCount, SaleStatistics,
    category_breakdown, compute_sale_statistics, price_histogram,
};
pub use handlers::{
    CombinedData, get_bar_chart, get_combined_data, get_pie_chart, get_statistics,
};
