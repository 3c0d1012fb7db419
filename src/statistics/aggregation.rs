//! Sale statistics computed from one month's transactions.
//!
//! Every function here is pure: it takes the transactions sold in the month
//! (see [crate::transaction::get_transactions_in_month]) and shapes them for
//! the statistics, bar chart and pie chart responses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Sale totals for a month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatistics {
    /// The sum of the prices of the items sold in the month.
    pub total_sale_amount: f64,
    /// The number of items sold in the month.
    pub total_sold_items: u64,
    /// The number of items that have not been sold, i.e. that have no sale date.
    ///
    /// An unsold item has no month, so this count is the same for every month.
    pub total_not_sold_items: u64,
}

/// The number of items sold in one price range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeCount {
    /// The label of the price range, e.g. "101-200".
    pub price_range: String,
    /// The number of items sold in the range.
    pub items_count: u64,
}

/// The number of items sold in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category label.
    pub category: String,
    /// The number of items sold in the category.
    pub items_count: u64,
}

/// A price range of the histogram.
///
/// Bounds are whole numbers and inclusive, with each range starting one above
/// the previous range's maximum. Fractional prices between two ranges, e.g.
/// 100.5, belong to the upper range, so the ranges cover every price with no
/// gaps or overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBucket {
    /// The smallest whole price in the range.
    pub min: u32,
    /// The largest price in the range, `None` for the open-ended top range.
    pub max: Option<u32>,
}

/// The fixed price ranges of the histogram, in ascending order.
pub const PRICE_BUCKETS: [PriceBucket; 10] = [
    PriceBucket::new(0, Some(100)),
    PriceBucket::new(101, Some(200)),
    PriceBucket::new(201, Some(300)),
    PriceBucket::new(301, Some(400)),
    PriceBucket::new(401, Some(500)),
    PriceBucket::new(501, Some(600)),
    PriceBucket::new(601, Some(700)),
    PriceBucket::new(701, Some(800)),
    PriceBucket::new(801, Some(900)),
    PriceBucket::new(901, None),
];

impl PriceBucket {
    const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// The label of the range, e.g. "101-200", or "901-∞" for the top range.
    pub fn label(&self) -> String {
        match self.max {
            Some(max) => format!("{}-{}", self.min, max),
            None => format!("{}-∞", self.min),
        }
    }

    /// Whether `price` falls in this range.
    ///
    /// The lowest range also takes negative prices.
    pub fn contains(&self, price: f64) -> bool {
        let above_min = self.min == 0 || price > f64::from(self.min - 1);
        let below_max = self.max.is_none_or(|max| price <= f64::from(max));

        above_min && below_max
    }
}

/// The index into [PRICE_BUCKETS] of the range `price` falls in.
///
/// Prices that are not a number are counted in the lowest range.
fn bucket_index(price: f64) -> usize {
    PRICE_BUCKETS
        .iter()
        .position(|bucket| bucket.contains(price))
        .unwrap_or(0)
}

/// Sum up the sales of a month.
///
/// `not_sold_count` is the number of transactions without a sale date, which
/// can never match a month filter and so is counted separately.
pub fn compute_sale_statistics(
    month_transactions: &[Transaction],
    not_sold_count: u64,
) -> SaleStatistics {
    SaleStatistics {
        total_sale_amount: month_transactions
            .iter()
            .map(|transaction| transaction.price)
            .sum(),
        total_sold_items: month_transactions.len() as u64,
        total_not_sold_items: not_sold_count,
    }
}

/// Count a month's sales in each of the [PRICE_BUCKETS].
///
/// Always returns one entry per price range in ascending order, ranges without
/// sales have a count of zero.
pub fn price_histogram(month_transactions: &[Transaction]) -> Vec<PriceRangeCount> {
    let mut counts = [0u64; PRICE_BUCKETS.len()];

    for transaction in month_transactions {
        counts[bucket_index(transaction.price)] += 1;
    }

    PRICE_BUCKETS
        .iter()
        .zip(counts)
        .map(|(bucket, items_count)| PriceRangeCount {
            price_range: bucket.label(),
            items_count,
        })
        .collect()
}

/// Count a month's sales per category.
///
/// Only categories with at least one sale in the month are listed, in the
/// order they are first seen in `month_transactions`.
pub fn category_breakdown(month_transactions: &[Transaction]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for transaction in month_transactions {
        match positions.get(transaction.category.as_str()) {
            Some(&position) => counts[position].items_count += 1,
            None => {
                positions.insert(&transaction.category, counts.len());
                counts.push(CategoryCount {
                    category: transaction.category.clone(),
                    items_count: 1,
                });
            }
        }
    }

    counts
}
