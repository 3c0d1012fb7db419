//! Route handlers for the statistics, bar chart, pie chart and combined data endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    month::SaleMonth,
    transaction::{
        Transaction, TransactionPage, TransactionsQuery, count_transactions_without_sale_date,
        get_transactions_in_month, list_transactions,
    },
};

use super::aggregation::{
    CategoryCount, PriceRangeCount, SaleStatistics, category_breakdown, compute_sale_statistics,
    price_histogram,
};

/// The state needed for the statistics endpoints.
#[derive(Debug, Clone)]
pub struct StatisticsState {
    /// The database connection for querying transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatisticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Everything the dashboard shows for a month, in one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedData {
    /// The first page of the month's transactions, or the page asked for.
    pub transactions: TransactionPage,
    /// The month's sale totals.
    pub statistics: SaleStatistics,
    /// The month's sales per price range.
    pub bar_chart: Vec<PriceRangeCount>,
    /// The month's sales per category.
    pub pie_chart: Vec<CategoryCount>,
}

/// Get the sale totals for a month.
pub async fn get_statistics(
    State(state): State<StatisticsState>,
    month: Result<Path<String>, PathRejection>,
) -> Result<Json<SaleStatistics>, Error> {
    let Path(month) = month?;
    let month: SaleMonth = month.parse()?;
    let connection = lock_connection(&state.db_connection)?;
    let month_transactions = load_month(month, &connection)?;

    load_statistics(&month_transactions, &connection).map(Json)
}

/// Get the number of sales in each price range for a month.
pub async fn get_bar_chart(
    State(state): State<StatisticsState>,
    month: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<PriceRangeCount>>, Error> {
    let Path(month) = month?;
    let month: SaleMonth = month.parse()?;
    let connection = lock_connection(&state.db_connection)?;
    let month_transactions = load_month(month, &connection)?;

    Ok(Json(price_histogram(&month_transactions)))
}

/// Get the number of sales per category for a month.
pub async fn get_pie_chart(
    State(state): State<StatisticsState>,
    month: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<CategoryCount>>, Error> {
    let Path(month) = month?;
    let month: SaleMonth = month.parse()?;
    let connection = lock_connection(&state.db_connection)?;
    let month_transactions = load_month(month, &connection)?;

    Ok(Json(category_breakdown(&month_transactions)))
}

/// Get the transaction listing, totals, histogram and category breakdown of a month.
///
/// The listing takes the same `page`, `perPage` and `search` query parameters
/// as the transactions endpoint, the month always comes from the path.
pub async fn get_combined_data(
    State(state): State<AppState>,
    month: Result<Path<String>, PathRejection>,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
) -> Result<Json<CombinedData>, Error> {
    let Path(month) = month?;
    let Query(query) = query?;
    let month: SaleMonth = month.parse()?;
    let query = TransactionsQuery {
        month: Some(month.as_query_value()),
        ..query
    };
    let connection = lock_connection(&state.db_connection)?;

    let transactions = list_transactions(&query, &state.pagination_config, &connection)?;
    let month_transactions = load_month(month, &connection)?;

    Ok(Json(CombinedData {
        transactions,
        statistics: load_statistics(&month_transactions, &connection)?,
        bar_chart: price_histogram(&month_transactions),
        pie_chart: category_breakdown(&month_transactions),
    }))
}

fn load_month(month: SaleMonth, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    get_transactions_in_month(month, connection).inspect_err(|error| {
        tracing::error!("could not get the transactions for month {month}: {error}")
    })
}

fn load_statistics(
    month_transactions: &[Transaction],
    connection: &Connection,
) -> Result<SaleStatistics, Error> {
    let not_sold_count = count_transactions_without_sale_date(connection)
        .inspect_err(|error| tracing::error!("could not count unsold transactions: {error}"))?;

    Ok(compute_sale_statistics(month_transactions, not_sold_count))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        AppState, build_router,
        endpoints::{self, format_endpoint},
        pagination::PaginationConfig,
        statistics::{CategoryCount, PriceRangeCount, SaleStatistics},
        transaction::{Transaction, create_transaction},
    };

    use super::CombinedData;

    const MARCH: Option<OffsetDateTime> = Some(datetime!(2022-03-10 08:00 UTC));
    const APRIL: Option<OffsetDateTime> = Some(datetime!(2022-04-10 08:00 UTC));

    fn get_test_server(setup: impl FnOnce(&Connection)) -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, PaginationConfig::default()).unwrap();
        setup(&state.db_connection.lock().unwrap());

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    fn insert(
        conn: &Connection,
        title: &str,
        price: f64,
        category: &str,
        date_of_sale: Option<OffsetDateTime>,
    ) {
        create_transaction(
            Transaction::build(title, price)
                .category(category)
                .date_of_sale(date_of_sale),
            conn,
        )
        .expect("Could not create transaction");
    }

    fn march_scenario(conn: &Connection) {
        insert(conn, "cheap", 50.0, "electronics", MARCH);
        insert(conn, "middling", 150.0, "jewelery", MARCH);
        insert(conn, "pricey", 999.0, "electronics", MARCH);
        insert(conn, "april", 450.0, "men's clothing", APRIL);
        insert(conn, "unsold", 20.0, "electronics", None);
    }

    fn counts(histogram: &[PriceRangeCount]) -> Vec<u64> {
        histogram.iter().map(|row| row.items_count).collect()
    }

    #[tokio::test]
    async fn statistics_for_month() {
        let server = get_test_server(march_scenario);

        let response = server.get(&format_endpoint(endpoints::STATISTICS, "03")).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<SaleStatistics>(),
            SaleStatistics {
                total_sale_amount: 1199.0,
                total_sold_items: 3,
                total_not_sold_items: 1,
            }
        );
    }

    #[tokio::test]
    async fn statistics_use_camel_case_fields() {
        let server = get_test_server(march_scenario);

        let response = server.get(&format_endpoint(endpoints::STATISTICS, "04")).await;

        assert_eq!(
            response.json::<Value>(),
            json!({
                "totalSaleAmount": 450.0,
                "totalSoldItems": 1,
                "totalNotSoldItems": 1
            })
        );
    }

    #[tokio::test]
    async fn bar_chart_for_month() {
        let server = get_test_server(march_scenario);

        let response = server.get(&format_endpoint(endpoints::BAR_CHART, "03")).await;

        response.assert_status_ok();
        let histogram = response.json::<Vec<PriceRangeCount>>();
        assert_eq!(counts(&histogram), vec![1, 1, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(histogram[9].price_range, "901-∞");
    }

    #[tokio::test]
    async fn pie_chart_lists_only_categories_in_month() {
        let server = get_test_server(march_scenario);

        let response = server.get(&format_endpoint(endpoints::PIE_CHART, "03")).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Vec<CategoryCount>>(),
            vec![
                CategoryCount {
                    category: "electronics".to_owned(),
                    items_count: 2,
                },
                CategoryCount {
                    category: "jewelery".to_owned(),
                    items_count: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_store_gives_zero_and_empty_results() {
        let server = get_test_server(|_| {});

        let statistics = server.get(&format_endpoint(endpoints::STATISTICS, "03")).await;
        let bar_chart = server.get(&format_endpoint(endpoints::BAR_CHART, "03")).await;
        let pie_chart = server.get(&format_endpoint(endpoints::PIE_CHART, "03")).await;
        let combined = server
            .get(&format_endpoint(endpoints::COMBINED_DATA, "03"))
            .await;

        statistics.assert_status_ok();
        assert_eq!(
            statistics.json::<SaleStatistics>(),
            SaleStatistics {
                total_sale_amount: 0.0,
                total_sold_items: 0,
                total_not_sold_items: 0,
            }
        );
        bar_chart.assert_status_ok();
        assert_eq!(counts(&bar_chart.json::<Vec<PriceRangeCount>>()), vec![0; 10]);
        pie_chart.assert_status_ok();
        assert!(pie_chart.json::<Vec<CategoryCount>>().is_empty());
        combined.assert_status_ok();
        assert!(combined.json::<CombinedData>().transactions.transactions.is_empty());
    }

    #[tokio::test]
    async fn month_without_sales_is_zero_filled() {
        let server = get_test_server(march_scenario);

        let bar_chart = server.get(&format_endpoint(endpoints::BAR_CHART, "12")).await;
        let pie_chart = server.get(&format_endpoint(endpoints::PIE_CHART, "12")).await;

        assert_eq!(counts(&bar_chart.json::<Vec<PriceRangeCount>>()), vec![0; 10]);
        assert!(pie_chart.json::<Vec<CategoryCount>>().is_empty());
    }

    #[tokio::test]
    async fn combined_data_merges_month_views() {
        let server = get_test_server(march_scenario);

        let response = server
            .get(&format_endpoint(endpoints::COMBINED_DATA, "03"))
            .await;

        response.assert_status_ok();
        let combined = response.json::<CombinedData>();
        let titles: Vec<_> = combined
            .transactions
            .transactions
            .iter()
            .map(|transaction| transaction.title.as_str())
            .collect();
        assert_eq!(titles, vec!["cheap", "middling", "pricey"]);
        assert_eq!(combined.transactions.pagination.total, 3);
        assert_eq!(combined.statistics.total_sale_amount, 1199.0);
        assert_eq!(counts(&combined.bar_chart), vec![1, 1, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(combined.pie_chart.len(), 2);
    }

    #[tokio::test]
    async fn combined_data_uses_path_month_and_listing_parameters() {
        let server = get_test_server(march_scenario);

        let response = server
            .get(&format_endpoint(endpoints::COMBINED_DATA, "03"))
            .add_query_param("month", "04")
            .add_query_param("search", "pricey")
            .add_query_param("perPage", 5)
            .await;

        response.assert_status_ok();
        let combined = response.json::<CombinedData>();
        assert_eq!(combined.transactions.pagination.total, 1);
        assert_eq!(combined.transactions.pagination.per_page, 5);
        assert_eq!(combined.transactions.transactions[0].title, "pricey");
        assert_eq!(combined.statistics.total_sold_items, 3);
    }

    #[tokio::test]
    async fn combined_data_has_expected_keys() {
        let server = get_test_server(march_scenario);

        let response = server
            .get(&format_endpoint(endpoints::COMBINED_DATA, "03"))
            .await;

        let body = response.json::<Value>();
        let mut keys: Vec<_> = body
            .as_object()
            .expect("combined data should be an object")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["barChart", "pieChart", "statistics", "transactions"]);
    }

    #[tokio::test]
    async fn invalid_month_gets_opaque_error() {
        let server = get_test_server(march_scenario);

        for endpoint in [
            endpoints::STATISTICS,
            endpoints::BAR_CHART,
            endpoints::PIE_CHART,
            endpoints::COMBINED_DATA,
        ] {
            for month in ["13", "3", "march"] {
                let response = server.get(&format_endpoint(endpoint, month)).await;

                response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(
                    response.json::<Value>(),
                    json!({ "error": "Internal Server Error" })
                );
            }
        }
    }

    #[tokio::test]
    async fn combined_data_with_repeated_parameter_gets_opaque_error() {
        let server = get_test_server(march_scenario);

        let response = server
            .get(&format!(
                "{}?perPage=5&perPage=6",
                format_endpoint(endpoints::COMBINED_DATA, "03")
            ))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "Internal Server Error" })
        );
    }
}
