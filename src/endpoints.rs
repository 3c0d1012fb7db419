//! The API endpoints URIs.
//!
//! Endpoints that take a month parameter, e.g., '/statistics/{month}', expect a
//! two-digit month such as "03".

/// The route for listing transactions with search and pagination.
pub const TRANSACTIONS: &str = "/transactions";
/// The route for the sale totals of a month.
pub const STATISTICS: &str = "/statistics/{month}";
/// The route for the price range histogram of a month.
pub const BAR_CHART: &str = "/bar-chart/{month}";
/// The route for the category breakdown of a month.
pub const PIE_CHART: &str = "/pie-chart/{month}";
/// The route for the listing, totals, histogram and categories of a month in one response.
pub const COMBINED_DATA: &str = "/combined-data/{month}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/statistics/{month}', '{month}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, value: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
