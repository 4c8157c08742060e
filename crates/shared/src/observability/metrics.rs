//! API 调用指标
//!
//! 基于 metrics crate 门面记录，未安装 recorder 时所有记录都是空操作。

/// API 请求总数
pub const API_REQUESTS_TOTAL: &str = "adconsole_api_requests_total";
/// API 请求耗时
pub const API_REQUEST_DURATION_SECONDS: &str = "adconsole_api_request_duration_seconds";

/// 注册指标描述
pub fn describe() {
    metrics::describe_counter!(API_REQUESTS_TOTAL, "Total number of backend API requests");
    metrics::describe_histogram!(
        API_REQUEST_DURATION_SECONDS,
        "Backend API request duration in seconds"
    );
}

/// 记录一次 API 请求
///
/// `outcome` 取值：ok / envelope_error / http_error / timeout / network_error / mock
#[inline]
pub fn record_api_request(method: &str, outcome: &str, duration_secs: f64) {
    metrics::counter!(
        API_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    metrics::histogram!(
        API_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .record(duration_secs);
}
