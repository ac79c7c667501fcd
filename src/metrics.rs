use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramVec, IntCounter, IntCounterVec, IntGauge, register_histogram,
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "tutor_requests_total",
        "Total number of callable requests",
        &["endpoint"]
    )
    .unwrap();
    pub static ref REQUEST_ERRORS: IntCounterVec = register_int_counter_vec!(
        "tutor_request_errors_total",
        "Callable requests that ended in an error, by error code",
        &["endpoint", "code"]
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: HistogramVec = register_histogram_vec!(
        "tutor_request_latency_seconds",
        "Callable request latency in seconds",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMITED: IntCounter =
        register_int_counter!("tutor_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref RATE_LIMIT_IDENTITIES: IntGauge = register_int_gauge!(
        "tutor_rate_limit_identities",
        "Identities currently tracked by the rate limiter"
    )
    .unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "tutor_upstream_latency_seconds",
        "Upstream generation call latency in seconds"
    )
    .unwrap();
    pub static ref NORMALIZER_OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "tutor_normalizer_outcomes_total",
        "Normalized upstream responses by outcome",
        &["outcome"]
    )
    .unwrap();
}
