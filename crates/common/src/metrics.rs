use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static IMAGES_STORED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "credenciamento_images_stored_total",
        "Total specialty images written to the image store"
    )
    .expect("register images_stored_total")
});

pub static IMAGE_COLLISIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "credenciamento_image_collisions_total",
        "Total uploads rejected because the generated name already existed"
    )
    .expect("register image_collisions_total")
});

pub static VALIDATION_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "credenciamento_validation_failures_total",
        "Total operations rejected with business-rule notifications",
        &["operation"]
    )
    .expect("register validation_failures_total")
});

pub static ORPHANS_REMOVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "credenciamento_orphan_images_removed_total",
        "Total unreferenced image files removed by the sweep"
    )
    .expect("register orphan_images_removed_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
