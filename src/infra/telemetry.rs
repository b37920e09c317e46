use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "atrium_content_cache_hit_total",
            Unit::Count,
            "Total number of content store hits, labelled by kind."
        );
        describe_counter!(
            "atrium_content_cache_miss_total",
            Unit::Count,
            "Total number of content store misses, labelled by kind."
        );
        describe_counter!(
            "atrium_content_fallback_total",
            Unit::Count,
            "Total number of resolutions that served the default configuration."
        );
        describe_counter!(
            "atrium_content_fetch_retry_total",
            Unit::Count,
            "Total number of content fetch retries after a transient failure."
        );
        describe_counter!(
            "atrium_response_cache_hit_total",
            Unit::Count,
            "Total number of public response-cache hits."
        );
        describe_counter!(
            "atrium_response_cache_miss_total",
            Unit::Count,
            "Total number of public response-cache misses."
        );
        describe_counter!(
            "atrium_revalidate_total",
            Unit::Count,
            "Total number of tag revalidations, labelled by kind and source."
        );
    });
}
