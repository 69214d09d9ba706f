//! Prometheus metrics for the scraper.
//!
//! Exposes:
//! - `telegram_scraper_messages_total` (counter per channel)
//! - `telegram_scraper_photos_total` (counter per channel)
//! - `telegram_scraper_channels_total` (counter with status)
//! - `telegram_scraper_channel_duration_seconds` (histogram)
//! - process metrics via `process` collector

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram, register_int_counter_vec, Encoder, Histogram,
    IntCounterVec, TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::scraper::ChannelOutcome;

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

static MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "telegram_scraper_messages_total",
        "Messages written to the CSV",
        &["channel"]
    )
    .expect("failed to register messages counter")
});

static PHOTOS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "telegram_scraper_photos_total",
        "Photos downloaded",
        &["channel"]
    )
    .expect("failed to register photos counter")
});

static CHANNELS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "telegram_scraper_channels_total",
        "Channel passes by status",
        &["status"]
    )
    .expect("failed to register channels counter")
});

static CHANNEL_DURATION: Lazy<Histogram> = Lazy::new(|| {
    // Exponential buckets from 100ms up to ~1 hour.
    let buckets =
        prometheus::exponential_buckets(0.1, 2.0, 16).expect("failed to create histogram buckets");
    register_histogram!(
        "telegram_scraper_channel_duration_seconds",
        "Time spent on one channel in seconds",
        buckets
    )
    .expect("failed to register channel duration histogram")
});

/// Ensure collectors are registered.
fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&MESSAGES_TOTAL);
    Lazy::force(&PHOTOS_TOTAL);
    Lazy::force(&CHANNELS_TOTAL);
    Lazy::force(&CHANNEL_DURATION);
}

/// Record the outcome of one channel pass.
pub fn record_channel(channel: &str, outcome: &ChannelOutcome, duration: Duration) {
    init_collectors();
    MESSAGES_TOTAL
        .with_label_values(&[channel])
        .inc_by(outcome.messages() as u64);
    PHOTOS_TOTAL
        .with_label_values(&[channel])
        .inc_by(outcome.photos() as u64);
    CHANNELS_TOTAL
        .with_label_values(&[if outcome.is_skipped() { "skipped" } else { "scraped" }])
        .inc();
    CHANNEL_DURATION.observe(duration.as_secs_f64());
}

async fn metrics_response() -> Result<Response<Full<Bytes>>, Infallible> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    let response = if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", err);
        let mut response = Response::new(Full::from("encode error"));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    } else {
        let mut response = Response::new(Full::from(buffer));
        if let Ok(value) = encoder.format_type().parse() {
            response
                .headers_mut()
                .insert(hyper::header::CONTENT_TYPE, value);
        }
        response
    };

    Ok(response)
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    match req.uri().path() {
        "/metrics" => metrics_response().await,
        _ => {
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::NOT_FOUND;
            Ok(response)
        }
    }
}

async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Prometheus metrics endpoint started");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service_fn(handle_request);
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "Metrics connection error: {}", err);
            }
        });
    }
}

/// Spawn the metrics HTTP endpoint on the given address.
pub fn spawn_metrics_server(addr: SocketAddr) {
    init_collectors();
    tokio::spawn(async move {
        if let Err(err) = serve(addr).await {
            error!(%addr, "Metrics server failed: {}", err);
        }
    });
}
