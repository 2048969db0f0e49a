pub mod metrics;

pub use metrics::{track_latency, HttpMetrics};
