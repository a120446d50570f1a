mod health;
mod lead;
mod metrics;
mod scores;

pub use health::health_handler;
pub use lead::{lead_handler, lead_ping_handler};
pub use metrics::metrics_handler;
pub use scores::{submit_score_handler, top_scores_handler};
