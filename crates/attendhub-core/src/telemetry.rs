//! Counters recorded across the check-in pipeline.
//!
//! Recording is a no-op until a recorder is installed. The API process
//! installs a Prometheus recorder and serves it at `/metrics`.

use metrics::{Unit, counter, describe_counter};

/// Check-in submissions, labelled `outcome` = `accepted` | `deduplicated`.
pub const CHECKINS_TOTAL: &str = "attendhub_checkins_total";
/// Events persisted but never handed to the queue.
pub const PUBLISH_FAILURES_TOTAL: &str = "attendhub_queue_publish_failures_total";
/// Events finalized by the worker, labelled `status` = `processed` | `failed`.
pub const EVENTS_FINALIZED_TOTAL: &str = "attendhub_events_finalized_total";
/// Requests turned away by the rate limiter.
pub const RATE_LIMITED_TOTAL: &str = "attendhub_rate_limited_total";

/// Attach help text to every counter. Call once, after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(CHECKINS_TOTAL, Unit::Count, "Check-in submissions by outcome");
    describe_counter!(
        PUBLISH_FAILURES_TOTAL,
        Unit::Count,
        "Persisted events whose queue publish failed"
    );
    describe_counter!(
        EVENTS_FINALIZED_TOTAL,
        Unit::Count,
        "Events finalized by the worker, by terminal status"
    );
    describe_counter!(RATE_LIMITED_TOTAL, Unit::Count, "Requests rejected with 429");
}

/// Count a check-in that created an event (`created`) or hit the dedup window.
pub fn record_checkin(created: bool) {
    let outcome = if created { "accepted" } else { "deduplicated" };
    counter!(CHECKINS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_publish_failure() {
    counter!(PUBLISH_FAILURES_TOTAL).increment(1);
}

/// Count an event reaching terminal `status`.
pub fn record_event_finalized(status: &'static str) {
    counter!(EVENTS_FINALIZED_TOTAL, "status" => status).increment(1);
}

pub fn record_rate_limited() {
    counter!(RATE_LIMITED_TOTAL).increment(1);
}
