//! HTTP intake for monitoring requests.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::{
    base::{config::MAX_REMINDER_INTERVAL_MINUTES, types::MonitorRequestPayload},
    interaction::monitor,
    prelude::*,
};

/// Builds the intake router.
pub fn router(runtime: Runtime) -> Router {
    Router::new().route("/message", post(handle_message)).route("/health", get(handle_health)).with_state(runtime)
}

/// Resolves a decoded payload into a request, filling in the default interval
/// and capping oversized ones.
pub fn accept(payload: MonitorRequestPayload, default_interval: u64) -> MonitorRequest {
    let reminder_interval_minutes = match payload.reminder_intervals {
        None => {
            debug!("No interval set in latest message, using default from config: {}", default_interval);
            default_interval
        }
        Some(0) => {
            warn!("Ignoring zero reminder interval, using default from config: {}", default_interval);
            default_interval
        }
        Some(minutes) if minutes > MAX_REMINDER_INTERVAL_MINUTES => {
            warn!("Capping reminder interval of {} minutes to {}", minutes, MAX_REMINDER_INTERVAL_MINUTES);
            MAX_REMINDER_INTERVAL_MINUTES
        }
        Some(minutes) => minutes,
    };

    MonitorRequest {
        channel: payload.channel,
        mentions: payload.mentions.unwrap_or_default(),
        message: payload.message,
        reminder_interval_minutes,
    }
}

/// Accepts a monitoring request and starts its loop without waiting on it.
#[instrument(skip_all)]
async fn handle_message(State(runtime): State<Runtime>, body: Bytes) -> StatusCode {
    let payload = match serde_json::from_slice::<MonitorRequestPayload>(&body) {
        Ok(payload) => payload,
        Err(err) => {
            error!("Error decoding JSON: {}", err);
            return StatusCode::BAD_REQUEST;
        }
    };

    let request = accept(payload, runtime.config.reviewing_interval);

    info!(
        "Received message: {}, Channel: {}, Mentions: {:?}, Reminder Intervals: {}",
        request.message, request.channel, request.mentions, request.reminder_interval_minutes
    );

    let id = monitor::spawn_session(&runtime, request);
    debug!(session = %id, "Monitoring started");

    StatusCode::OK
}

async fn handle_health(State(runtime): State<Runtime>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": runtime.sessions.len(),
    }))
}
