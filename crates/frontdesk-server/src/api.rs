//! HTTP handlers for the control page and its JSON endpoints.

use crate::AppState;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use frontdesk_agent::settings;
use frontdesk_types::SampleCustomer;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;
use thiserror::Error;

const INDEX_TEMPLATE: &str = include_str!("../assets/index.html");
const SAMPLE_DATA_MARKER: &str = "<!-- SAMPLE_DATA -->";

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("DEEPGRAM_API_KEY not set")]
    MissingApiKey,
    #[error("{0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingApiKey | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /`.
///
/// Picks up external edits to the data file before rendering so the sample
/// table matches what the agent will see.
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let store = state.registry.store();
    if let Err(e) = store.sync_with_disk().await {
        tracing::warn!(error = %e, "failed to sync mock data before rendering index");
    }
    let samples = store.sample_data().await;
    Html(render_index(&samples))
}

/// Handler for `GET /industries`.
pub async fn industries_handler() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(frontdesk_agent::available_industries())
}

/// Handler for `GET /tts-models`.
pub async fn tts_models_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let api_key = state.agent.api_key().ok_or(ApiError::MissingApiKey)?;
    let models =
        frontdesk_agent::list_tts_models(&state.http, &state.agent.models_url, api_key)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to list tts models");
                ApiError::Upstream(format!("Failed to fetch TTS models: {}", e))
            })?;
    Ok(Json(json!({ "models": models })))
}

/// Handler for `GET /audio-devices`.
///
/// Audio is captured and played in the browser, so the server has no
/// devices to offer.
pub async fn audio_devices_handler() -> Json<Value> {
    Json(json!({ "devices": [] }))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_samples(samples: &[SampleCustomer]) -> String {
    if samples.is_empty() {
        return "<p class=\"empty\">No sample customers available.</p>".to_string();
    }

    let mut html = String::new();
    for sample in samples {
        let _ = write!(
            html,
            "<div class=\"customer\"><h3>{}</h3><dl><dt>ID</dt><dd>{}</dd><dt>Phone</dt><dd>{}</dd><dt>Email</dt><dd>{}</dd></dl>",
            escape(&sample.customer),
            escape(&sample.id),
            escape(&sample.phone),
            escape(&sample.email),
        );

        html.push_str("<h4>Appointments</h4>");
        if sample.appointments.is_empty() {
            html.push_str("<p class=\"empty\">None</p>");
        } else {
            html.push_str("<table><tr><th>Service</th><th>Date</th><th>Status</th></tr>");
            for appointment in &sample.appointments {
                let _ = write!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape(appointment.service.as_str()),
                    escape(&appointment.date),
                    appointment.status,
                );
            }
            html.push_str("</table>");
        }

        html.push_str("<h4>Orders</h4>");
        if sample.orders.is_empty() {
            html.push_str("<p class=\"empty\">None</p>");
        } else {
            html.push_str(
                "<table><tr><th>ID</th><th>Total</th><th>Status</th><th>Date</th><th># Items</th></tr>",
            );
            for order in &sample.orders {
                let _ = write!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape(&order.id),
                    escape(&order.total),
                    order.status,
                    escape(&order.date),
                    order.items,
                );
            }
            html.push_str("</table>");
        }
        html.push_str("</div>");
    }
    html
}

/// Renders the control page with the sample customer table filled in.
pub fn render_index(samples: &[SampleCustomer]) -> String {
    INDEX_TEMPLATE
        .replace(SAMPLE_DATA_MARKER, &render_samples(samples))
        .replace("{{USER_SAMPLE_RATE}}", &settings::USER_AUDIO_SAMPLE_RATE.to_string())
        .replace(
            "{{USER_SAMPLES_PER_CHUNK}}",
            &settings::USER_AUDIO_SAMPLES_PER_CHUNK.to_string(),
        )
        .replace("{{AGENT_SAMPLE_RATE}}", &settings::AGENT_AUDIO_SAMPLE_RATE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_types::{AppointmentStatus, OrderStatus, SampleAppointment, SampleOrder, Service};

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn index_lists_sample_customers() {
        let samples = vec![SampleCustomer {
            customer: "Customer <0>".to_string(),
            id: "CUST0000".to_string(),
            phone: "+15550000000".to_string(),
            email: "customer0@example.com".to_string(),
            appointments: vec![SampleAppointment {
                service: Service::FollowUp,
                date: "2030-06-06".to_string(),
                status: AppointmentStatus::Scheduled,
            }],
            orders: vec![SampleOrder {
                id: "ORD0001".to_string(),
                total: "$42.5".to_string(),
                status: OrderStatus::Shipped,
                date: "2030-06-01".to_string(),
                items: 3,
            }],
        }];

        let page = render_index(&samples);
        assert!(page.contains("Voice Agent Debugger"));
        assert!(page.contains("Sample Customer Data"));
        assert!(page.contains("Customer &lt;0&gt;"));
        assert!(page.contains("<td>Follow-up</td><td>2030-06-06</td><td>Scheduled</td>"));
        assert!(page.contains("<td>ORD0001</td><td>$42.5</td><td>Shipped</td>"));
        assert!(!page.contains(SAMPLE_DATA_MARKER));
    }

    #[test]
    fn index_audio_formats_match_agent_settings() {
        let page = render_index(&[]);
        assert!(page.contains("const USER_SAMPLE_RATE = 48000;"));
        assert!(page.contains("const USER_SAMPLES_PER_CHUNK = 2400;"));
        assert!(page.contains("const AGENT_SAMPLE_RATE = 16000;"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn empty_samples_render_placeholder() {
        assert!(render_index(&[]).contains("No sample customers available."));
    }
}
