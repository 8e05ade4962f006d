//! Runs the functions the agent calls and shapes their results.
//!
//! Every call produces a JSON response for `FunctionCallResponse`. Failures
//! are reported in-band as `{"error": "..."}` so the agent can tell the
//! caller what went wrong.

use frontdesk_knowledge::{KnowledgeBase, KnowledgeEntry, KnowledgeError};
use frontdesk_store::{format_iso, parse_iso, BusinessError, BusinessService, CustomerLookup};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt::Display;

/// Names accepted by [`FunctionRegistry::call`].
pub const FUNCTION_NAMES: &[&str] = &[
    "agent_filler",
    "find_customer",
    "get_appointments",
    "get_orders",
    "create_appointment",
    "check_availability",
    "end_call",
    "search_knowledge_base",
    "get_knowledge_base_topics",
    "get_knowledge_base_entry",
    "create_customer_account",
    "reschedule_appointment",
    "cancel_appointment",
    "update_appointment_status",
];

/// Result of one function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionOutcome {
    /// Sent back as the `FunctionCallResponse` content.
    pub response: Value,
    /// Text for the agent to speak via `InjectAgentMessage`.
    pub inject: Option<String>,
    /// Set when the session should end after this call.
    pub close: bool,
}

impl FunctionOutcome {
    fn respond(response: Value) -> Self {
        Self {
            response,
            inject: None,
            close: false,
        }
    }

    fn error(message: impl Display) -> Self {
        Self::respond(json!({ "error": message.to_string() }))
    }

    fn from_result<T: Serialize>(result: Result<T, BusinessError>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(value) => Self::respond(value),
                Err(e) => Self::error(e),
            },
            Err(e) => Self::error(e),
        }
    }

    pub fn is_error(&self) -> bool {
        self.response.get("error").is_some()
    }
}

type Args = Map<String, Value>;

/// Arguments arrive as a JSON-encoded object. Anything else counts as no
/// arguments.
fn parse_arguments(arguments: &str) -> Args {
    match serde_json::from_str(arguments) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// A non-empty string argument.
fn arg<'a>(args: &'a Args, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// A string argument, trimmed. Missing or non-string values are empty.
fn trimmed<'a>(args: &'a Args, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default().trim()
}

fn filler_message(message_type: &str) -> &'static str {
    match message_type {
        "lookup" => "Let me look that up for you...",
        _ => "One moment please...",
    }
}

fn farewell_message(farewell_type: &str) -> &'static str {
    match farewell_type {
        "thanks" => "Thank you for calling! Have a great day!",
        "help" => "I'm glad I could help! Have a wonderful day!",
        _ => "Goodbye! Have a nice day!",
    }
}

fn entry_json(entry: &KnowledgeEntry) -> Value {
    json!({
        "found": true,
        "title": entry.title,
        "topic": entry.topic,
        "content": entry.content_raw,
        "tags": entry.tags,
    })
}

fn not_found(message: impl Into<String>) -> Value {
    json!({ "found": false, "message": message.into() })
}

/// Checks the fields of a new account before it reaches the store.
fn validate_new_customer(name: &str, phone: &str, email: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Customer name is required");
    }
    if phone.is_empty() {
        return Err("Phone number is required");
    }
    if email.is_empty() {
        return Err("Email address is required");
    }
    if name.chars().count() < 2 {
        return Err("Name must be at least 2 characters long");
    }
    if !phone.starts_with('+') || phone.chars().count() < 10 {
        return Err("Phone number must be in international format (e.g., +15551234567)");
    }
    if !email.contains('@') || !email.contains('.') {
        return Err("Please provide a valid email address");
    }
    Ok(())
}

/// Dispatches agent function calls to the store and the knowledge base.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    store: BusinessService,
    kb: Option<KnowledgeBase>,
}

impl FunctionRegistry {
    /// `kb` is `None` when the knowledge base could not be opened; its
    /// functions then report that it is unavailable.
    pub fn new(store: BusinessService, kb: Option<KnowledgeBase>) -> Self {
        Self { store, kb }
    }

    pub fn store(&self) -> &BusinessService {
        &self.store
    }

    pub fn knowledge_base(&self) -> Option<&KnowledgeBase> {
        self.kb.as_ref()
    }

    /// Runs function `name` with its JSON-encoded `arguments`.
    pub async fn call(&self, name: &str, arguments: &str) -> FunctionOutcome {
        let args = parse_arguments(arguments);

        let outcome = match name {
            "agent_filler" => self.agent_filler(&args),
            "end_call" => self.end_call(&args),
            "find_customer" => self.find_customer(&args).await,
            "get_appointments" => self.get_appointments(&args).await,
            "get_orders" => self.get_orders(&args).await,
            "create_appointment" => self.create_appointment(&args).await,
            "check_availability" => self.check_availability(&args).await,
            "reschedule_appointment" => self.reschedule_appointment(&args).await,
            "cancel_appointment" => self.cancel_appointment(&args).await,
            "update_appointment_status" => self.update_appointment_status(&args).await,
            "create_customer_account" => self.create_customer_account(&args).await,
            "search_knowledge_base" => self.search_knowledge_base(&args).await,
            "get_knowledge_base_topics" => self.get_knowledge_base_topics().await,
            "get_knowledge_base_entry" => self.get_knowledge_base_entry(&args).await,
            _ => FunctionOutcome::error(format!("Unknown function: {}", name)),
        };

        if outcome.is_error() {
            tracing::warn!(function = name, response = %outcome.response, "function call failed");
        } else {
            tracing::info!(function = name, "function call handled");
        }
        outcome
    }

    fn agent_filler(&self, args: &Args) -> FunctionOutcome {
        let message_type = arg(args, "message_type").unwrap_or("general");
        FunctionOutcome {
            response: json!({ "status": "queued", "message_type": message_type }),
            inject: Some(filler_message(message_type).to_string()),
            close: false,
        }
    }

    fn end_call(&self, args: &Args) -> FunctionOutcome {
        let message = farewell_message(arg(args, "farewell_type").unwrap_or("general"));
        FunctionOutcome {
            response: json!({ "status": "closing", "message": message }),
            inject: Some(message.to_string()),
            close: true,
        }
    }

    async fn find_customer(&self, args: &Args) -> FunctionOutcome {
        let lookup = CustomerLookup {
            phone: arg(args, "phone").map(str::to_string),
            email: arg(args, "email").map(str::to_string),
            customer_id: arg(args, "customer_id").map(str::to_string),
        };
        FunctionOutcome::from_result(self.store.get_customer(&lookup).await)
    }

    async fn get_appointments(&self, args: &Args) -> FunctionOutcome {
        let Some(customer_id) = arg(args, "customer_id") else {
            return FunctionOutcome::error("customer_id is required");
        };
        FunctionOutcome::from_result(Ok(self.store.get_customer_appointments(customer_id).await))
    }

    async fn get_orders(&self, args: &Args) -> FunctionOutcome {
        let Some(customer_id) = arg(args, "customer_id") else {
            return FunctionOutcome::error("customer_id is required");
        };
        FunctionOutcome::from_result(Ok(self.store.get_customer_orders(customer_id).await))
    }

    async fn create_appointment(&self, args: &Args) -> FunctionOutcome {
        let (Some(customer_id), Some(date), Some(service)) = (
            arg(args, "customer_id"),
            arg(args, "date"),
            arg(args, "service"),
        ) else {
            return FunctionOutcome::error("customer_id, date, and service are required");
        };
        FunctionOutcome::from_result(
            self.store
                .schedule_appointment(customer_id, date, service)
                .await,
        )
    }

    async fn check_availability(&self, args: &Args) -> FunctionOutcome {
        let Some(start_date) = arg(args, "start_date") else {
            return FunctionOutcome::error("start_date is required");
        };
        let end_date = match arg(args, "end_date") {
            Some(end) => end.to_string(),
            // An unparseable start is rejected by the store.
            None => match parse_iso(start_date) {
                Some(start) => match start.checked_add_signed(chrono::Duration::days(7)) {
                    Some(end) => format_iso(end),
                    None => return FunctionOutcome::error(BusinessError::InvalidDateFormat),
                },
                None => start_date.to_string(),
            },
        };
        FunctionOutcome::from_result(self.store.get_available_slots(start_date, &end_date).await)
    }

    async fn reschedule_appointment(&self, args: &Args) -> FunctionOutcome {
        let (Some(appointment_id), Some(new_date), Some(new_service)) = (
            arg(args, "appointment_id"),
            arg(args, "new_date"),
            arg(args, "new_service"),
        ) else {
            return FunctionOutcome::error(
                "appointment_id, new_date, and new_service are required",
            );
        };
        FunctionOutcome::from_result(
            self.store
                .reschedule_appointment(appointment_id, new_date, new_service)
                .await,
        )
    }

    async fn cancel_appointment(&self, args: &Args) -> FunctionOutcome {
        let Some(appointment_id) = arg(args, "appointment_id") else {
            return FunctionOutcome::error("appointment_id is required");
        };
        FunctionOutcome::from_result(self.store.cancel_appointment(appointment_id).await)
    }

    async fn update_appointment_status(&self, args: &Args) -> FunctionOutcome {
        let (Some(appointment_id), Some(new_status)) =
            (arg(args, "appointment_id"), arg(args, "new_status"))
        else {
            return FunctionOutcome::error("appointment_id and new_status are required");
        };
        FunctionOutcome::from_result(
            self.store
                .update_appointment_status(appointment_id, new_status)
                .await,
        )
    }

    async fn create_customer_account(&self, args: &Args) -> FunctionOutcome {
        let name = trimmed(args, "name");
        let phone = trimmed(args, "phone");
        let email = trimmed(args, "email");

        if let Err(message) = validate_new_customer(name, phone, email) {
            return FunctionOutcome::error(message);
        }
        FunctionOutcome::from_result(self.store.create_customer(name, phone, email).await)
    }

    async fn search_knowledge_base(&self, args: &Args) -> FunctionOutcome {
        let Some(query) = arg(args, "query").map(str::to_string) else {
            return FunctionOutcome::error("Search query is required");
        };
        self.with_knowledge_base("Error searching knowledge base", move |kb| {
            let hits = kb.search(&query)?;
            Ok(match hits.first() {
                Some(best) => {
                    let mut result = entry_json(best);
                    result["total_results"] = json!(hits.len());
                    result
                }
                None => not_found("No information found for that query"),
            })
        })
        .await
    }

    async fn get_knowledge_base_topics(&self) -> FunctionOutcome {
        self.with_knowledge_base("Error getting topics", |kb| {
            let topics = kb.topics()?;
            Ok(json!({ "total_topics": topics.len(), "topics": topics }))
        })
        .await
    }

    async fn get_knowledge_base_entry(&self, args: &Args) -> FunctionOutcome {
        let topic = arg(args, "topic").map(str::to_string);
        let title = arg(args, "title").map(str::to_string);

        match (topic, title) {
            (Some(topic), _) => {
                self.with_knowledge_base("Error getting entry", move |kb| {
                    Ok(match kb.search(&topic)?.first() {
                        Some(entry) => entry_json(entry),
                        None => not_found(format!("No entries found for topic: {}", topic)),
                    })
                })
                .await
            }
            (None, Some(title)) => {
                self.with_knowledge_base("Error getting entry", move |kb| {
                    let entries = kb.read_all()?;
                    if entries.is_empty() {
                        return Ok(not_found("Knowledge base is empty"));
                    }
                    let wanted = title.trim().to_lowercase();
                    if let Some(entry) = entries
                        .iter()
                        .find(|entry| entry.title.trim().to_lowercase() == wanted)
                    {
                        return Ok(entry_json(entry));
                    }
                    Ok(match kb.search(&title)?.first() {
                        Some(entry) => entry_json(entry),
                        None => not_found(format!("No entries found for title: {}", title)),
                    })
                })
                .await
            }
            (None, None) => FunctionOutcome::error("Either topic or title is required"),
        }
    }

    /// Runs a knowledge base query on the blocking pool.
    async fn with_knowledge_base<F>(&self, context: &str, query: F) -> FunctionOutcome
    where
        F: FnOnce(&KnowledgeBase) -> Result<Value, KnowledgeError> + Send + 'static,
    {
        let Some(kb) = self.kb.clone() else {
            return FunctionOutcome::error("Knowledge base not available");
        };
        match tokio::task::spawn_blocking(move || query(&kb)).await {
            Ok(Ok(value)) => FunctionOutcome::respond(value),
            Ok(Err(e)) => FunctionOutcome::error(format!("{}: {}", context, e)),
            Err(e) => FunctionOutcome::error(format!("{}: {}", context, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_arguments_become_empty() {
        assert!(parse_arguments("not json").is_empty());
        assert!(parse_arguments("[1, 2]").is_empty());
        assert!(parse_arguments("").is_empty());
        assert_eq!(parse_arguments(r#"{"a": "b"}"#)["a"], "b");
    }

    #[test]
    fn empty_and_non_string_arguments_are_missing() {
        let args = parse_arguments(r#"{"empty": "", "number": 42, "ok": "x"}"#);
        assert_eq!(arg(&args, "empty"), None);
        assert_eq!(arg(&args, "number"), None);
        assert_eq!(arg(&args, "absent"), None);
        assert_eq!(arg(&args, "ok"), Some("x"));
    }

    #[test]
    fn new_customer_rules_apply_in_order() {
        assert_eq!(
            validate_new_customer("", "", ""),
            Err("Customer name is required")
        );
        assert_eq!(
            validate_new_customer("A", "", "a@b.co"),
            Err("Phone number is required")
        );
        assert_eq!(
            validate_new_customer("A", "+15551234567", "a@b.co"),
            Err("Name must be at least 2 characters long")
        );
        assert_eq!(
            validate_new_customer("Al", "5551234567", "a@b.co"),
            Err("Phone number must be in international format (e.g., +15551234567)")
        );
        assert_eq!(
            validate_new_customer("Al", "+1555", "a@b.co"),
            Err("Phone number must be in international format (e.g., +15551234567)")
        );
        assert_eq!(
            validate_new_customer("Al", "+15551234567", "ab.co"),
            Err("Please provide a valid email address")
        );
        assert_eq!(validate_new_customer("Al", "+15551234567", "a@b.co"), Ok(()));
    }

    #[test]
    fn farewell_and_filler_text() {
        assert_eq!(farewell_message("thanks"), "Thank you for calling! Have a great day!");
        assert_eq!(farewell_message("help"), "I'm glad I could help! Have a wonderful day!");
        assert_eq!(farewell_message("whatever"), "Goodbye! Have a nice day!");
        assert_eq!(filler_message("lookup"), "Let me look that up for you...");
        assert_eq!(filler_message("general"), "One moment please...");
    }
}
