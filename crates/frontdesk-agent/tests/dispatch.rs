use frontdesk_agent::FunctionRegistry;
use frontdesk_knowledge::KnowledgeBase;
use frontdesk_store::{BusinessService, MockSizes, StoreOptions};
use frontdesk_types::{Appointment, AppointmentStatus, Customer, MockData, Service};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// Wednesday, mid-morning.
const NOW: &str = "2030-06-05T10:30:00";

fn customer(n: u32) -> Customer {
    Customer {
        id: format!("CUST{:04}", n),
        name: format!("Customer {}", n),
        phone: format!("+1555{:07}", n),
        email: format!("customer{}@example.com", n),
        joined_date: "2030-06-01T09:00:00".to_string(),
    }
}

fn fixture() -> MockData {
    MockData {
        customers: vec![customer(0), customer(1)],
        appointments: vec![Appointment {
            id: "APT0000".to_string(),
            customer_id: "CUST0000".to_string(),
            customer_name: "Customer 0".to_string(),
            date: "2030-06-10T10:00:00".to_string(),
            service: Service::Review,
            status: AppointmentStatus::Scheduled,
        }],
        orders: Vec::new(),
        sample_data: Vec::new(),
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    kb_dir: PathBuf,
    registry: FunctionRegistry,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let kb_dir = dir.path().join("mdx");
    let kb = KnowledgeBase::open(&kb_dir).unwrap();
    std::fs::write(
        kb_dir.join("company_overview.mdx"),
        "---\ntitle: Company Overview\ntopic: company\ntags: [about]\n---\n\nIndiVillage Tech Solutions is a social enterprise.",
    )
    .unwrap();
    std::fs::write(
        kb_dir.join("leadership_team.mdx"),
        "---\ntitle: Leadership Team\ntopic: leadership\ntags: [team]\n---\n\nMeet the people in charge.",
    )
    .unwrap();
    std::fs::write(
        kb_dir.join("image_annotation.mdx"),
        "---\ntitle: Image Annotation\ntopic: delivery\ntags: [vision]\n---\n\nPolygon labelling at scale.",
    )
    .unwrap();

    let now = frontdesk_store::parse_iso(NOW).unwrap();
    let options = StoreOptions {
        data_file: Some(dir.path().join("mock_data.json")),
        sizes: MockSizes::default(),
        delay: Duration::ZERO,
    };
    let store = BusinessService::new(fixture(), options).with_clock(Arc::new(move || now));

    Harness {
        _dir: dir,
        kb_dir,
        registry: FunctionRegistry::new(store, Some(kb)),
    }
}

async fn call(registry: &FunctionRegistry, name: &str, args: Value) -> Value {
    registry.call(name, &args.to_string()).await.response
}

#[tokio::test]
async fn unknown_function_is_reported() {
    let h = harness();
    let outcome = h.registry.call("launch_rockets", "{}").await;
    assert_eq!(outcome.response, json!({"error": "Unknown function: launch_rockets"}));
    assert!(!outcome.close);
}

#[tokio::test]
async fn invalid_argument_json_counts_as_empty() {
    let h = harness();
    let outcome = h.registry.call("get_orders", "{not json").await;
    assert_eq!(outcome.response, json!({"error": "customer_id is required"}));
}

#[tokio::test]
async fn find_customer_and_business_errors() {
    let h = harness();
    let found = call(&h.registry, "find_customer", json!({"phone": "+15550000001"})).await;
    assert_eq!(found["id"], "CUST0001");

    let missing = call(&h.registry, "find_customer", json!({"customer_id": "CUST9999"})).await;
    assert_eq!(missing, json!({"error": "Customer not found"}));

    let nothing = call(&h.registry, "find_customer", json!({})).await;
    assert_eq!(nothing, json!({"error": "No search criteria provided"}));
}

#[tokio::test]
async fn appointment_lookups_and_booking() {
    let h = harness();
    let listed = call(&h.registry, "get_appointments", json!({"customer_id": "CUST0000"})).await;
    assert_eq!(listed["appointments"].as_array().unwrap().len(), 1);

    let missing = call(&h.registry, "create_appointment", json!({"customer_id": "CUST0000"})).await;
    assert_eq!(missing, json!({"error": "customer_id, date, and service are required"}));

    let booked = call(
        &h.registry,
        "create_appointment",
        json!({"customer_id": "CUST0001", "date": "2030-06-11T14:00:00", "service": "Follow-up"}),
    )
    .await;
    assert_eq!(booked["service"], "Follow-up");
    assert_eq!(booked["status"], "Scheduled");

    let taken = call(
        &h.registry,
        "create_appointment",
        json!({"customer_id": "CUST0001", "date": "2030-06-11T14:00:00", "service": "Review"}),
    )
    .await;
    assert_eq!(
        taken,
        json!({"error": "This time slot is already booked. Please choose another time."})
    );
}

#[tokio::test]
async fn availability_defaults_to_one_week() {
    let h = harness();
    let missing = call(&h.registry, "check_availability", json!({})).await;
    assert_eq!(missing, json!({"error": "start_date is required"}));

    let slots = call(
        &h.registry,
        "check_availability",
        json!({"start_date": "2030-06-10T09:00:00"}),
    )
    .await;
    let slots: Vec<&str> = slots["available_slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert_eq!(slots.first(), Some(&"2030-06-10T09:00:00"));
    assert_eq!(slots.last(), Some(&"2030-06-17T09:00:00"));
    assert!(!slots.contains(&"2030-06-10T10:00:00"));
    assert!(!slots.iter().any(|s| s.starts_with("2030-06-15")));

    let bad = call(&h.registry, "check_availability", json!({"start_date": "soon"})).await;
    assert_eq!(
        bad,
        json!({"error": "Invalid date format. Please use ISO format (YYYY-MM-DDTHH:MM:SS)"})
    );
}

#[tokio::test]
async fn availability_near_the_calendar_limit_is_rejected() {
    let h = harness();
    let open_ended = call(
        &h.registry,
        "check_availability",
        json!({"start_date": "+262142-12-30T10:00:00"}),
    )
    .await;
    assert_eq!(
        open_ended,
        json!({"error": "Invalid date format. Please use ISO format (YYYY-MM-DDTHH:MM:SS)"})
    );

    let bounded = call(
        &h.registry,
        "check_availability",
        json!({"start_date": "+262142-12-30T10:00:00", "end_date": "+262142-12-31T23:00:00"}),
    )
    .await;
    assert!(bounded["available_slots"].is_array());
}

#[tokio::test]
async fn availability_search_is_capped() {
    let h = harness();
    let slots = call(
        &h.registry,
        "check_availability",
        json!({"start_date": "2030-06-10T09:00:00", "end_date": "9999-12-31T00:00:00"}),
    )
    .await;
    let slots = slots["available_slots"].as_array().unwrap();
    assert!(!slots.is_empty());
    let last = slots.last().unwrap().as_str().unwrap();
    assert!(last <= "2031-06-11T09:00:00", "walked past the cap: {}", last);
}

#[tokio::test]
async fn reschedule_cancel_and_status() {
    let h = harness();
    let missing = call(&h.registry, "reschedule_appointment", json!({"appointment_id": "APT0000"})).await;
    assert_eq!(
        missing,
        json!({"error": "appointment_id, new_date, and new_service are required"})
    );

    let moved = call(
        &h.registry,
        "reschedule_appointment",
        json!({"appointment_id": "APT0000", "new_date": "2030-06-12T15:00:00", "new_service": "Planning"}),
    )
    .await;
    assert_eq!(moved["appointment"]["date"], "2030-06-12T15:00:00");
    assert_eq!(moved["old_date"], "2030-06-10T10:00:00");

    assert_eq!(
        call(&h.registry, "cancel_appointment", json!({})).await,
        json!({"error": "appointment_id is required"})
    );
    let cancelled = call(&h.registry, "cancel_appointment", json!({"appointment_id": "APT0000"})).await;
    assert_eq!(cancelled["appointment"]["status"], "Cancelled");

    assert_eq!(
        call(&h.registry, "update_appointment_status", json!({"appointment_id": "APT0000"})).await,
        json!({"error": "appointment_id and new_status are required"})
    );
    let updated = call(
        &h.registry,
        "update_appointment_status",
        json!({"appointment_id": "APT0000", "new_status": "Completed"}),
    )
    .await;
    assert_eq!(updated["old_status"], "Cancelled");
    assert_eq!(updated["new_status"], "Completed");
}

#[tokio::test]
async fn create_customer_account_validates_then_persists() {
    let h = harness();
    let short = call(
        &h.registry,
        "create_customer_account",
        json!({"name": " J ", "phone": "+15551234567", "email": "j@example.com"}),
    )
    .await;
    assert_eq!(short, json!({"error": "Name must be at least 2 characters long"}));

    let created = call(
        &h.registry,
        "create_customer_account",
        json!({"name": "  Jane Doe ", "phone": " +15551234567", "email": "jane@example.com "}),
    )
    .await;
    assert_eq!(created["success"], true);
    assert_eq!(created["customer"]["id"], "CUST0002");
    assert_eq!(created["customer"]["name"], "Jane Doe");
    assert_eq!(created["customer"]["phone"], "+15551234567");

    let saved = std::fs::read_to_string(h._dir.path().join("mock_data.json")).unwrap();
    assert!(saved.contains("jane@example.com"));

    let duplicate = call(
        &h.registry,
        "create_customer_account",
        json!({"name": "Jane Again", "phone": "+15559999999", "email": "jane@example.com"}),
    )
    .await;
    assert_eq!(duplicate, json!({"error": "Customer already exists with this phone or email"}));
}

#[tokio::test]
async fn filler_and_farewell_control_the_session() {
    let h = harness();
    let filler = h.registry.call("agent_filler", r#"{"message_type":"lookup"}"#).await;
    assert_eq!(filler.response, json!({"status": "queued", "message_type": "lookup"}));
    assert_eq!(filler.inject.as_deref(), Some("Let me look that up for you..."));
    assert!(!filler.close);

    let farewell = h.registry.call("end_call", r#"{"farewell_type":"thanks"}"#).await;
    assert_eq!(
        farewell.response,
        json!({"status": "closing", "message": "Thank you for calling! Have a great day!"})
    );
    assert_eq!(
        farewell.inject.as_deref(),
        Some("Thank you for calling! Have a great day!")
    );
    assert!(farewell.close);

    let plain = h.registry.call("end_call", "{}").await;
    assert_eq!(plain.inject.as_deref(), Some("Goodbye! Have a nice day!"));
}

#[tokio::test]
async fn knowledge_base_search() {
    let h = harness();
    let hit = call(&h.registry, "search_knowledge_base", json!({"query": "Who is the CEO?"})).await;
    assert_eq!(hit["found"], true);
    assert_eq!(hit["title"], "Leadership Team");
    assert_eq!(hit["content"], "Meet the people in charge.");
    assert_eq!(hit["total_results"], 1);

    let miss = call(&h.registry, "search_knowledge_base", json!({"query": "zzzz"})).await;
    assert_eq!(miss, json!({"found": false, "message": "No information found for that query"}));

    let empty = call(&h.registry, "search_knowledge_base", json!({"query": ""})).await;
    assert_eq!(empty, json!({"error": "Search query is required"}));
}

#[tokio::test]
async fn knowledge_base_topics() {
    let h = harness();
    let topics = call(&h.registry, "get_knowledge_base_topics", json!({})).await;
    assert_eq!(
        topics,
        json!({"topics": ["company", "delivery", "leadership"], "total_topics": 3})
    );
}

#[tokio::test]
async fn knowledge_base_entry_by_topic_or_title() {
    let h = harness();
    assert_eq!(
        call(&h.registry, "get_knowledge_base_entry", json!({})).await,
        json!({"error": "Either topic or title is required"})
    );

    let by_title = call(
        &h.registry,
        "get_knowledge_base_entry",
        json!({"title": "  image ANNOTATION "}),
    )
    .await;
    assert_eq!(by_title["title"], "Image Annotation");
    assert!(by_title.get("total_results").is_none());

    let by_topic = call(&h.registry, "get_knowledge_base_entry", json!({"topic": "polygon"})).await;
    assert_eq!(by_topic["title"], "Image Annotation");

    let no_topic = call(&h.registry, "get_knowledge_base_entry", json!({"topic": "zzzz"})).await;
    assert_eq!(no_topic, json!({"found": false, "message": "No entries found for topic: zzzz"}));

    let no_title = call(&h.registry, "get_knowledge_base_entry", json!({"title": "zzzz"})).await;
    assert_eq!(no_title, json!({"found": false, "message": "No entries found for title: zzzz"}));

    for file in std::fs::read_dir(&h.kb_dir).unwrap() {
        std::fs::remove_file(file.unwrap().path()).unwrap();
    }
    let empty = call(&h.registry, "get_knowledge_base_entry", json!({"title": "Anything"})).await;
    assert_eq!(empty, json!({"found": false, "message": "Knowledge base is empty"}));
}

#[tokio::test]
async fn missing_knowledge_base_is_reported() {
    let h = harness();
    let registry = FunctionRegistry::new(h.registry.store().clone(), None);
    let result = call(&registry, "get_knowledge_base_topics", json!({})).await;
    assert_eq!(result, json!({"error": "Knowledge base not available"}));
}
