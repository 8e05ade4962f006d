//! JSON-schema definitions of the functions the agent may call.

use serde_json::{json, Value};

const SERVICES: [&str; 4] = ["Consultation", "Follow-up", "Review", "Planning"];
const STATUSES: [&str; 3] = ["Scheduled", "Completed", "Cancelled"];

/// All function definitions, sent as `agent.think.functions`.
pub fn function_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "agent_filler",
            "description": "Say a short filler line before looking something up. Call this with message_type 'lookup' right before any lookup function, then call the lookup immediately.",
            "parameters": {
                "type": "object",
                "properties": {
                    "message_type": {
                        "type": "string",
                        "description": "'lookup' when about to fetch information, otherwise 'general'.",
                        "enum": ["lookup", "general"]
                    }
                },
                "required": ["message_type"]
            }
        }),
        json!({
            "name": "find_customer",
            "description": "Look up a customer account by ID, phone number or email. Normalise what the caller says: a bare number like '42' becomes 'CUST0042'; spoken or dashed phone numbers become '+1XXXXXXXXXX'; 'john dot smith at example dot com' becomes 'john.smith@example.com'.",
            "parameters": {
                "type": "object",
                "properties": {
                    "customer_id": {
                        "type": "string",
                        "description": "Customer ID as CUST followed by four digits, e.g. 'CUST0042'."
                    },
                    "phone": {
                        "type": "string",
                        "description": "Phone number with country code and no separators, e.g. '+15551234567'. Add +1 when no country code was given."
                    },
                    "email": {
                        "type": "string",
                        "description": "Email address with spoken 'dot' and 'at' converted and spaces removed."
                    }
                }
            }
        }),
        json!({
            "name": "get_appointments",
            "description": "List a customer's appointments. Use when the caller asks about upcoming or past appointments. Find the customer first.",
            "parameters": {
                "type": "object",
                "properties": {
                    "customer_id": {
                        "type": "string",
                        "description": "Customer ID returned by find_customer."
                    }
                },
                "required": ["customer_id"]
            }
        }),
        json!({
            "name": "get_orders",
            "description": "List a customer's orders. Use when the caller asks what they ordered or where an order is. Find the customer first.",
            "parameters": {
                "type": "object",
                "properties": {
                    "customer_id": {
                        "type": "string",
                        "description": "Customer ID returned by find_customer."
                    }
                },
                "required": ["customer_id"]
            }
        }),
        json!({
            "name": "create_appointment",
            "description": "Book a new appointment. Before booking, find the customer, check availability and confirm the time and service with the caller.",
            "parameters": {
                "type": "object",
                "properties": {
                    "customer_id": {
                        "type": "string",
                        "description": "Customer ID returned by find_customer."
                    },
                    "date": {
                        "type": "string",
                        "description": "Start time in ISO format (YYYY-MM-DDTHH:MM:SS), taken from an available slot."
                    },
                    "service": {
                        "type": "string",
                        "description": "Service to book.",
                        "enum": SERVICES
                    }
                },
                "required": ["customer_id", "date", "service"]
            }
        }),
        json!({
            "name": "check_availability",
            "description": "Find open appointment slots between two dates. Offer the caller two or three of them in a natural sentence.",
            "parameters": {
                "type": "object",
                "properties": {
                    "start_date": {
                        "type": "string",
                        "description": "Range start in ISO format (YYYY-MM-DDTHH:MM:SS), usually now."
                    },
                    "end_date": {
                        "type": "string",
                        "description": "Range end in ISO format. Defaults to seven days after start_date."
                    }
                },
                "required": ["start_date"]
            }
        }),
        json!({
            "name": "end_call",
            "description": "Say goodbye and hang up. Call when the caller says goodbye or that they need nothing else, such as \"that's all, thanks\". Do not call when they say thanks and keep talking.",
            "parameters": {
                "type": "object",
                "properties": {
                    "farewell_type": {
                        "type": "string",
                        "description": "Which farewell to say.",
                        "enum": ["thanks", "general", "help"]
                    }
                },
                "required": ["farewell_type"]
            }
        }),
        json!({
            "name": "search_knowledge_base",
            "description": "Search the company knowledge base. Use for questions about the company's services, leadership, history, locations, clients or social impact. Never use it for other companies or unrelated topics.",
            "parameters": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The caller's question or its key words."
                    }
                },
                "required": ["query"]
            }
        }),
        json!({
            "name": "get_knowledge_base_topics",
            "description": "List the topics the knowledge base covers. Use when the caller asks what you can tell them about.",
            "parameters": {
                "type": "object",
                "properties": {}
            }
        }),
        json!({
            "name": "get_knowledge_base_entry",
            "description": "Fetch one knowledge base article by topic or title when the caller wants detail on a specific company subject.",
            "parameters": {
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Topic to look for, e.g. 'Leadership Team' or 'Key Services'."
                    },
                    "title": {
                        "type": "string",
                        "description": "Exact article title, e.g. 'Company Overview'."
                    }
                }
            }
        }),
        json!({
            "name": "create_customer_account",
            "description": "Register a new customer. Ask the caller to spell their name, phone number and email, read the details back, and only call this once they confirm.",
            "parameters": {
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Full name as spelled by the caller."
                    },
                    "phone": {
                        "type": "string",
                        "description": "Phone number in international format, e.g. '+15551234567'."
                    },
                    "email": {
                        "type": "string",
                        "description": "Email address as spelled by the caller."
                    }
                },
                "required": ["name", "phone", "email"]
            }
        }),
        json!({
            "name": "reschedule_appointment",
            "description": "Move an appointment to a new time. Get the appointment ID from get_appointments, check availability and confirm the new slot first.",
            "parameters": {
                "type": "object",
                "properties": {
                    "appointment_id": {
                        "type": "string",
                        "description": "Appointment ID such as 'APT0001'."
                    },
                    "new_date": {
                        "type": "string",
                        "description": "New start time in ISO format (YYYY-MM-DDTHH:MM:SS)."
                    },
                    "new_service": {
                        "type": "string",
                        "description": "Service for the rescheduled appointment.",
                        "enum": SERVICES
                    }
                },
                "required": ["appointment_id", "new_date", "new_service"]
            }
        }),
        json!({
            "name": "cancel_appointment",
            "description": "Cancel an appointment after confirming with the caller. Get the appointment ID from get_appointments.",
            "parameters": {
                "type": "object",
                "properties": {
                    "appointment_id": {
                        "type": "string",
                        "description": "Appointment ID such as 'APT0001'."
                    }
                },
                "required": ["appointment_id"]
            }
        }),
        json!({
            "name": "update_appointment_status",
            "description": "Set an appointment's status, for example marking it completed after the meeting.",
            "parameters": {
                "type": "object",
                "properties": {
                    "appointment_id": {
                        "type": "string",
                        "description": "Appointment ID such as 'APT0001'."
                    },
                    "new_status": {
                        "type": "string",
                        "description": "The new status.",
                        "enum": STATUSES
                    }
                },
                "required": ["appointment_id", "new_status"]
            }
        }),
    ]
}
