//! Shared types for the Frontdesk voice-agent service.
//!
//! This crate provides the domain records that flow between the mock store,
//! the agent function dispatcher, and the HTTP server: customers,
//! appointments, orders, their status enums, and the condensed sample rows
//! shown on the control page.
//!
//! Record fields serialize with snake_case keys. That JSON shape is both the
//! persisted mock-data format and the payload returned to the remote agent
//! from function calls, so renaming a field is a wire change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod records;
pub mod voice;

pub use records::{
    Appointment, Customer, MockData, Order, SampleAppointment, SampleCustomer, SampleOrder,
};

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Kinds of service an appointment can be booked for.
///
/// Bookings only accept the four named services. Documents loaded from disk
/// may carry any label; those are kept verbatim as [`Service::Other`] so a
/// hand-edited file survives a load and save unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Service {
    Consultation,
    FollowUp,
    Review,
    Planning,
    Other(String),
}

impl Service {
    /// Every bookable service, in display order.
    pub const ALL: [Service; 4] = [
        Service::Consultation,
        Service::FollowUp,
        Service::Review,
        Service::Planning,
    ];

    /// Returns the display label, which is also the serialized form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Consultation => "Consultation",
            Self::FollowUp => "Follow-up",
            Self::Review => "Review",
            Self::Planning => "Planning",
            Self::Other(label) => label,
        }
    }

    /// Whether new appointments may be booked for this service.
    pub fn is_bookable(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the bookable services parse.
impl FromStr for Service {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "service",
                value: s.to_string(),
            })
    }
}

impl From<String> for Service {
    fn from(label: String) -> Self {
        label.parse().unwrap_or(Self::Other(label))
    }
}

impl From<Service> for String {
    fn from(service: Service) -> Self {
        match service {
            Service::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Every status, in the order used for validation messages.
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "appointment status",
                value: s.to_string(),
            })
    }
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_serializes_with_display_labels() {
        let json = serde_json::to_string(&Service::FollowUp).unwrap();
        assert_eq!(json, "\"Follow-up\"");

        let parsed: Service = serde_json::from_str("\"Consultation\"").unwrap();
        assert_eq!(parsed, Service::Consultation);
    }

    #[test]
    fn service_from_str_rejects_unknown() {
        assert_eq!("Review".parse::<Service>(), Ok(Service::Review));
        let err = "Massage".parse::<Service>().unwrap_err();
        assert_eq!(err.to_string(), "unknown service: Massage");
    }

    #[test]
    fn unknown_service_labels_survive_deserialization() {
        let parsed: Service = serde_json::from_str("\"Checkup\"").unwrap();
        assert_eq!(parsed, Service::Other("Checkup".to_string()));
        assert!(!parsed.is_bookable());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Checkup\"");

        let known: Service = serde_json::from_str("\"Follow-up\"").unwrap();
        assert_eq!(known, Service::FollowUp);
        assert!(known.is_bookable());
    }

    #[test]
    fn appointment_status_from_str_is_case_sensitive() {
        assert_eq!(
            "Completed".parse::<AppointmentStatus>(),
            Ok(AppointmentStatus::Completed)
        );
        assert!("completed".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn order_status_labels() {
        assert_eq!(OrderStatus::Shipped.to_string(), "Shipped");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            "\"Delivered\""
        );
    }
}
