//! Customer, appointment, and order records.

use crate::{AppointmentStatus, OrderStatus, Service};
use serde::{Deserialize, Serialize};

/// A customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Identifier in `CUSTnnnn` form.
    pub id: String,
    pub name: String,
    /// Phone number in international format, e.g. `+15550000042`.
    pub phone: String,
    pub email: String,
    /// ISO-8601 local timestamp of account creation.
    pub joined_date: String,
}

/// A booked appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Identifier in `APTnnnn` form.
    pub id: String,
    pub customer_id: String,
    /// Denormalized customer name, captured at booking time.
    pub customer_name: String,
    /// ISO-8601 local timestamp. Slot conflicts compare this string exactly.
    pub date: String,
    pub service: Service,
    pub status: AppointmentStatus,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Identifier in `ORDnnnn` form.
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub date: String,
    /// Number of line items.
    pub items: u32,
    /// Order total, rounded to cents.
    pub total: f64,
    pub status: OrderStatus,
}

/// Condensed appointment row for the control page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleAppointment {
    #[serde(rename = "Service")]
    pub service: Service,
    /// `YYYY-MM-DD` prefix of the appointment date.
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Status")]
    pub status: AppointmentStatus,
}

/// Condensed order row for the control page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleOrder {
    #[serde(rename = "ID")]
    pub id: String,
    /// Total formatted as `$<amount>`.
    #[serde(rename = "Total")]
    pub total: String,
    #[serde(rename = "Status")]
    pub status: OrderStatus,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "# Items")]
    pub items: u32,
}

/// A customer with a few of their appointments and orders, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleCustomer {
    #[serde(rename = "Customer")]
    pub customer: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Appointments")]
    pub appointments: Vec<SampleAppointment>,
    #[serde(rename = "Orders")]
    pub orders: Vec<SampleOrder>,
}

impl SampleAppointment {
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            service: appointment.service.clone(),
            date: date_prefix(&appointment.date),
            status: appointment.status,
        }
    }
}

impl SampleOrder {
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            total: format!("${}", order.total),
            status: order.status,
            date: date_prefix(&order.date),
            items: order.items,
        }
    }
}

fn date_prefix(date: &str) -> String {
    date.chars().take(10).collect()
}

/// The full mock data document, as persisted to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockData {
    pub customers: Vec<Customer>,
    pub appointments: Vec<Appointment>,
    pub orders: Vec<Order>,
    pub sample_data: Vec<SampleCustomer>,
}
