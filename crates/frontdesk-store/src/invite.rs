//! Meeting invite delivery seam.

use frontdesk_types::{Appointment, Customer};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to send meeting invite: {0}")]
pub struct InviteError(pub String);

/// Delivers a meeting invite for a booked or rescheduled appointment.
///
/// Failures are reported to the caller but never undo the booking.
pub trait InviteSender: Send + Sync {
    fn send_invite(&self, appointment: &Appointment, customer: &Customer) -> Result<(), InviteError>;
}

/// Records the invite in the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInviteSender;

impl InviteSender for LoggingInviteSender {
    fn send_invite(&self, appointment: &Appointment, customer: &Customer) -> Result<(), InviteError> {
        tracing::info!(
            appointment_id = %appointment.id,
            customer_id = %customer.id,
            email = %customer.email,
            date = %appointment.date,
            service = %appointment.service,
            "meeting invite issued"
        );
        Ok(())
    }
}
