use thiserror::Error;

/// Errors from reading or writing the mock data file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access mock data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize mock data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid mock data structure: {0}")]
    InvalidStructure(String),
}

/// A business rule rejected the request.
///
/// The `Display` text is what the caller sees; the agent dispatcher returns
/// it verbatim as `{"error": "..."}` so the voice agent can relay it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusinessError {
    #[error("No search criteria provided")]
    NoSearchCriteria,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Invalid service. Must be one of: Consultation, Follow-up, Review, Planning")]
    InvalidService,

    #[error("Invalid date format. Please use ISO format (YYYY-MM-DDTHH:MM:SS)")]
    InvalidDateFormat,

    #[error("Cannot schedule appointments in the past")]
    InPast,

    #[error("Appointments can only be scheduled between 9 AM and 5 PM")]
    OutsideBusinessHours,

    #[error("Appointments can only be scheduled on weekdays")]
    Weekend,

    #[error("This time slot is already booked. Please choose another time.")]
    SlotTaken,

    #[error("End date must be after start date")]
    EmptyRange,

    #[error("Cannot reschedule appointment with status: {0}")]
    NotReschedulable(String),

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Cannot cancel a completed appointment")]
    CancelCompleted,

    #[error("Invalid status. Must be one of: Scheduled, Completed, Cancelled")]
    InvalidStatus,

    #[error("Name, phone, and email are required")]
    MissingCustomerFields,

    #[error("Customer already exists with this phone or email")]
    CustomerExists,

    #[error("Error creating customer: {0}")]
    Persistence(String),
}
