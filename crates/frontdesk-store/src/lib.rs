//! Mock business back end for the Frontdesk voice agent.
//!
//! Holds customers, appointments and orders in memory behind a shared
//! [`BusinessService`] handle, persists them as a single JSON document, and
//! enforces the booking rules the voice agent relies on.
//!
//! # Design decisions
//!
//! - **One JSON document**: the whole data set is small enough to load and
//!   rewrite in one go, and the file doubles as a fixture for demos.
//! - **Typed rejections**: business-rule failures are [`BusinessError`]
//!   values whose `Display` text is spoken back to the caller, kept apart
//!   from I/O failures in [`StoreError`].
//! - **Injectable clock and invite sender**: booking rules depend on "now",
//!   and invites are an outbound side effect; both are swappable in tests.

mod dates;
mod error;
mod generate;
mod integrity;
mod invite;
mod persist;
mod service;

pub use dates::{format_iso, parse_iso};
pub use error::{BusinessError, StoreError};
pub use generate::{generate, regenerate_sample_data, MockSizes, SAMPLE_CUSTOMERS};
pub use integrity::validate_integrity;
pub use invite::{InviteError, InviteSender, LoggingInviteSender};
pub use persist::{load, save, validate_structure, DEFAULT_DATA_FILE};
pub use service::{
    load_or_generate, AvailableSlots, BusinessService, Cancelled, Clock, CustomerAppointments,
    CustomerCreated, CustomerLookup, CustomerOrders, Rescheduled, StatusUpdated, StoreOptions,
    MAX_SLOT_SEARCH_DAYS,
};
