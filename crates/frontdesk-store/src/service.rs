//! Business operations over the shared mock data set.

use crate::dates::{format_iso, parse_iso};
use crate::error::{BusinessError, StoreError};
use crate::generate::{self, next_free_id, regenerate_sample_data, MockSizes};
use crate::integrity::validate_integrity;
use crate::invite::{InviteSender, LoggingInviteSender};
use crate::persist;
use chrono::{Datelike, Duration, Local, NaiveDateTime, Timelike, Weekday};
use frontdesk_types::{
    Appointment, AppointmentStatus, Customer, MockData, Order, SampleCustomer, Service,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tokio::sync::RwLock;

/// Source of the current local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

const OPENING_HOUR: u32 = 9;
const CLOSING_HOUR: u32 = 17;

/// Longest range, in days, that an availability search walks.
pub const MAX_SLOT_SEARCH_DAYS: i64 = 366;

/// How the store is sized, where it persists, and how slow it pretends to be.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Data file to load from and save to. `None` keeps the data in memory.
    pub data_file: Option<PathBuf>,
    pub sizes: MockSizes,
    /// Simulated latency applied before every business operation.
    pub delay: std::time::Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            data_file: Some(PathBuf::from(persist::DEFAULT_DATA_FILE)),
            sizes: MockSizes::default(),
            delay: std::time::Duration::from_millis(300),
        }
    }
}

/// Criteria for [`BusinessService::get_customer`]. Empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerLookup {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerAppointments {
    pub customer_id: String,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerOrders {
    pub customer_id: String,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableSlots {
    pub available_slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rescheduled {
    pub message: String,
    pub appointment: Appointment,
    pub old_date: String,
    pub new_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cancelled {
    pub message: String,
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdated {
    pub message: String,
    pub appointment: Appointment,
    pub old_status: AppointmentStatus,
    pub new_status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreated {
    pub success: bool,
    pub customer: Customer,
    pub message: String,
}

/// Shared handle to the mock business back end.
///
/// Cloning is cheap; all clones see the same data.
#[derive(Clone)]
pub struct BusinessService {
    data: Arc<RwLock<MockData>>,
    options: StoreOptions,
    invites: Arc<dyn InviteSender>,
    clock: Clock,
    synced_mtime: Arc<Mutex<Option<SystemTime>>>,
}

impl std::fmt::Debug for BusinessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusinessService")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl BusinessService {
    /// Wraps an existing data set.
    pub fn new(data: MockData, options: StoreOptions) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            options,
            invites: Arc::new(LoggingInviteSender),
            clock: Arc::new(local_now),
            synced_mtime: Arc::new(Mutex::new(None)),
        }
    }

    /// Loads the configured data file, or generates (and saves) a fresh data
    /// set when the file is missing or unusable.
    pub async fn open(options: StoreOptions) -> Result<Self, StoreError> {
        let data = match &options.data_file {
            Some(path) => load_or_generate(path, options.sizes, local_now()).await?,
            None => generate_fresh(options.sizes, local_now()),
        };
        let service = Self::new(data, options);
        service.record_mtime().await;

        let issues = service.integrity_issues().await;
        if !issues.is_empty() {
            tracing::warn!(count = issues.len(), "mock data loaded with integrity issues");
        }
        Ok(service)
    }

    pub fn with_invite_sender(mut self, invites: Arc<dyn InviteSender>) -> Self {
        self.invites = invites;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Copy of the current data set.
    pub async fn snapshot(&self) -> MockData {
        self.data.read().await.clone()
    }

    /// Sample rows for the control page.
    pub async fn sample_data(&self) -> Vec<SampleCustomer> {
        self.data.read().await.sample_data.clone()
    }

    pub async fn integrity_issues(&self) -> Vec<String> {
        validate_integrity(&*self.data.read().await)
    }

    async fn simulate_delay(&self) {
        if !self.options.delay.is_zero() {
            tokio::time::sleep(self.options.delay).await;
        }
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Looks a customer up by phone, then email, then id.
    pub async fn get_customer(&self, lookup: &CustomerLookup) -> Result<Customer, BusinessError> {
        self.simulate_delay().await;
        let data = self.data.read().await;
        find_customer(&data, lookup)
    }

    pub async fn get_customer_appointments(&self, customer_id: &str) -> CustomerAppointments {
        self.simulate_delay().await;
        let data = self.data.read().await;
        CustomerAppointments {
            customer_id: customer_id.to_string(),
            appointments: data
                .appointments
                .iter()
                .filter(|a| a.customer_id == customer_id)
                .cloned()
                .collect(),
        }
    }

    pub async fn get_customer_orders(&self, customer_id: &str) -> CustomerOrders {
        self.simulate_delay().await;
        let data = self.data.read().await;
        CustomerOrders {
            customer_id: customer_id.to_string(),
            orders: data
                .orders
                .iter()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect(),
        }
    }

    /// Books a new appointment for an existing customer.
    pub async fn schedule_appointment(
        &self,
        customer_id: &str,
        date: &str,
        service: &str,
    ) -> Result<Appointment, BusinessError> {
        self.simulate_delay().await;

        let (appointment, customer) = {
            let mut data = self.data.write().await;
            let customer = find_by_id(&data, customer_id)?;
            validate_slot_time(date, self.now())?;
            let service: Service = service.parse().map_err(|_| BusinessError::InvalidService)?;

            if data.appointments.iter().any(|a| a.date == date) {
                return Err(BusinessError::SlotTaken);
            }

            let appointment = Appointment {
                id: next_free_id("APT", data.appointments.iter().map(|a| a.id.as_str())),
                customer_id: customer.id.clone(),
                customer_name: customer.name.clone(),
                date: date.to_string(),
                service,
                status: AppointmentStatus::Scheduled,
            };
            data.appointments.push(appointment.clone());
            regenerate_sample_data(&mut data);
            (appointment, customer)
        };

        tracing::info!(appointment_id = %appointment.id, customer_id, date, "appointment scheduled");
        self.send_invite(&appointment, &customer);
        Ok(appointment)
    }

    /// Lists open hourly slots between `start` and `end`, inclusive.
    ///
    /// The walk stops [`MAX_SLOT_SEARCH_DAYS`] after `start`.
    pub async fn get_available_slots(
        &self,
        start: &str,
        end: &str,
    ) -> Result<AvailableSlots, BusinessError> {
        self.simulate_delay().await;

        let mut start = parse_iso(start).ok_or(BusinessError::InvalidDateFormat)?;
        let end = parse_iso(end).ok_or(BusinessError::InvalidDateFormat)?;

        let now = self.now();
        if start < now {
            start = truncate_to_hour(now) + Duration::hours(1);
        }
        if end <= start {
            return Err(BusinessError::EmptyRange);
        }

        let end = start
            .checked_add_signed(Duration::days(MAX_SLOT_SEARCH_DAYS))
            .map_or(end, |limit| end.min(limit));

        let data = self.data.read().await;
        let mut available_slots = Vec::new();
        let mut current = start;
        while current <= end {
            if is_weekday(current) && within_business_hours(current) {
                let slot = format_iso(current);
                if !data.appointments.iter().any(|a| a.date == slot) {
                    available_slots.push(slot);
                }
            }
            match current.checked_add_signed(Duration::hours(1)) {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(AvailableSlots { available_slots })
    }

    /// Moves an open appointment to a new slot and service.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: &str,
        new_date: &str,
        new_service: &str,
    ) -> Result<Rescheduled, BusinessError> {
        self.simulate_delay().await;

        let (result, customer) = {
            let mut data = self.data.write().await;
            let index = appointment_index(&data, appointment_id)?;

            let status = data.appointments[index].status;
            if matches!(status, AppointmentStatus::Cancelled | AppointmentStatus::Completed) {
                return Err(BusinessError::NotReschedulable(status.to_string()));
            }

            validate_slot_time(new_date, self.now())?;
            let service: Service = new_service
                .parse()
                .map_err(|_| BusinessError::InvalidService)?;

            if data
                .appointments
                .iter()
                .any(|a| a.date == new_date && a.id != appointment_id)
            {
                return Err(BusinessError::SlotTaken);
            }

            let customer = find_by_id(&data, &data.appointments[index].customer_id)?;

            let appointment = &mut data.appointments[index];
            let old_date = std::mem::replace(&mut appointment.date, new_date.to_string());
            appointment.service = service;
            appointment.status = AppointmentStatus::Scheduled;
            let appointment = appointment.clone();
            regenerate_sample_data(&mut data);

            let result = Rescheduled {
                message: "Appointment rescheduled successfully".to_string(),
                appointment,
                old_date,
                new_date: new_date.to_string(),
            };
            (result, customer)
        };

        tracing::info!(appointment_id, old_date = %result.old_date, new_date, "appointment rescheduled");
        self.send_invite(&result.appointment, &customer);
        Ok(result)
    }

    pub async fn cancel_appointment(&self, appointment_id: &str) -> Result<Cancelled, BusinessError> {
        self.simulate_delay().await;

        let mut data = self.data.write().await;
        let index = appointment_index(&data, appointment_id)?;

        match data.appointments[index].status {
            AppointmentStatus::Cancelled => return Err(BusinessError::AlreadyCancelled),
            AppointmentStatus::Completed => return Err(BusinessError::CancelCompleted),
            AppointmentStatus::Scheduled => {}
        }

        data.appointments[index].status = AppointmentStatus::Cancelled;
        let appointment = data.appointments[index].clone();
        regenerate_sample_data(&mut data);

        tracing::info!(appointment_id, "appointment cancelled");
        Ok(Cancelled {
            message: "Appointment cancelled successfully".to_string(),
            appointment,
        })
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: &str,
        new_status: &str,
    ) -> Result<StatusUpdated, BusinessError> {
        self.simulate_delay().await;

        let new_status: AppointmentStatus =
            new_status.parse().map_err(|_| BusinessError::InvalidStatus)?;

        let mut data = self.data.write().await;
        let index = appointment_index(&data, appointment_id)?;

        let old_status = std::mem::replace(&mut data.appointments[index].status, new_status);
        let appointment = data.appointments[index].clone();
        regenerate_sample_data(&mut data);

        tracing::info!(appointment_id, %old_status, %new_status, "appointment status updated");
        Ok(StatusUpdated {
            message: format!(
                "Appointment status updated from {} to {}",
                old_status, new_status
            ),
            appointment,
            old_status,
            new_status,
        })
    }

    /// Registers a new customer and persists the data set.
    pub async fn create_customer(
        &self,
        name: &str,
        phone: &str,
        email: &str,
    ) -> Result<CustomerCreated, BusinessError> {
        self.simulate_delay().await;

        if name.is_empty() || phone.is_empty() || email.is_empty() {
            return Err(BusinessError::MissingCustomerFields);
        }

        let mut data = self.data.write().await;
        if data
            .customers
            .iter()
            .any(|c| c.phone == phone || c.email == email)
        {
            return Err(BusinessError::CustomerExists);
        }

        let customer = Customer {
            id: next_free_id("CUST", data.customers.iter().map(|c| c.id.as_str())),
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            email: email.trim().to_string(),
            joined_date: format_iso(self.now()),
        };
        data.customers.push(customer.clone());
        regenerate_sample_data(&mut data);

        if let Some(path) = &self.options.data_file {
            if let Err(err) = persist::save(&data, path).await {
                data.customers.pop();
                regenerate_sample_data(&mut data);
                return Err(BusinessError::Persistence(err.to_string()));
            }
            drop(data);
            self.record_mtime().await;
        }

        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(CustomerCreated {
            success: true,
            message: format!(
                "Customer {} created successfully with ID {}",
                customer.name, customer.id
            ),
            customer,
        })
    }

    /// Replaces the in-memory data with the contents of the data file.
    ///
    /// When the file cannot be loaded the in-memory data is kept: the bad
    /// file is moved aside, the current data is written back in its place,
    /// and the load error is returned.
    pub async fn reload(&self) -> Result<(), StoreError> {
        let Some(path) = &self.options.data_file else {
            return Ok(());
        };
        match load_rebuilt(path).await {
            Ok(fresh) => {
                *self.data.write().await = fresh;
                self.record_mtime().await;
                tracing::info!(path = %path.display(), "mock data reloaded");
                Ok(())
            }
            Err(err) => {
                if tokio::fs::try_exists(path).await.unwrap_or(false) {
                    persist::backup(path, self.now()).await?;
                }
                persist::save(&*self.data.read().await, path).await?;
                self.record_mtime().await;
                tracing::warn!(path = %path.display(), error = %err, "kept in-memory mock data");
                Err(err)
            }
        }
    }

    /// Reloads when the data file changed since it was last read or written.
    /// Returns whether a reload happened.
    pub async fn sync_with_disk(&self) -> Result<bool, StoreError> {
        let Some(path) = &self.options.data_file else {
            return Ok(false);
        };
        let Some(on_disk) = file_mtime(path).await else {
            return Ok(false);
        };
        let tracked = *self.synced_mtime.lock().unwrap_or_else(|e| e.into_inner());
        if tracked == Some(on_disk) {
            tracing::debug!("mock data in sync with disk");
            return Ok(false);
        }
        tracing::info!(path = %path.display(), "data file changed on disk, reloading");
        self.reload().await?;
        Ok(true)
    }

    /// Writes the current data to disk and confirms memory and disk agree.
    pub async fn force_save_and_sync(&self) -> Result<(), StoreError> {
        let Some(path) = &self.options.data_file else {
            return Ok(());
        };
        persist::save(&*self.data.read().await, path).await?;
        self.record_mtime().await;
        self.sync_with_disk().await?;
        Ok(())
    }

    /// Rebuilds the sample rows from the current data.
    pub async fn refresh_sample_data(&self) {
        regenerate_sample_data(&mut *self.data.write().await);
    }

    fn send_invite(&self, appointment: &Appointment, customer: &Customer) {
        if let Err(err) = self.invites.send_invite(appointment, customer) {
            tracing::warn!(appointment_id = %appointment.id, error = %err, "could not send meeting invite");
        }
    }

    async fn record_mtime(&self) {
        let Some(path) = &self.options.data_file else {
            return;
        };
        let mtime = file_mtime(path).await;
        *self.synced_mtime.lock().unwrap_or_else(|e| e.into_inner()) = mtime;
    }
}

/// Loads `path` if it holds a valid document; otherwise generates and saves
/// fresh data. Sample rows of a loaded document are rebuilt.
///
/// An existing file that cannot be loaded is moved aside with
/// [`persist::backup`] before the fresh data is written.
pub async fn load_or_generate(
    path: &Path,
    sizes: MockSizes,
    now: NaiveDateTime,
) -> Result<MockData, StoreError> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        match load_rebuilt(path).await {
            Ok(data) => return Ok(data),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "existing mock data unusable, generating new data");
                persist::backup(path, now).await?;
            }
        }
    } else {
        tracing::info!(path = %path.display(), "no mock data found, generating");
    }

    let data = generate_fresh(sizes, now);
    persist::save(&data, path).await?;
    Ok(data)
}

async fn load_rebuilt(path: &Path) -> Result<MockData, StoreError> {
    let mut data = persist::load(path).await?;
    regenerate_sample_data(&mut data);
    Ok(data)
}

fn generate_fresh(sizes: MockSizes, now: NaiveDateTime) -> MockData {
    generate::generate(sizes, now, &mut rand::thread_rng())
}

async fn file_mtime(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

fn find_customer(data: &MockData, lookup: &CustomerLookup) -> Result<Customer, BusinessError> {
    let found = if let Some(phone) = non_empty(lookup.phone.as_deref()) {
        data.customers.iter().find(|c| c.phone == phone)
    } else if let Some(email) = non_empty(lookup.email.as_deref()) {
        data.customers.iter().find(|c| c.email == email)
    } else if let Some(id) = non_empty(lookup.customer_id.as_deref()) {
        data.customers.iter().find(|c| c.id == id)
    } else {
        return Err(BusinessError::NoSearchCriteria);
    };
    found.cloned().ok_or(BusinessError::CustomerNotFound)
}

fn find_by_id(data: &MockData, customer_id: &str) -> Result<Customer, BusinessError> {
    find_customer(
        data,
        &CustomerLookup {
            customer_id: Some(customer_id.to_string()),
            ..Default::default()
        },
    )
}

fn appointment_index(data: &MockData, appointment_id: &str) -> Result<usize, BusinessError> {
    data.appointments
        .iter()
        .position(|a| a.id == appointment_id)
        .ok_or(BusinessError::AppointmentNotFound)
}

/// Applies the bookable-time rules: parseable, in the future, within
/// business hours, on a weekday.
fn validate_slot_time(date: &str, now: NaiveDateTime) -> Result<NaiveDateTime, BusinessError> {
    let when = parse_iso(date).ok_or(BusinessError::InvalidDateFormat)?;
    if when <= now {
        return Err(BusinessError::InPast);
    }
    if !within_business_hours(when) {
        return Err(BusinessError::OutsideBusinessHours);
    }
    if !is_weekday(when) {
        return Err(BusinessError::Weekend);
    }
    Ok(when)
}

fn within_business_hours(when: NaiveDateTime) -> bool {
    (OPENING_HOUR..CLOSING_HOUR).contains(&when.hour())
}

fn is_weekday(when: NaiveDateTime) -> bool {
    !matches!(when.weekday(), Weekday::Sat | Weekday::Sun)
}

fn truncate_to_hour(when: NaiveDateTime) -> NaiveDateTime {
    when.date()
        .and_hms_opt(when.hour(), 0, 0)
        .unwrap_or(when)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2030-06-05 is a Wednesday.
    fn fixed_now() -> NaiveDateTime {
        parse_iso("2030-06-05T10:30:00").unwrap()
    }

    #[test]
    fn slot_rules_apply_in_order() {
        let now = fixed_now();
        assert_eq!(
            validate_slot_time("tomorrow", now),
            Err(BusinessError::InvalidDateFormat)
        );
        assert_eq!(
            validate_slot_time("2030-06-05T10:00:00", now),
            Err(BusinessError::InPast)
        );
        assert_eq!(
            validate_slot_time("2030-06-06T17:00:00", now),
            Err(BusinessError::OutsideBusinessHours)
        );
        assert_eq!(
            validate_slot_time("2030-06-08T10:00:00", now),
            Err(BusinessError::Weekend)
        );
        assert!(validate_slot_time("2030-06-06T16:59:00", now).is_ok());
    }

    #[test]
    fn truncation_drops_minutes_and_seconds() {
        let truncated = truncate_to_hour(parse_iso("2030-06-05T23:45:12.5").unwrap());
        assert_eq!(format_iso(truncated), "2030-06-05T23:00:00");
        assert_eq!(
            format_iso(truncated + Duration::hours(1)),
            "2030-06-06T00:00:00"
        );
    }

    #[test]
    fn lookup_prefers_phone_over_email_and_id() {
        let data = MockData {
            customers: vec![
                Customer {
                    id: "CUST0000".into(),
                    name: "A".into(),
                    phone: "+15550000000".into(),
                    email: "a@example.com".into(),
                    joined_date: String::new(),
                },
                Customer {
                    id: "CUST0001".into(),
                    name: "B".into(),
                    phone: "+15550000001".into(),
                    email: "b@example.com".into(),
                    joined_date: String::new(),
                },
            ],
            ..Default::default()
        };

        let lookup = CustomerLookup {
            phone: Some("+15550000001".into()),
            email: Some("a@example.com".into()),
            customer_id: Some("CUST0000".into()),
        };
        assert_eq!(find_customer(&data, &lookup).unwrap().id, "CUST0001");

        let empty_phone = CustomerLookup {
            phone: Some(String::new()),
            email: Some("a@example.com".into()),
            customer_id: None,
        };
        assert_eq!(find_customer(&data, &empty_phone).unwrap().id, "CUST0000");

        assert_eq!(
            find_customer(&data, &CustomerLookup::default()),
            Err(BusinessError::NoSearchCriteria)
        );
    }
}
