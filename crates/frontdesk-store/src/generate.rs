//! Random mock data generation and sample-row assembly.

use crate::dates::format_iso;
use chrono::{Duration, NaiveDateTime};
use frontdesk_types::{
    Appointment, AppointmentStatus, Customer, MockData, Order, OrderStatus, SampleAppointment,
    SampleCustomer, SampleOrder, Service,
};
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::Deserialize;

/// Number of customers shown on the control page.
pub const SAMPLE_CUSTOMERS: usize = 3;

/// Per-customer cap on appointments and orders in a sample row.
const SAMPLE_ROWS_PER_KIND: usize = 2;

/// How many records of each kind to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MockSizes {
    pub customers: usize,
    pub appointments: usize,
    pub orders: usize,
}

impl Default for MockSizes {
    fn default() -> Self {
        Self {
            customers: 1000,
            appointments: 500,
            orders: 2000,
        }
    }
}

/// Generates a fresh mock data set.
///
/// Customers join within the past week, appointments fall within the next
/// week, and orders were placed within the past week. Sample rows are taken
/// from randomly chosen customers.
pub fn generate<R: Rng + ?Sized>(sizes: MockSizes, now: NaiveDateTime, rng: &mut R) -> MockData {
    let customers: Vec<Customer> = (0..sizes.customers)
        .map(|i| Customer {
            id: format!("CUST{:04}", i),
            name: format!("Customer {}", i),
            phone: format!("+1555{:07}", i),
            email: format!("customer{}@example.com", i),
            joined_date: format_iso(now - Duration::days(rng.gen_range(0..=7))),
        })
        .collect();

    let mut appointments = Vec::with_capacity(sizes.appointments);
    let mut orders = Vec::with_capacity(sizes.orders);

    if !customers.is_empty() {
        for i in 0..sizes.appointments {
            let customer = &customers[rng.gen_range(0..customers.len())];
            appointments.push(Appointment {
                id: format!("APT{:04}", i),
                customer_id: customer.id.clone(),
                customer_name: customer.name.clone(),
                date: format_iso(now + Duration::days(rng.gen_range(0..=7))),
                service: Service::ALL
                    .choose(rng)
                    .cloned()
                    .unwrap_or(Service::Consultation),
                status: *AppointmentStatus::ALL
                    .choose(rng)
                    .unwrap_or(&AppointmentStatus::Scheduled),
            });
        }

        for i in 0..sizes.orders {
            let customer = &customers[rng.gen_range(0..customers.len())];
            let total: f64 = rng.gen_range(10.0..=500.0);
            orders.push(Order {
                id: format!("ORD{:04}", i),
                customer_id: customer.id.clone(),
                customer_name: customer.name.clone(),
                date: format_iso(now - Duration::days(rng.gen_range(0..=7))),
                items: rng.gen_range(1..=5),
                total: (total * 100.0).round() / 100.0,
                status: *OrderStatus::ALL.choose(rng).unwrap_or(&OrderStatus::Pending),
            });
        }
    }

    let mut data = MockData {
        customers,
        appointments,
        orders,
        sample_data: Vec::new(),
    };

    let picked: Vec<&Customer> = data
        .customers
        .iter()
        .choose_multiple(rng, SAMPLE_CUSTOMERS);
    data.sample_data = picked
        .into_iter()
        .map(|customer| sample_row(&data, customer))
        .collect();

    data
}

/// Rebuilds the sample rows from the first customers in the data set.
pub fn regenerate_sample_data(data: &mut MockData) {
    let rows = data
        .customers
        .iter()
        .take(SAMPLE_CUSTOMERS)
        .map(|customer| sample_row(data, customer))
        .collect();
    data.sample_data = rows;
}

fn sample_row(data: &MockData, customer: &Customer) -> SampleCustomer {
    SampleCustomer {
        customer: customer.name.clone(),
        id: customer.id.clone(),
        phone: customer.phone.clone(),
        email: customer.email.clone(),
        appointments: data
            .appointments
            .iter()
            .filter(|a| a.customer_id == customer.id)
            .take(SAMPLE_ROWS_PER_KIND)
            .map(SampleAppointment::from_appointment)
            .collect(),
        orders: data
            .orders
            .iter()
            .filter(|o| o.customer_id == customer.id)
            .take(SAMPLE_ROWS_PER_KIND)
            .map(SampleOrder::from_order)
            .collect(),
    }
}

/// Returns the lowest `<prefix>nnnn` identifier not present in `existing`.
pub fn next_free_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let taken: std::collections::HashSet<&str> = existing.collect();
    (0..)
        .map(|n: u64| format!("{}{:04}", prefix, n))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> NaiveDateTime {
        parse_iso("2030-06-05T12:00:00").unwrap()
    }

    #[test]
    fn generate_respects_sizes_and_id_formats() {
        let mut rng = StdRng::seed_from_u64(7);
        let sizes = MockSizes {
            customers: 20,
            appointments: 10,
            orders: 15,
        };
        let data = generate(sizes, now(), &mut rng);

        assert_eq!(data.customers.len(), 20);
        assert_eq!(data.appointments.len(), 10);
        assert_eq!(data.orders.len(), 15);
        assert_eq!(data.sample_data.len(), SAMPLE_CUSTOMERS);

        assert_eq!(data.customers[4].id, "CUST0004");
        assert_eq!(data.customers[4].phone, "+15550000004");
        assert_eq!(data.customers[4].email, "customer4@example.com");
        assert_eq!(data.appointments[9].id, "APT0009");
        assert_eq!(data.orders[14].id, "ORD0014");

        for order in &data.orders {
            assert!((10.0..=500.0).contains(&order.total));
            assert!((1..=5).contains(&order.items));
            assert_eq!((order.total * 100.0).round() / 100.0, order.total);
        }
    }

    #[test]
    fn generated_dates_stay_within_a_week() {
        let mut rng = StdRng::seed_from_u64(11);
        let data = generate(MockSizes { customers: 5, appointments: 30, orders: 30 }, now(), &mut rng);

        for appointment in &data.appointments {
            let date = parse_iso(&appointment.date).unwrap();
            assert!(date >= now() && date <= now() + Duration::days(7));
        }
        for order in &data.orders {
            let date = parse_iso(&order.date).unwrap();
            assert!(date <= now() && date >= now() - Duration::days(7));
        }
    }

    #[test]
    fn generate_without_customers_yields_empty_collections() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = generate(MockSizes { customers: 0, appointments: 5, orders: 5 }, now(), &mut rng);
        assert!(data.appointments.is_empty());
        assert!(data.orders.is_empty());
        assert!(data.sample_data.is_empty());
    }

    #[test]
    fn regenerate_uses_first_customers_and_caps_rows() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut data = generate(MockSizes { customers: 4, appointments: 40, orders: 40 }, now(), &mut rng);
        regenerate_sample_data(&mut data);

        let ids: Vec<&str> = data.sample_data.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["CUST0000", "CUST0001", "CUST0002"]);
        for row in &data.sample_data {
            assert!(row.appointments.len() <= 2);
            assert!(row.orders.len() <= 2);
        }
    }

    #[test]
    fn next_free_id_fills_gaps() {
        let existing = ["APT0000", "APT0002"];
        assert_eq!(next_free_id("APT", existing.iter().copied()), "APT0001");
        assert_eq!(next_free_id("CUST", std::iter::empty()), "CUST0000");
    }
}
