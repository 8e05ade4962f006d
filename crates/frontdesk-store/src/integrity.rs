use frontdesk_types::MockData;
use std::collections::{BTreeSet, HashSet};

/// Checks the data set for duplicate ids and records that reference
/// customers which do not exist. Returns one message per issue found.
pub fn validate_integrity(data: &MockData) -> Vec<String> {
    let mut issues = Vec::new();

    let duplicates = |ids: Vec<&str>| -> BTreeSet<String> {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| !seen.insert(*id))
            .map(str::to_string)
            .collect()
    };

    let customer_dupes = duplicates(data.customers.iter().map(|c| c.id.as_str()).collect());
    if !customer_dupes.is_empty() {
        issues.push(format!("Duplicate customer IDs found: {:?}", customer_dupes));
    }

    let appointment_dupes = duplicates(data.appointments.iter().map(|a| a.id.as_str()).collect());
    if !appointment_dupes.is_empty() {
        issues.push(format!("Duplicate appointment IDs found: {:?}", appointment_dupes));
    }

    let order_dupes = duplicates(data.orders.iter().map(|o| o.id.as_str()).collect());
    if !order_dupes.is_empty() {
        issues.push(format!("Duplicate order IDs found: {:?}", order_dupes));
    }

    let customer_ids: HashSet<&str> = data.customers.iter().map(|c| c.id.as_str()).collect();

    let orphaned_appointments = data
        .appointments
        .iter()
        .filter(|a| !customer_ids.contains(a.customer_id.as_str()))
        .count();
    if orphaned_appointments > 0 {
        issues.push(format!(
            "Orphaned appointments found: {} appointments with non-existent customers",
            orphaned_appointments
        ));
    }

    let orphaned_orders = data
        .orders
        .iter()
        .filter(|o| !customer_ids.contains(o.customer_id.as_str()))
        .count();
    if orphaned_orders > 0 {
        issues.push(format!(
            "Orphaned orders found: {} orders with non-existent customers",
            orphaned_orders
        ));
    }

    if issues.is_empty() {
        tracing::debug!("data integrity check passed");
    } else {
        for issue in &issues {
            tracing::warn!(%issue, "data integrity issue");
        }
    }

    issues
}
