//! Reshapes miner records into the dashboard's field names.
//!
//! Each table lists `(miner field, dashboard field)` pairs. Fields the miner
//! did not send (or sent as `null`) are left out of the output rather than
//! treated as errors.

use minerboard_api::Record;
use serde_json::{Map, Value};

pub(crate) const DEVICE_FIELDS: &[(&str, &str)] = &[
    ("Name", "name"),
    ("ID", "id"),
    ("Status", "status"),
    ("MHS av", "mhsAvg"),
    ("MHS 5s", "mhs5s"),
    ("Utility", "utility"),
    ("Last Share Time", "lastShareTime"),
    ("Accepted", "accepted"),
    ("Rejected", "rejected"),
    ("Device Rejected%", "rejectedPct"),
    ("Hardware Errors", "hwErrors"),
    ("Device Hardware%", "hwErrorsPct"),
];

pub(crate) const NOTIFY_FIELDS: &[(&str, &str)] = &[
    ("Last Not Well", "notWellTime"),
    ("Reason Not Well", "notWellReason"),
];

pub(crate) const POOL_STAT_FIELDS: &[(&str, &str)] = &[
    ("POOL", "id"),
    ("URL", "url"),
    ("Status", "status"),
    ("Priority", "priority"),
    ("Accepted", "accepted"),
    ("Rejected", "rejected"),
    ("Pool Rejected%", "rejectedPct"),
    ("Stale", "stale"),
    ("Pool Stale%", "stalePct"),
    ("User", "userName"),
    ("Last Share Time", "lastShareTime"),
];

pub(crate) const POOL_LIST_FIELDS: &[(&str, &str)] = &[
    ("POOL", "id"),
    ("URL", "url"),
    ("Status", "status"),
    ("Priority", "priority"),
    ("User", "userName"),
];

/// Copies the listed fields of `record` under their new names.
pub(crate) fn convert(record: &Record, fields: &[(&str, &str)]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(from, to)| {
            record
                .get(*from)
                .filter(|value| !value.is_null())
                .map(|value| ((*to).to_owned(), value.clone()))
        })
        .collect()
}

/// Devices merged, by position, with the notification record at the same
/// index. A device without a matching notification keeps only its own fields.
pub(crate) fn devices_view(devices: &[Record], notify: &[Record]) -> Vec<Value> {
    devices
        .iter()
        .enumerate()
        .map(|(index, device)| {
            let mut merged = convert(device, DEVICE_FIELDS);
            if let Some(notification) = notify.get(index) {
                for (key, value) in convert(notification, NOTIFY_FIELDS) {
                    merged.entry(key).or_insert(value);
                }
            }
            Value::Object(merged)
        })
        .collect()
}

pub(crate) fn pools_view(pools: &[Record], fields: &[(&str, &str)]) -> Vec<Value> {
    pools
        .iter()
        .map(|pool| Value::Object(convert(pool, fields)))
        .collect()
}
