use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries::{self, LOCAL_SCOPE};
use crate::models::legacy::{normalize_record, RecordShape};
use crate::models::BookingRecord;

pub const BOOKING_RESULTS_KEY: &str = "bookingResults";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AppendOutcome {
    Appended,
    /// A record with the same hub, visit date and start hour existed and was
    /// overwritten in place.
    Replaced { previous_id: Uuid },
}

/// Called by [`HistoryStore::append_record`] after the collection has been
/// persisted.
pub trait CommitHook: Send + Sync {
    fn on_commit(&self, record: &BookingRecord, outcome: &AppendOutcome);
}

pub struct LogCommitHook;

impl CommitHook for LogCommitHook {
    fn on_commit(&self, record: &BookingRecord, outcome: &AppendOutcome) {
        tracing::info!(
            booking_id = %record.id,
            hub = %record.hub.id,
            visit_date = %record.schedule.visit_date,
            start_hour = %record.schedule.start_hour,
            paid = record.is_paid(),
            total_price = record.total_price,
            outcome = ?outcome,
            "booking committed"
        );
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub hub_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    /// Inclusive bounds on the visit date.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort: SortOrder,
}

impl HistoryQuery {
    fn matches(&self, record: &BookingRecord) -> bool {
        if let Some(hub_id) = &self.hub_id {
            if !record.hub.id.eq_ignore_ascii_case(hub_id) {
                return false;
            }
        }

        if let Some(status) = self.payment_status {
            if record.is_paid() != (status == PaymentStatus::Paid) {
                return false;
            }
        }

        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(date) = record.visit_date() else {
                return false;
            };
            if self.start_date.is_some_and(|start| date < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| date > end) {
                return false;
            }
        }

        true
    }
}

/// Filters and sorts a copy of `records`. Nothing is cached.
pub fn query_history(records: &[BookingRecord], query: &HistoryQuery) -> Vec<BookingRecord> {
    let mut matching: Vec<BookingRecord> = records
        .iter()
        .filter(|r| query.matches(r))
        .cloned()
        .collect();

    matching.sort_by(|a, b| {
        let ordering = a
            .booked_at()
            .cmp(&b.booked_at())
            .then(a.created_at.cmp(&b.created_at));
        match query.sort {
            SortOrder::Oldest => ordering,
            SortOrder::Newest => ordering.reverse(),
        }
    });

    matching
}

/// Reads `bookingResults`. Absent or malformed data yields an empty history;
/// legacy entries are normalized and written back in the canonical schema.
pub fn load_history(conn: &Connection) -> Vec<BookingRecord> {
    let raw = match queries::get_item(conn, LOCAL_SCOPE, BOOKING_RESULTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read booking history");
            return Vec::new();
        }
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "booking history is malformed, starting empty");
            return Vec::new();
        }
    };

    let mut records: Vec<BookingRecord> = Vec::with_capacity(entries.len());
    let mut migrated = 0usize;
    let mut dropped = 0usize;
    let mut folded = 0usize;

    for entry in &entries {
        let Some((record, shape)) = normalize_record(entry) else {
            dropped += 1;
            continue;
        };
        if shape != RecordShape::Canonical {
            migrated += 1;
        }
        // Same replace-by-key rule as `append_record`: the later entry wins
        // and takes the earlier one's slot.
        let key = record.key();
        match records.iter_mut().find(|r| r.key() == key) {
            Some(existing) => {
                *existing = record;
                folded += 1;
            }
            None => records.push(record),
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, "skipped unreadable booking history entries");
    }
    if folded > 0 {
        tracing::warn!(folded, "merged duplicate booking history entries");
    }

    if migrated > 0 || dropped > 0 || folded > 0 {
        match persist_history(conn, &records) {
            Ok(()) => tracing::info!(
                migrated,
                dropped,
                folded,
                "rewrote booking history in current schema"
            ),
            Err(e) => tracing::warn!(error = %e, "failed to rewrite booking history"),
        }
    }

    records
}

pub fn persist_history(conn: &Connection, records: &[BookingRecord]) -> anyhow::Result<()> {
    let json = serde_json::to_string(records)?;
    queries::set_item(conn, LOCAL_SCOPE, BOOKING_RESULTS_KEY, &json)
}

/// Finalized bookings, mirrored in memory and persisted on every append.
pub struct HistoryStore {
    records: Vec<BookingRecord>,
    hooks: Vec<Box<dyn CommitHook>>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            hooks: Vec::new(),
        }
    }

    pub fn load(conn: &Connection) -> Self {
        let records = load_history(conn);
        tracing::info!(count = records.len(), "loaded booking history");
        Self {
            records,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: impl CommitHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn records(&self) -> &[BookingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends `record`, replacing any entry with the same booking key.
    /// The whole collection is persisted before the in-memory copy changes,
    /// so a failed write leaves both untouched.
    pub fn append_record(
        &mut self,
        conn: &Connection,
        record: BookingRecord,
    ) -> anyhow::Result<AppendOutcome> {
        let key = record.key();
        let mut updated = self.records.clone();

        let outcome = match updated.iter().position(|r| r.key() == key) {
            Some(index) => {
                let previous_id = updated[index].id;
                tracing::warn!(
                    hub = %key.hub_id,
                    visit_date = %key.visit_date,
                    start_hour = %key.start_hour,
                    %previous_id,
                    "duplicate booking, replacing existing record"
                );
                updated[index] = record.clone();
                AppendOutcome::Replaced { previous_id }
            }
            None => {
                updated.push(record.clone());
                AppendOutcome::Appended
            }
        };

        persist_history(conn, &updated)?;
        self.records = updated;

        for hook in &self.hooks {
            hook.on_commit(&record, &outcome);
        }

        Ok(outcome)
    }

    pub fn query(&self, query: &HistoryQuery) -> Vec<BookingRecord> {
        query_history(&self.records, query)
    }

    pub fn snapshot(&self) -> Vec<BookingRecord> {
        self.records.clone()
    }
}
