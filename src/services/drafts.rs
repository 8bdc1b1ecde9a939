use rusqlite::Connection;

use crate::db::queries;
use crate::models::{BookingDraft, DraftPatch};

pub const CURRENT_BOOKING_KEY: &str = "currentBookingInfo";

/// The in-progress booking of one session, stored under the session's scope
/// so it survives navigation between steps.
pub struct DraftStore<'a> {
    conn: &'a Connection,
    session_id: &'a str,
}

impl<'a> DraftStore<'a> {
    pub fn new(conn: &'a Connection, session_id: &'a str) -> Self {
        Self { conn, session_id }
    }

    /// Missing or unreadable drafts read as the empty template.
    pub fn get_draft(&self) -> BookingDraft {
        let raw = match queries::get_item(self.conn, self.session_id, CURRENT_BOOKING_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BookingDraft::default(),
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "failed to read draft");
                return BookingDraft::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(session = %self.session_id, error = %e, "discarding malformed draft");
            BookingDraft::default()
        })
    }

    /// Shallow-merges `patch` into the stored draft. No validation happens
    /// here; callers validate before writing.
    pub fn update_draft(&self, patch: DraftPatch) -> anyhow::Result<BookingDraft> {
        let mut draft = self.get_draft();
        draft.apply(patch);
        self.save(&draft)?;
        Ok(draft)
    }

    pub fn reset_draft(&self) -> anyhow::Result<BookingDraft> {
        queries::remove_item(self.conn, self.session_id, CURRENT_BOOKING_KEY)?;
        tracing::debug!(session = %self.session_id, "draft reset");
        Ok(BookingDraft::default())
    }

    pub(crate) fn save(&self, draft: &BookingDraft) -> anyhow::Result<()> {
        let json = serde_json::to_string(draft)?;
        queries::set_item(self.conn, self.session_id, CURRENT_BOOKING_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{find_hub, HubSelection, Schedule};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    #[test]
    fn test_get_draft_defaults_to_empty() {
        let conn = setup_db();
        let store = DraftStore::new(&conn, "s1");
        assert!(store.get_draft().is_empty());
    }

    #[test]
    fn test_update_draft_persists_across_handles() {
        let conn = setup_db();
        DraftStore::new(&conn, "s1")
            .update_draft(DraftPatch {
                hub: find_hub("sango").map(HubSelection::from),
                ..Default::default()
            })
            .unwrap();

        let draft = DraftStore::new(&conn, "s1").get_draft();
        assert_eq!(draft.hub.unwrap().id, "sango");
        assert!(DraftStore::new(&conn, "s2").get_draft().is_empty());
    }

    #[test]
    fn test_update_draft_merges_sections() {
        let conn = setup_db();
        let store = DraftStore::new(&conn, "s1");
        store
            .update_draft(DraftPatch {
                hub: find_hub("lekki").map(HubSelection::from),
                ..Default::default()
            })
            .unwrap();
        let draft = store
            .update_draft(DraftPatch {
                schedule: Some(Schedule {
                    visit_date: "2030-01-01".to_string(),
                    start_hour: "09:00".to_string(),
                    end_hour: "10:00".to_string(),
                }),
                ..Default::default()
            })
            .unwrap();

        assert!(draft.hub.is_some());
        assert!(draft.schedule.is_some());
        assert_eq!(store.get_draft(), draft);
    }

    #[test]
    fn test_reset_draft() {
        let conn = setup_db();
        let store = DraftStore::new(&conn, "s1");
        store
            .update_draft(DraftPatch {
                hub: find_hub("lekki").map(HubSelection::from),
                ..Default::default()
            })
            .unwrap();

        assert!(store.reset_draft().unwrap().is_empty());
        assert!(store.get_draft().is_empty());
    }

    #[test]
    fn test_malformed_draft_fails_open() {
        let conn = setup_db();
        queries::set_item(&conn, "s1", CURRENT_BOOKING_KEY, "{not json").unwrap();
        assert!(DraftStore::new(&conn, "s1").get_draft().is_empty());
    }
}
