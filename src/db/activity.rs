use chrono::{DateTime, Utc};
use derive_more::{From, Into};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::db::Snapshot;
use crate::error::AppError;
use crate::AppState;

/// Maximum number of activity entries retained. Appends beyond this evict
/// the oldest entries, FIFO by insertion order.
pub const MAX_ACTIVITY_COUNT: usize = 500;

/// How many entries a feed returns at most.
pub const DEFAULT_FEED_LIMIT: usize = 30;

id_struct!(ActivityId, "activity entry");

/// Coarse audience partition for activity entries. Security and staff
/// management are reviewed independently, so they get separate scopes
/// rather than one shared staff bucket.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Security,
    StaffManagement,
    Gamer,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UserLogin,
    UnauthorizedStaffLogin,
    UserAchievementSubmitted,
    UserProofUploaded,
    UserScoreSubmitted,
    TournamentCreated,
    TournamentUpdated,
    TournamentRemoved,
    StaffStatusChanged,
    StaffRoleChanged,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: ActivityId,
    pub scope: Scope,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Rendered once at append time; never re-derived from raw data.
    pub message: String,
    pub actor_role: String,
    pub actor: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// An entry that has not been appended yet. Actor fields default to
/// "system" and severity to info.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub scope: Scope,
    pub kind: EventKind,
    pub message: String,
    pub actor_role: Option<String>,
    pub actor: Option<String>,
    pub severity: Option<Severity>,
}

impl NewActivity {
    pub fn new(scope: Scope, kind: EventKind, message: impl Into<String>) -> Self {
        NewActivity {
            scope,
            kind,
            message: message.into(),
            actor_role: None,
            actor: None,
            severity: None,
        }
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn actor_role(mut self, actor_role: impl Into<String>) -> Self {
        self.actor_role = Some(actor_role.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Appends an entry, then enforces the retention bound. The caller is
/// responsible for persisting the snapshot afterwards.
pub fn push_activity(db: &mut Snapshot, entry: NewActivity) {
    db.activities.push(ActivityEntry {
        id: ActivityId::random(),
        scope: entry.scope,
        kind: entry.kind,
        message: entry.message,
        actor_role: entry.actor_role.unwrap_or_else(|| "system".to_string()),
        actor: entry.actor.unwrap_or_else(|| "system".to_string()),
        severity: entry.severity.unwrap_or(Severity::Info),
        created_at: Utc::now(),
    });
    if db.activities.len() > MAX_ACTIVITY_COUNT {
        let excess = db.activities.len() - MAX_ACTIVITY_COUNT;
        db.activities.drain(..excess);
    }
}

/// Entries matching `predicate`, most recent first, truncated to `limit`.
pub fn recent_activities(
    activities: &[ActivityEntry],
    predicate: impl Fn(&ActivityEntry) -> bool,
    limit: usize,
) -> Vec<ActivityEntry> {
    activities
        .iter()
        .filter(|entry| predicate(entry))
        .sorted_by(|a, b| b.created_at.cmp(&a.created_at))
        .take(limit)
        .cloned()
        .collect()
}

impl AppState {
    /// Feed for the manager dashboard: security and staff-management
    /// entries, optionally narrowed to one of the two scopes.
    pub fn manager_feed(&self, kind: &str) -> Result<Vec<ActivityEntry>, AppError> {
        let _guard = self.store.lock();
        let db = self.store.load()?;
        Ok(recent_activities(
            &db.activities,
            |entry| match kind {
                "security" => entry.scope == Scope::Security,
                "staff" => entry.scope == Scope::StaffManagement,
                _ => matches!(entry.scope, Scope::Security | Scope::StaffManagement),
            },
            DEFAULT_FEED_LIMIT,
        ))
    }

    /// Feed for the employee dashboard: gamer-scoped entries, optionally
    /// narrowed to logins or proof uploads.
    pub fn employee_feed(&self, kind: &str) -> Result<Vec<ActivityEntry>, AppError> {
        let _guard = self.store.lock();
        let db = self.store.load()?;
        Ok(recent_activities(
            &db.activities,
            |entry| {
                entry.scope == Scope::Gamer
                    && match kind {
                        "logins" => entry.kind == EventKind::UserLogin,
                        "proofs" => entry.kind == EventKind::UserProofUploaded,
                        _ => true,
                    }
            },
            DEFAULT_FEED_LIMIT,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::Store;

    fn entry(n: usize) -> NewActivity {
        NewActivity::new(Scope::Gamer, EventKind::UserLogin, format!("entry {n}"))
    }

    #[test]
    fn append_fills_defaults() {
        let mut db = Snapshot::default();
        push_activity(&mut db, entry(0));

        let appended = &db.activities[0];
        assert_eq!(appended.actor, "system");
        assert_eq!(appended.actor_role, "system");
        assert_eq!(appended.severity, Severity::Info);
    }

    #[test]
    fn retention_bound_evicts_oldest_first() {
        let mut db = Snapshot::default();
        for n in 0..MAX_ACTIVITY_COUNT {
            push_activity(&mut db, entry(n));
        }
        assert_eq!(db.activities.len(), MAX_ACTIVITY_COUNT);
        let oldest_id = db.activities[0].id;

        push_activity(&mut db, entry(MAX_ACTIVITY_COUNT));
        assert_eq!(db.activities.len(), MAX_ACTIVITY_COUNT);
        assert!(db.activities.iter().all(|e| e.id != oldest_id));
        assert_eq!(db.activities[0].message, "entry 1");
        assert_eq!(
            db.activities.last().expect("entries").message,
            format!("entry {MAX_ACTIVITY_COUNT}")
        );
    }

    #[test]
    fn recent_activities_sorts_and_truncates() {
        let mut db = Snapshot::default();
        for n in 0..40 {
            push_activity(&mut db, entry(n));
        }
        // appended within the same instant; force distinct timestamps
        for (n, activity) in db.activities.iter_mut().enumerate() {
            activity.created_at += chrono::Duration::seconds(n as i64);
        }

        let recent = recent_activities(&db.activities, |_| true, DEFAULT_FEED_LIMIT);
        assert_eq!(recent.len(), DEFAULT_FEED_LIMIT);
        assert_eq!(recent[0].message, "entry 39");
        assert_eq!(recent.last().expect("entries").message, "entry 10");
    }

    #[test]
    fn feeds_filter_by_scope_and_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState {
            store: Arc::new(Store::new(dir.path().join("db.json"))),
        };

        let mut db = state.store.load().expect("load");
        push_activity(
            &mut db,
            NewActivity::new(Scope::Security, EventKind::UnauthorizedStaffLogin, "blocked")
                .severity(Severity::Warn),
        );
        push_activity(
            &mut db,
            NewActivity::new(Scope::StaffManagement, EventKind::TournamentCreated, "created"),
        );
        push_activity(
            &mut db,
            NewActivity::new(Scope::Gamer, EventKind::UserLogin, "login"),
        );
        push_activity(
            &mut db,
            NewActivity::new(Scope::Gamer, EventKind::UserProofUploaded, "proof"),
        );
        state.store.save(&db).expect("save");

        assert_eq!(state.manager_feed("all").expect("feed").len(), 2);
        assert_eq!(state.manager_feed("security").expect("feed").len(), 1);
        assert_eq!(state.manager_feed("staff").expect("feed").len(), 1);

        assert_eq!(state.employee_feed("all").expect("feed").len(), 2);
        let logins = state.employee_feed("logins").expect("feed");
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].kind, EventKind::UserLogin);
        let proofs = state.employee_feed("proofs").expect("feed");
        assert_eq!(proofs.len(), 1);
        assert_eq!(proofs[0].kind, EventKind::UserProofUploaded);
    }
}
