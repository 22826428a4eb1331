macro_rules! id_struct {
    ($id_struct_name:ident, $struct_name:ident $(,)?) => {
        id_struct!(
            $id_struct_name,
            concat!("[`", stringify!($struct_name), "`]"),
        );
    };
    ($id_struct_name:ident, $noun:expr $(,)?) => {
        #[doc = concat!("Identifier for a ", $noun, ".")]
        #[derive(
            Serialize,
            Deserialize,
            From,
            Into,
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
        )]
        #[serde(transparent)]
        pub struct $id_struct_name(pub uuid::Uuid);

        impl $id_struct_name {
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl std::fmt::Display for $id_struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

pub mod achievement;
pub mod activity;
pub mod leaderboard;
pub mod score;
mod store;
pub mod tournament;
pub mod user;

pub use achievement::{Achievement, AchievementId, VerificationStatus};
pub use activity::{ActivityEntry, ActivityId, EventKind, NewActivity, Scope, Severity};
pub use leaderboard::LeaderboardRow;
pub use score::{Score, ScoreId};
pub use store::Store;
pub use tournament::{Tournament, TournamentId, TournamentStatus};
pub use user::{PublicUser, Role, User, UserId, UserStatus};

use serde::{Deserialize, Serialize};

/// The whole persisted document. Every operation loads it, mutates it in
/// memory, and writes it back as one unit.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub scores: Vec<Score>,
    pub achievements: Vec<Achievement>,
    pub tournaments: Vec<Tournament>,
    pub activities: Vec<ActivityEntry>,
}

impl Snapshot {
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    /// Looks up a user by username, ignoring case.
    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        let needle = username.to_lowercase();
        self.users
            .iter()
            .find(|user| user.username.to_lowercase() == needle)
    }
}

/// Operational counters for the manager dashboard.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_users: usize,
    pub active_users: usize,
    pub active_games: usize,
    /// Load sampling is not implemented; fixed placeholder.
    pub system_load: String,
    pub security_alerts: usize,
}

impl crate::AppState {
    pub fn system_stats(&self) -> Result<SystemStats, crate::AppError> {
        use itertools::Itertools;

        let _guard = self.store.lock();
        let db = self.store.load()?;
        Ok(SystemStats {
            total_users: db.users.len(),
            active_users: db
                .users
                .iter()
                .filter(|user| user.status == UserStatus::Active)
                .count(),
            active_games: db.scores.iter().map(|score| &score.game).unique().count(),
            system_load: "42%".to_string(),
            security_alerts: db
                .activities
                .iter()
                .filter(|entry| entry.scope == Scope::Security && entry.severity == Severity::Warn)
                .count(),
        })
    }
}
