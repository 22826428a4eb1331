use chrono::{DateTime, Utc};
use derive_more::{From, Into};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::db::activity::{push_activity, EventKind, NewActivity, Scope, Severity};
use crate::db::user::is_staff_role;
use crate::db::UserId;
use crate::error::AppError;
use crate::util::parse_date;
use crate::AppState;

id_struct!(TournamentId, Tournament);

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TournamentStatus {
    Open,
    Closed,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub game: String,
    /// Advisory entry bar shown to players; not enforced.
    pub min_rank: String,
    /// 0 means unlimited.
    pub max_players: u32,
    /// Insertion-ordered, no duplicates, bounded by `max_players` when
    /// that is non-zero.
    pub registered_user_ids: Vec<UserId>,
    pub start_date: DateTime<Utc>,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

/// Tournament plus its registration count, the listing shape.
#[derive(Serialize, Debug, Clone)]
pub struct TournamentSummary {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub registered: usize,
}

impl Tournament {
    pub fn summary(self) -> TournamentSummary {
        let registered = self.registered_user_ids.len();
        TournamentSummary {
            tournament: self,
            registered,
        }
    }
}

/// Normalizes a caller-supplied player cap: absent or negative means 0
/// (unlimited).
fn clamp_max_players(max_players: Option<i64>) -> u32 {
    max_players.unwrap_or(0).max(0) as u32
}

fn required_fields(name: &str, game: &str, start_date: &str) -> Result<(), AppError> {
    if name.is_empty() || game.is_empty() || start_date.is_empty() {
        return Err(AppError::Validation(
            "name, game, and startDate are required".to_string(),
        ));
    }
    Ok(())
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn create_tournament(
        &self,
        name: &str,
        game: &str,
        min_rank: &str,
        max_players: Option<i64>,
        start_date: &str,
        actor: &str,
        actor_role: &str,
    ) -> Result<Tournament, AppError> {
        if !is_staff_role(actor_role) {
            return Err(AppError::Forbidden(
                "only employee or manager can create tournaments".to_string(),
            ));
        }
        required_fields(name, game, start_date)?;
        let start_date = parse_date(start_date)
            .ok_or_else(|| AppError::Validation("startDate is not a valid date".to_string()))?;

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let tournament = Tournament {
            id: TournamentId::random(),
            name: name.to_string(),
            game: game.to_string(),
            min_rank: min_rank.to_string(),
            max_players: clamp_max_players(max_players),
            registered_user_ids: Vec::new(),
            start_date,
            status: TournamentStatus::Open,
            created_at: Utc::now(),
        };
        db.tournaments.push(tournament.clone());
        push_activity(
            &mut db,
            NewActivity::new(
                Scope::StaffManagement,
                EventKind::TournamentCreated,
                format!("{actor} created tournament \"{}\".", tournament.name),
            )
            .actor_role(actor_role)
            .actor(actor),
        );
        self.store.save(&db)?;
        Ok(tournament)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn edit_tournament(
        &self,
        id: TournamentId,
        name: &str,
        game: &str,
        min_rank: &str,
        max_players: Option<i64>,
        start_date: &str,
        status: &str,
        actor: &str,
        actor_role: &str,
    ) -> Result<TournamentSummary, AppError> {
        if !is_staff_role(actor_role) {
            return Err(AppError::Forbidden(
                "only employee or manager can edit tournaments".to_string(),
            ));
        }
        required_fields(name, game, start_date)?;
        let start_date = parse_date(start_date)
            .ok_or_else(|| AppError::Validation("startDate is not a valid date".to_string()))?;

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let tournament = db
            .tournaments
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;

        tournament.name = name.to_string();
        tournament.game = game.to_string();
        tournament.min_rank = min_rank.to_string();
        tournament.max_players = clamp_max_players(max_players);
        tournament.start_date = start_date;
        // anything other than an explicit Closed reopens the tournament
        tournament.status = if status == "Closed" {
            TournamentStatus::Closed
        } else {
            TournamentStatus::Open
        };
        let updated = tournament.clone();

        push_activity(
            &mut db,
            NewActivity::new(
                Scope::StaffManagement,
                EventKind::TournamentUpdated,
                format!("{actor} updated tournament \"{}\".", updated.name),
            )
            .actor_role(actor_role)
            .actor(actor),
        );
        self.store.save(&db)?;
        Ok(updated.summary())
    }

    /// Removal is destructive, so it is audited at warn severity where
    /// edits are plain info.
    pub fn remove_tournament(
        &self,
        id: TournamentId,
        actor: &str,
        actor_role: &str,
    ) -> Result<Tournament, AppError> {
        if !is_staff_role(actor_role) {
            return Err(AppError::Forbidden(
                "only employee or manager can remove tournaments".to_string(),
            ));
        }

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let index = db
            .tournaments
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;
        let removed = db.tournaments.remove(index);

        push_activity(
            &mut db,
            NewActivity::new(
                Scope::StaffManagement,
                EventKind::TournamentRemoved,
                format!("{actor} removed tournament \"{}\".", removed.name),
            )
            .actor_role(actor_role)
            .actor(actor)
            .severity(Severity::Warn),
        );
        self.store.save(&db)?;
        Ok(removed)
    }

    /// Registration is open to any user and deliberately not audited; it is
    /// high-volume and low-value in the feeds.
    pub fn register_for_tournament(
        &self,
        id: TournamentId,
        user_id: Option<UserId>,
    ) -> Result<TournamentId, AppError> {
        let Some(user_id) = user_id else {
            return Err(AppError::Validation("userId is required".to_string()));
        };

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let tournament = db
            .tournaments
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;

        if tournament.registered_user_ids.contains(&user_id) {
            return Err(AppError::Conflict("already registered".to_string()));
        }
        if tournament.max_players > 0
            && tournament.registered_user_ids.len() >= tournament.max_players as usize
        {
            return Err(AppError::Conflict("tournament is full".to_string()));
        }

        tournament.registered_user_ids.push(user_id);
        let tournament_id = tournament.id;
        self.store.save(&db)?;
        Ok(tournament_id)
    }

    /// Tournaments ordered by start date, soonest first.
    pub fn list_tournaments(&self) -> Result<Vec<TournamentSummary>, AppError> {
        let _guard = self.store.lock();
        let db = self.store.load()?;
        Ok(db
            .tournaments
            .into_iter()
            .sorted_by(|a, b| a.start_date.cmp(&b.start_date))
            .map(Tournament::summary)
            .collect())
    }
}
