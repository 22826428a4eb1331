use chrono::{DateTime, Utc};
use derive_more::{From, Into};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::db::activity::{push_activity, EventKind, NewActivity, Scope};
use crate::db::UserId;
use crate::error::AppError;
use crate::util::parse_date;
use crate::AppState;

id_struct!(ScoreId, Score);

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: ScoreId,
    pub user_id: UserId,
    /// Owner's name at submission time; renames do not update it.
    pub username: String,
    pub game: String,
    /// Raw score exactly as entered. May be a rank label with no digits.
    pub score: String,
    pub numeric_score: i64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Integer value of a raw score string: its digit characters, in order, or
/// 0 when there are none. "1,200" -> 1200, "Platinum" -> 0.
pub fn numeric_score(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

impl AppState {
    pub fn submit_score(
        &self,
        user_id: Option<UserId>,
        game: &str,
        score: &str,
        date: &str,
    ) -> Result<Score, AppError> {
        let required = "userId, game, score, and date are required";
        let Some(user_id) = user_id else {
            return Err(AppError::Validation(required.to_string()));
        };
        if game.is_empty() || score.is_empty() || date.is_empty() {
            return Err(AppError::Validation(required.to_string()));
        }
        let date = parse_date(date)
            .ok_or_else(|| AppError::Validation("date is not a valid date".to_string()))?;

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let user = db
            .user(user_id)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        let entry = Score {
            id: ScoreId::random(),
            user_id,
            username: user.username.clone(),
            game: game.to_string(),
            score: score.to_string(),
            numeric_score: numeric_score(score),
            date,
            created_at: Utc::now(),
        };
        let username = user.username.clone();

        db.scores.push(entry.clone());
        push_activity(
            &mut db,
            NewActivity::new(
                Scope::Gamer,
                EventKind::UserScoreSubmitted,
                format!("User \"{username}\" submitted a score for {game}."),
            )
            .actor_role("user")
            .actor(username),
        );
        self.store.save(&db)?;
        Ok(entry)
    }

    /// Scores, newest play date first, optionally for one user.
    pub fn list_scores(&self, user_id: Option<UserId>) -> Result<Vec<Score>, AppError> {
        let _guard = self.store.lock();
        let db = self.store.load()?;
        Ok(db
            .scores
            .into_iter()
            .filter(|score| user_id.is_none_or(|id| score.user_id == id))
            .sorted_by(|a, b| b.date.cmp(&a.date))
            .collect())
    }
}
