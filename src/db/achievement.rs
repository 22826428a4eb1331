use chrono::{DateTime, Utc};
use derive_more::{From, Into};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::db::activity::{push_activity, EventKind, NewActivity, Scope};
use crate::db::UserId;
use crate::error::AppError;
use crate::AppState;

/// Points awarded on approval when the reviewer does not supply a value.
pub const DEFAULT_AWARD_POINTS: i64 = 100;

id_struct!(AchievementId, Achievement);

/// Review state of an achievement. Pending is the initial state; a staff
/// decision moves it to Verified or Rejected, and nothing moves it back.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub user_id: UserId,
    /// Owner's name at submission time; renames do not update it.
    pub username: String,
    pub title: String,
    pub description: String,
    pub proof_file_name: String,
    /// Inline image payload (`data:image/...`), empty when no proof was
    /// attached.
    pub proof_data_url: String,
    pub date: DateTime<Utc>,
    pub verified: bool,
    pub points: i64,
    pub status: VerificationStatus,
}

/// Row of the staff review queue.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    pub id: AchievementId,
    pub user: String,
    pub game: String,
    pub proof: String,
    pub has_proof: bool,
    pub status: VerificationStatus,
}

/// Proof payload returned to reviewers.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProofImage {
    pub proof_file_name: String,
    pub proof_data_url: String,
}

impl AppState {
    pub fn submit_achievement(
        &self,
        user_id: Option<UserId>,
        title: Option<&str>,
        description: &str,
        proof_file_name: &str,
        proof_data_url: &str,
    ) -> Result<Achievement, AppError> {
        let Some(user_id) = user_id else {
            return Err(AppError::Validation(
                "userId and description are required".to_string(),
            ));
        };
        if description.is_empty() {
            return Err(AppError::Validation(
                "userId and description are required".to_string(),
            ));
        }
        if !proof_data_url.is_empty() && !proof_data_url.starts_with("data:image/") {
            return Err(AppError::Validation(
                "proofDataUrl must be an image data URL".to_string(),
            ));
        }

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let user = db
            .user(user_id)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        let username = user.username.clone();

        let achievement = Achievement {
            id: AchievementId::random(),
            user_id,
            username: username.clone(),
            title: match title {
                Some(title) if !title.is_empty() => title.to_string(),
                _ => "Achievement Submission".to_string(),
            },
            description: description.to_string(),
            proof_file_name: proof_file_name.to_string(),
            proof_data_url: proof_data_url.to_string(),
            date: Utc::now(),
            verified: false,
            points: 0,
            status: VerificationStatus::Pending,
        };
        db.achievements.push(achievement.clone());

        let (kind, message) = if proof_data_url.is_empty() {
            (
                EventKind::UserAchievementSubmitted,
                format!("User \"{username}\" submitted an achievement."),
            )
        } else {
            (
                EventKind::UserProofUploaded,
                format!("User \"{username}\" uploaded a score proof."),
            )
        };
        push_activity(
            &mut db,
            NewActivity::new(Scope::Gamer, kind, message)
                .actor_role("user")
                .actor(username),
        );
        self.store.save(&db)?;
        Ok(achievement)
    }

    /// Applies a staff review decision. Approval awards the supplied points,
    /// or [`DEFAULT_AWARD_POINTS`] when none are given; rejection zeroes
    /// them. Neither outcome restores Pending.
    pub fn review_achievement(
        &self,
        id: AchievementId,
        approved: bool,
        points: Option<i64>,
    ) -> Result<Achievement, AppError> {
        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let achievement = db
            .achievements
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| AppError::NotFound("achievement not found".to_string()))?;

        achievement.verified = approved;
        if approved {
            achievement.status = VerificationStatus::Verified;
            achievement.points = match points {
                Some(points) if points != 0 => points,
                _ => DEFAULT_AWARD_POINTS,
            };
        } else {
            achievement.status = VerificationStatus::Rejected;
            achievement.points = 0;
        }
        let reviewed = achievement.clone();
        self.store.save(&db)?;
        Ok(reviewed)
    }

    /// Achievements, newest first; optionally for one user, optionally
    /// narrowed to `verified` or `pending` (anything not yet verified).
    pub fn list_achievements(
        &self,
        user_id: Option<UserId>,
        status: &str,
    ) -> Result<Vec<Achievement>, AppError> {
        let _guard = self.store.lock();
        let db = self.store.load()?;
        Ok(db
            .achievements
            .into_iter()
            .filter(|entry| user_id.is_none_or(|id| entry.user_id == id))
            .filter(|entry| match status {
                "verified" => entry.verified,
                "pending" => !entry.verified,
                _ => true,
            })
            .sorted_by(|a, b| b.date.cmp(&a.date))
            .collect())
    }

    /// The staff review queue: everything not yet verified.
    pub fn pending_verifications(&self) -> Result<Vec<PendingVerification>, AppError> {
        let _guard = self.store.lock();
        let db = self.store.load()?;
        Ok(db
            .achievements
            .into_iter()
            .filter(|entry| !entry.verified)
            .map(|entry| PendingVerification {
                id: entry.id,
                user: entry.username,
                game: "N/A".to_string(),
                proof: if entry.proof_file_name.is_empty() {
                    "proof-not-provided".to_string()
                } else {
                    entry.proof_file_name
                },
                has_proof: !entry.proof_data_url.is_empty(),
                status: entry.status,
            })
            .collect())
    }

    pub fn achievement_proof(&self, id: AchievementId) -> Result<ProofImage, AppError> {
        let _guard = self.store.lock();
        let db = self.store.load()?;
        let achievement = db
            .achievements
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| AppError::NotFound("achievement not found".to_string()))?;
        if achievement.proof_data_url.is_empty() {
            return Err(AppError::NotFound("proof image not found".to_string()));
        }
        Ok(ProofImage {
            proof_file_name: if achievement.proof_file_name.is_empty() {
                "proof-image".to_string()
            } else {
                achievement.proof_file_name
            },
            proof_data_url: achievement.proof_data_url,
        })
    }
}
