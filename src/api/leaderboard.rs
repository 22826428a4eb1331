use axum::body::Body;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::leaderboard::GLOBAL_GAME;
use crate::db::LeaderboardRow;
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct LeaderboardQuery {
    /// Exact game name, or the "Global" sentinel (the default) for all
    /// games combined.
    pub game: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LeaderboardResponse {
    pub players: Vec<LeaderboardRow>,
}

impl RequestBody for LeaderboardQuery {
    type Response = LeaderboardResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let players = state.leaderboard(self.game.as_deref().unwrap_or(GLOBAL_GAME))?;
        Ok(LeaderboardResponse { players })
    }
}

impl IntoResponse for LeaderboardResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::Store;

    #[tokio::test]
    async fn ranks_players_for_one_game() -> Result<(), AppError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState {
            store: Arc::new(Store::new(dir.path().join("db.json"))),
        };

        let a = state.register_user("nova", "nova@x.io", "pw123", None)?;
        let b = state.register_user("lin", "lin@x.io", "pw123", None)?;
        state.submit_score(Some(a.id), "Valorant", "1,200", "2024-05-01")?;
        state.submit_score(Some(b.id), "Valorant", "Platinum", "2024-05-01")?;

        let response = LeaderboardQuery {
            game: Some("Valorant".to_string()),
        }
        .request(state)
        .await?;

        assert_eq!(response.players.len(), 2);
        assert_eq!(response.players[0].rank, 1);
        assert_eq!(response.players[0].name, "nova");
        assert_eq!(response.players[0].score, "1,200");
        assert_eq!(response.players[1].rank, 2);
        assert_eq!(response.players[1].score, "0");

        Ok(())
    }
}
