use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::tournament::TournamentSummary;
use crate::db::{Tournament, TournamentId, UserId};
use crate::error::AppError;
use crate::traits::RequestBody;
use crate::AppState;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct TournamentsQuery {}

#[derive(Serialize, Debug)]
pub struct TournamentsResponse {
    pub tournaments: Vec<TournamentSummary>,
}

impl RequestBody for TournamentsQuery {
    type Response = TournamentsResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let tournaments = state.list_tournaments()?;
        Ok(TournamentsResponse { tournaments })
    }
}

impl IntoResponse for TournamentsResponse {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTournamentRequest {
    pub name: Option<String>,
    pub game: Option<String>,
    pub min_rank: Option<String>,
    pub max_players: Option<i64>,
    pub start_date: Option<String>,
    pub actor: Option<String>,
    pub actor_role: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CreateTournamentResponse {
    pub tournament: Tournament,
}

impl RequestBody for CreateTournamentRequest {
    type Response = CreateTournamentResponse;

    async fn request(self, state: AppState) -> Result<Self::Response, AppError> {
        let tournament = state.create_tournament(
            self.name.as_deref().unwrap_or_default(),
            self.game.as_deref().unwrap_or_default(),
            self.min_rank.as_deref().unwrap_or_default(),
            self.max_players,
            self.start_date.as_deref().unwrap_or_default(),
            self.actor.as_deref().unwrap_or("staff"),
            self.actor_role.as_deref().unwrap_or("employee"),
        )?;
        Ok(CreateTournamentResponse { tournament })
    }
}

impl IntoResponse for CreateTournamentResponse {
    fn into_response(self) -> Response<Body> {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EditTournamentRequest {
    pub name: Option<String>,
    pub game: Option<String>,
    pub min_rank: Option<String>,
    pub max_players: Option<i64>,
    pub start_date: Option<String>,
    /// Forced to exactly "Closed" or else "Open".
    pub status: Option<String>,
    pub actor: Option<String>,
    pub actor_role: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct EditTournamentResponse {
    pub message: String,
    pub tournament: TournamentSummary,
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
    Json(body): Json<EditTournamentRequest>,
) -> Result<Json<EditTournamentResponse>, AppError> {
    let tournament = state.edit_tournament(
        id,
        body.name.as_deref().unwrap_or_default(),
        body.game.as_deref().unwrap_or_default(),
        body.min_rank.as_deref().unwrap_or_default(),
        body.max_players,
        body.start_date.as_deref().unwrap_or_default(),
        body.status.as_deref().unwrap_or("Open"),
        body.actor.as_deref().unwrap_or("staff"),
        body.actor_role.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(EditTournamentResponse {
        message: "tournament updated".to_string(),
        tournament,
    }))
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveTournamentRequest {
    pub actor: Option<String>,
    pub actor_role: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct RemoveTournamentResponse {
    pub message: String,
    pub tournament: Tournament,
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
    Json(body): Json<RemoveTournamentRequest>,
) -> Result<Json<RemoveTournamentResponse>, AppError> {
    let tournament = state.remove_tournament(
        id,
        body.actor.as_deref().unwrap_or("staff"),
        body.actor_role.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(RemoveTournamentResponse {
        message: "tournament removed".to_string(),
        tournament,
    }))
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterTournamentRequest {
    pub user_id: Option<UserId>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTournamentResponse {
    pub message: String,
    pub tournament_id: TournamentId,
}

pub async fn register(
    State(state): State<AppState>,
    Path(id): Path<TournamentId>,
    Json(body): Json<RegisterTournamentRequest>,
) -> Result<Json<RegisterTournamentResponse>, AppError> {
    let tournament_id = state.register_for_tournament(id, body.user_id)?;
    Ok(Json(RegisterTournamentResponse {
        message: "registered".to_string(),
        tournament_id,
    }))
}
