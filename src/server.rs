//! REST API: routes, request/response bodies and handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tictactoe_core::{LeaderboardEntry, LeaderboardLimit, Player, PlayerRecord};
use tracing::{debug, error, info, instrument, warn};

use crate::error::ServiceError;
use crate::player_service::PlayerService;
use crate::session::{GameSession, SessionManager, TrackedPlayer};

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    players: PlayerService,
    sessions: SessionManager,
    default_limit: LeaderboardLimit,
}

impl AppState {
    /// Creates handler state.
    #[instrument(skip(players, sessions))]
    pub fn new(
        players: PlayerService,
        sessions: SessionManager,
        default_limit: LeaderboardLimit,
    ) -> Self {
        Self {
            players,
            sessions,
            default_limit,
        }
    }
}

/// JSON body extractor whose rejections use the error envelope.
///
/// An empty body reads as `T::default()`, so requests whose fields are all
/// optional may omit it.
#[derive(Debug, Clone, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ServiceError::MalformedBody(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| ServiceError::MalformedBody(e.to_string()))
    }
}

/// Request for creating a player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlayerRequest {
    /// Display name; trimmed before use.
    #[serde(default)]
    pub name: Option<String>,
}

/// Request for applying a result label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStatsRequest {
    /// `win`, `loss` or `tie`. Kept as raw JSON so a non-string value is
    /// rejected as an unrecognized label.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl UpdateStatsRequest {
    /// The result as label text; non-string values are rendered as JSON.
    pub fn label(&self) -> String {
        match &self.result {
            Some(serde_json::Value::String(label)) => label.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

/// Query string for the leaderboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardQuery {
    /// Raw limit; unusable values fall back to the default.
    pub limit: Option<String>,
}

/// Request for starting a game session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Player whose statistics the game counts toward.
    #[serde(default)]
    pub player_id: Option<String>,
    /// Symbol the tracked player occupies. Defaults to X.
    #[serde(default)]
    pub perspective: Option<Player>,
}

/// Request for making a move.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MakeMoveRequest {
    /// Board index (0-8, row-major).
    #[serde(default)]
    pub position: Option<i64>,
}

/// Success envelope carrying one player.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerResponse {
    success: bool,
    player: PlayerRecord,
}

/// Success envelope carrying all players.
#[derive(Debug, Clone, Serialize)]
pub struct PlayersResponse {
    success: bool,
    players: Vec<PlayerRecord>,
}

/// Success envelope carrying the leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    success: bool,
    leaderboard: Vec<LeaderboardEntry>,
}

/// Success envelope carrying a game session.
#[derive(Debug, Clone, Serialize)]
pub struct GameResponse {
    success: bool,
    game: GameSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    player: Option<PlayerRecord>,
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::InvalidName(_)
            | ServiceError::InvalidResult(_)
            | ServiceError::InvalidMove(_)
            | ServiceError::MalformedBody(_)
            | ServiceError::MissingField(_)
            | ServiceError::NameTaken => StatusCode::BAD_REQUEST,
            ServiceError::PlayerNotFound | ServiceError::GameNotFound => StatusCode::NOT_FOUND,
            ServiceError::Database(_) | ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            ErrorResponse {
                success: false,
                error: "Internal Server Error!".to_string(),
                msg: Some(self.to_string()),
            }
        } else {
            debug!(status = %status, error = %self, "Request rejected");
            ErrorResponse {
                success: false,
                error: self.to_string(),
                msg: None,
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Runs a blocking player-service call off the async runtime.
async fn blocking<T, F>(service: &PlayerService, f: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce(&PlayerService) -> Result<T, ServiceError> + Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/players", post(create_player).get(list_players))
        .route("/api/players/{id}", get(get_player))
        .route("/api/players/{id}/stats", post(update_stats))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/games", post(create_game))
        .route("/api/games/{id}", get(get_game).delete(delete_game))
        .route("/api/games/{id}/moves", post(make_move))
        .route("/api/games/{id}/reset", post(reset_game))
        .route("/api/games/{id}/record", post(record_game))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(log_request))
        .with_state(Arc::new(state))
}

async fn log_request(req: Request<axum::body::Body>, next: axum::middleware::Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    info!(method = %method, uri = %uri, status = %response.status(), "Request handled");
    response
}

async fn home() -> &'static str {
    "Welcome Home!"
}

async fn not_found() -> (StatusCode, &'static str) {
    (
        StatusCode::NOT_FOUND,
        "The page you're looking for does not exist",
    )
}

#[instrument(skip(state))]
async fn create_player(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), ServiceError> {
    let name = req.name.unwrap_or_default();
    let player = blocking(&state.players, move |svc| svc.create_player(&name)).await?;
    info!(player_id = %player.id(), "Player registered");
    Ok((
        StatusCode::CREATED,
        Json(PlayerResponse {
            success: true,
            player,
        }),
    ))
}

#[instrument(skip(state))]
async fn list_players(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlayersResponse>, ServiceError> {
    let players = blocking(&state.players, |svc| svc.list_players()).await?;
    Ok(Json(PlayersResponse {
        success: true,
        players,
    }))
}

#[instrument(skip(state))]
async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PlayerResponse>, ServiceError> {
    let player = blocking(&state.players, move |svc| svc.get_player(&id)).await?;
    Ok(Json(PlayerResponse {
        success: true,
        player,
    }))
}

#[instrument(skip(state))]
async fn update_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatsRequest>,
) -> Result<Json<PlayerResponse>, ServiceError> {
    let label = req.label();
    let player = blocking(&state.players, move |svc| svc.record_result(&id, &label)).await?;
    Ok(Json(PlayerResponse {
        success: true,
        player,
    }))
}

#[instrument(skip(state))]
async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ServiceError> {
    let limit = query
        .limit
        .as_deref()
        .map_or(state.default_limit, LeaderboardLimit::parse);
    let leaderboard = blocking(&state.players, move |svc| svc.leaderboard(limit)).await?;
    Ok(Json(LeaderboardResponse {
        success: true,
        leaderboard,
    }))
}

#[instrument(skip(state))]
async fn create_game(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ServiceError> {
    let (tracked, player) = match req.player_id {
        Some(player_id) => {
            let player = blocking(&state.players, move |svc| svc.get_player(&player_id)).await?;
            let perspective = req.perspective.unwrap_or(Player::X);
            (
                Some(TrackedPlayer::new(player.id().clone(), perspective)),
                Some(player),
            )
        }
        None => (None, None),
    };

    let game = state.sessions.create_session(tracked);
    Ok((
        StatusCode::CREATED,
        Json(GameResponse {
            success: true,
            game,
            player,
        }),
    ))
}

#[instrument(skip(state))]
async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ServiceError> {
    let game = state
        .sessions
        .get_session(&id)
        .ok_or(ServiceError::GameNotFound)?;
    Ok(Json(GameResponse {
        success: true,
        game,
        player: None,
    }))
}

/// Records the session's finished game if one is pending.
///
/// A failed write is logged and left pending so a later request retries it;
/// the move that ended the game still succeeds.
async fn settle(state: &AppState, game: GameSession) -> (GameSession, Option<PlayerRecord>) {
    let Some(event) = game.pending_result() else {
        return (game, None);
    };

    let recorded = blocking(&state.players, {
        let event = event.clone();
        move |svc| svc.record_game(&event)
    })
    .await;

    match recorded {
        Ok(recorded) => match state.sessions.mark_recorded(game.session_id(), event.game_id()) {
            Ok(game) => (game, Some(recorded.player().clone())),
            Err(e) => {
                warn!(error = %e, "Session vanished after recording");
                (game, Some(recorded.player().clone()))
            }
        },
        Err(e) => {
            warn!(game_id = %event.game_id(), error = %e, "Stats update failed, will retry");
            (game, None)
        }
    }
}

#[instrument(skip(state))]
async fn make_move(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MakeMoveRequest>,
) -> Result<Json<GameResponse>, ServiceError> {
    let position = req.position.ok_or(ServiceError::MissingField("Position"))?;
    let game = state.sessions.play(&id, position)?;
    let (game, player) = settle(&state, game).await;
    Ok(Json(GameResponse {
        success: true,
        game,
        player,
    }))
}

#[instrument(skip(state))]
async fn record_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ServiceError> {
    let game = state
        .sessions
        .get_session(&id)
        .ok_or(ServiceError::GameNotFound)?;
    let (game, player) = settle(&state, game).await;
    Ok(Json(GameResponse {
        success: true,
        game,
        player,
    }))
}

#[instrument(skip(state))]
async fn reset_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ServiceError> {
    let game = state.sessions.reset(&id)?;
    Ok(Json(GameResponse {
        success: true,
        game,
        player: None,
    }))
}

#[instrument(skip(state))]
async fn delete_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ServiceError> {
    let game = state.sessions.remove_session(&id)?;
    Ok(Json(GameResponse {
        success: true,
        game,
        player: None,
    }))
}
