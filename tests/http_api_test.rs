//! End-to-end tests for the REST API.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use tictactoe_core::LeaderboardLimit;
use tictactoe_stats::{AppState, PlayerRepository, PlayerService, SessionManager, router};

fn setup_app() -> (NamedTempFile, Router) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = PlayerRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");

    let state = AppState::new(
        PlayerService::new(repo),
        SessionManager::new(),
        LeaderboardLimit::default(),
    );
    (db_file, router(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, json)
}

async fn create_player(app: &Router, name: &str) -> String {
    let (status, body) = send(app, Method::POST, "/api/players", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["player"]["id"].as_str().unwrap().to_string()
}

async fn start_game(app: &Router, player_id: &str, perspective: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/games",
        Some(json!({ "playerId": player_id, "perspective": perspective })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["game"]["sessionId"].as_str().unwrap().to_string()
}

async fn play(app: &Router, game: &str, moves: &[i64]) -> Value {
    let mut last = Value::Null;
    for &m in moves {
        let (status, body) = send(
            app,
            Method::POST,
            &format!("/api/games/{}/moves", game),
            Some(json!({ "position": m })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "move {} failed: {}", m, body);
        last = body;
    }
    last
}

#[tokio::test]
async fn test_home_and_fallback() {
    let (_db, app) = setup_app();

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Welcome Home!".to_string()));

    let (status, body) = send(&app, Method::GET, "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        Value::String("The page you're looking for does not exist".to_string())
    );
}

#[tokio::test]
async fn test_create_and_fetch_player() {
    let (_db, app) = setup_app();
    let (status, body) = send(&app, Method::POST, "/api/players", Some(json!({ "name": "  Ada " }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["player"]["name"], "Ada");
    assert_eq!(body["player"]["totalGames"], 0);

    let id = body["player"]["id"].as_str().unwrap();
    let (status, body) = send(&app, Method::GET, &format!("/api/players/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player"]["name"], "Ada");

    let (status, body) = send(&app, Method::GET, "/api/players", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["players"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_player_errors() {
    let (_db, app) = setup_app();

    let (status, body) = send(&app, Method::POST, "/api/players", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": "Name is required" }));

    create_player(&app, "Bo").await;
    let (status, body) = send(&app, Method::POST, "/api/players", Some(json!({ "name": "Bo" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Player name already exists");
}

#[tokio::test]
async fn test_unknown_player() {
    let (_db, app) = setup_app();
    let (status, body) = send(&app, Method::GET, "/api/players/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Player not found" }));
}

#[tokio::test]
async fn test_update_stats() {
    let (_db, app) = setup_app();
    let id = create_player(&app, "Cy").await;
    let uri = format!("/api/players/{}/stats", id);

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "result": "win" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player"]["wins"], 1);
    assert_eq!(body["player"]["totalGames"], 1);

    let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "result": "victory" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/players/missing/stats",
        Some(json!({ "result": "win" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leaderboard_ranking_and_limit() {
    let (_db, app) = setup_app();
    let a = create_player(&app, "Alpha").await;
    let b = create_player(&app, "Beta").await;
    create_player(&app, "Idle").await;

    for (id, result) in [(&a, "win"), (&a, "loss"), (&b, "win"), (&b, "win"), (&b, "tie")] {
        send(
            &app,
            Method::POST,
            &format!("/api/players/{}/stats", id),
            Some(json!({ "result": result })),
        )
        .await;
    }

    let (status, body) = send(&app, Method::GET, "/api/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let board = body["leaderboard"].as_array().unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["name"], "Beta");
    assert_eq!(board[0]["winRate"], "66.7");
    assert_eq!(board[1]["name"], "Alpha");
    assert_eq!(board[1]["winRate"], "50.0");

    let (_, body) = send(&app, Method::GET, "/api/leaderboard?limit=1", None).await;
    assert_eq!(body["leaderboard"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/api/leaderboard?limit=abc", None).await;
    assert_eq!(body["leaderboard"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_full_game_records_stats_once() {
    let (_db, app) = setup_app();
    let player = create_player(&app, "Dee").await;
    let game = start_game(&app, &player, "X").await;

    let body = play(&app, &game, &[0, 3, 1, 4, 2]).await;
    assert_eq!(body["game"]["state"]["gameOver"], true);
    assert_eq!(body["game"]["state"]["winner"], "X");
    assert_eq!(body["game"]["state"]["winningCombo"], json!([0, 1, 2]));
    assert_eq!(body["game"]["state"]["currentPlayer"], "X");
    assert_eq!(body["game"]["statsRecorded"], true);
    assert_eq!(body["player"]["wins"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/games/{}/moves", game),
        Some(json!({ "position": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Game is already over");

    let (status, _) = send(&app, Method::POST, &format!("/api/games/{}/record", game), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &format!("/api/players/{}", player), None).await;
    assert_eq!(body["player"]["wins"], 1);
    assert_eq!(body["player"]["totalGames"], 1);
}

#[tokio::test]
async fn test_perspective_o_records_loss_and_reset_counts_again() {
    let (_db, app) = setup_app();
    let player = create_player(&app, "Eli").await;
    let game = start_game(&app, &player, "O").await;

    let body = play(&app, &game, &[0, 3, 1, 4, 2]).await;
    assert_eq!(body["player"]["losses"], 1);

    let (status, body) = send(&app, Method::POST, &format!("/api/games/{}/reset", game), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["state"]["gameOver"], false);
    assert_eq!(body["game"]["statsRecorded"], false);

    // X O X / X O O / O X X: a draw.
    let body = play(&app, &game, &[0, 1, 2, 4, 3, 5, 7, 6, 8]).await;
    assert_eq!(body["game"]["state"]["winner"], "DRAW");
    assert_eq!(body["player"]["ties"], 1);
    assert_eq!(body["player"]["totalGames"], 2);
}

#[tokio::test]
async fn test_move_errors() {
    let (_db, app) = setup_app();
    let (status, body) = send(&app, Method::POST, "/api/games", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let game = body["game"]["sessionId"].as_str().unwrap().to_string();
    let uri = format!("/api/games/{}/moves", game);

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "position": 9 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Position 9 is out of range (must be 0-8)");

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Position is required");

    let (status, _) = send(&app, Method::POST, "/api/games/missing/moves", Some(json!({ "position": 0 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/api/games", Some(json!({ "playerId": "ghost" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mistyped_bodies_use_error_envelope() {
    let (_db, app) = setup_app();
    let id = create_player(&app, "Fay").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/players/{}/stats", id),
        Some(json!({ "result": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Result must be \"win\", \"loss\", or \"tie\""),
        "unexpected error: {}",
        body
    );

    let (status, body) = send(&app, Method::POST, "/api/players", Some(json!({ "name": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    let (status, body) = send(&app, Method::POST, "/api/games", Some(json!({ "perspective": "Z" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, player) = send(&app, Method::GET, &format!("/api/players/{}", id), None).await;
    assert_eq!(player["player"]["totalGames"], 0);
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let (_db, app) = setup_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/players")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_untracked_game_without_body() {
    let (_db, app) = setup_app();
    let (status, body) = send(&app, Method::POST, "/api/games", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["game"]["tracked"], Value::Null);
    assert_eq!(body["game"]["state"]["currentPlayer"], "X");
}

#[tokio::test]
async fn test_delete_game() {
    let (_db, app) = setup_app();
    let (_, body) = send(&app, Method::POST, "/api/games", None).await;
    let game = body["game"]["sessionId"].as_str().unwrap().to_string();
    let uri = format!("/api/games/{}", game);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["sessionId"], game.as_str());

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Game not found" }));
}
