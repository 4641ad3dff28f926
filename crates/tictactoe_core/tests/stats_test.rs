//! Tests for statistics aggregation and leaderboard ranking.

use chrono::NaiveDateTime;
use tictactoe_core::{
    GameResult, LeaderboardLimit, Outcome, Player, PlayerRecord, StatsError, apply_result,
    derive_result, rank_leaderboard,
};

fn epoch() -> NaiveDateTime {
    chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc()
}

fn record(name: &str, wins: u32, losses: u32, ties: u32) -> PlayerRecord {
    PlayerRecord::new(
        format!("id-{name}"),
        name.to_string(),
        wins,
        losses,
        ties,
        wins + losses + ties,
        epoch(),
    )
}

#[test]
fn test_derive_result_from_x_perspective() {
    assert_eq!(derive_result(Outcome::Winner(Player::X), Player::X), GameResult::Win);
    assert_eq!(derive_result(Outcome::Winner(Player::O), Player::X), GameResult::Loss);
    assert_eq!(derive_result(Outcome::Draw, Player::X), GameResult::Tie);
}

#[test]
fn test_derive_result_depends_on_perspective() {
    let outcome = Outcome::Winner(Player::X);
    assert_eq!(derive_result(outcome, Player::X), GameResult::Win);
    assert_eq!(derive_result(outcome, Player::O), GameResult::Loss);
    assert_eq!(derive_result(Outcome::Draw, Player::O), GameResult::Tie);
}

#[test]
fn test_apply_win() {
    let before = record("Ada", 2, 1, 0);
    assert!(before.is_consistent());

    let after = apply_result(&before, GameResult::Win).unwrap();

    assert_eq!(*after.wins(), 3);
    assert_eq!(*after.losses(), 1);
    assert_eq!(*after.ties(), 0);
    assert_eq!(*after.total_games(), 4);
    assert!(after.is_consistent());
    assert_eq!(after.id(), before.id());
    assert_eq!(after.name(), before.name());
    assert_eq!(after.created_at(), before.created_at());
}

#[test]
fn test_apply_loss_and_tie() {
    let start = record("Bo", 0, 0, 0);
    let after = apply_result(&apply_result(&start, GameResult::Loss).unwrap(), GameResult::Tie).unwrap();

    assert_eq!(*after.wins(), 0);
    assert_eq!(*after.losses(), 1);
    assert_eq!(*after.ties(), 1);
    assert_eq!(*after.total_games(), 2);
    assert!(after.is_consistent());
    // Input untouched.
    assert_eq!(*start.total_games(), 0);
}

#[test]
fn test_apply_result_at_counter_limit_is_rejected() {
    let maxed = PlayerRecord::new(
        "id-max".to_string(),
        "Max".to_string(),
        u32::MAX,
        0,
        0,
        u32::MAX,
        epoch(),
    );

    let err = apply_result(&maxed, GameResult::Win).unwrap_err();
    assert_eq!(err, StatsError::CounterOverflow("win"));

    let err = apply_result(&maxed, GameResult::Tie).unwrap_err();
    assert_eq!(err, StatsError::CounterOverflow("total_games"));
    assert_eq!(*maxed.wins(), u32::MAX);
}

#[test]
fn test_result_labels_parse() {
    assert_eq!("win".parse::<GameResult>(), Ok(GameResult::Win));
    assert_eq!("loss".parse::<GameResult>(), Ok(GameResult::Loss));
    assert_eq!("tie".parse::<GameResult>(), Ok(GameResult::Tie));
}

#[test]
fn test_unrecognized_result_label_rejected() {
    for label in ["draw", "WIN", "", "victory"] {
        let err = label.parse::<GameResult>().unwrap_err();
        assert_eq!(err, StatsError::UnrecognizedResult(label.to_string()));
        assert!(err.to_string().contains("win"));
    }
}

#[test]
fn test_leaderboard_orders_and_truncates() {
    let records = vec![
        record("Cy", 1, 2, 0),  // 1 win, 33.3%
        record("Di", 2, 1, 0),  // 2 wins, 66.7%
        record("Ed", 2, 2, 0),  // 2 wins, 50.0%
    ];

    let board = rank_leaderboard(&records, LeaderboardLimit::new(2));

    assert_eq!(board.len(), 2);
    assert_eq!(board[0].name(), "Di");
    assert_eq!(board[0].win_rate(), "66.7");
    assert_eq!(board[1].name(), "Ed");
    assert_eq!(board[1].win_rate(), "50.0");
}

#[test]
fn test_leaderboard_excludes_players_without_games() {
    let mut records = vec![record("Fay", 0, 0, 0), record("Gus", 0, 1, 0)];
    // Inconsistent on purpose: the filter looks at total_games only.
    records.push(PlayerRecord::new(
        "id-Hal".to_string(),
        "Hal".to_string(),
        5,
        0,
        0,
        0,
        epoch(),
    ));

    let board = rank_leaderboard(&records, LeaderboardLimit::default());

    assert_eq!(board.len(), 1);
    assert_eq!(board[0].name(), "Gus");
    assert_eq!(board[0].win_rate(), "0.0");
}

#[test]
fn test_leaderboard_empty_input() {
    assert!(rank_leaderboard(&[], LeaderboardLimit::default()).is_empty());
}

#[test]
fn test_leaderboard_default_limit_is_ten() {
    let records: Vec<PlayerRecord> = (0..15)
        .map(|i| record(&format!("p{i:02}"), i, 1, 0))
        .collect();

    let board = rank_leaderboard(&records, LeaderboardLimit::parse("nope"));

    assert_eq!(board.len(), 10);
    assert_eq!(board[0].name(), "p14");
    assert_eq!(board[9].name(), "p05");
}

#[test]
fn test_leaderboard_ties_broken_by_name() {
    let records = vec![record("Zed", 1, 1, 0), record("Amy", 1, 1, 0)];
    let board = rank_leaderboard(&records, LeaderboardLimit::default());
    assert_eq!(board[0].name(), "Amy");
    assert_eq!(board[1].name(), "Zed");
}

#[test]
fn test_leaderboard_entry_wire_shape() {
    let board = rank_leaderboard(&[record("Ivy", 2, 1, 0)], LeaderboardLimit::default());
    let json = serde_json::to_value(&board[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": "id-Ivy",
            "name": "Ivy",
            "wins": 2,
            "losses": 1,
            "ties": 0,
            "totalGames": 3,
            "winRate": "66.7",
        })
    );
}
