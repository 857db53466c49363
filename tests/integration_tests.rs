//! Integration tests for the full play loop: hints, cascades, config and snapshots

use match_cascade::core::{GameConfig, Grid, TurnSnapshot, TurnStateMachine};
use match_cascade::engine::{apply_best_swap, find_swaps, has_legal_move, HintError};
use match_cascade::runner::{load_config, run, RunnerArgs};
use match_cascade::types::{TurnPhase, TICK_MS};

#[test]
fn test_game_lifecycle() {
    let mut machine = TurnStateMachine::new(GameConfig::default()).unwrap();
    assert!(!machine.is_running());

    machine.start();
    assert!(machine.is_running());
    assert!(machine.grid().is_full());
    assert_eq!(machine.phase(), TurnPhase::Idle);

    assert!(machine.pause());
    assert!(machine.is_paused());
    assert!(machine.resume());

    machine.stop();
    assert!(!machine.is_running());
    assert!(!machine.tick(TICK_MS));
}

#[test]
fn test_hinted_turns_keep_board_consistent() {
    let config = GameConfig::builder().seed(7).build().unwrap();
    let mut machine = TurnStateMachine::new(config).unwrap();
    machine.start();

    for _ in 0..10 {
        if !has_legal_move(machine.grid()) {
            break;
        }
        let before = machine.score();
        apply_best_swap(&mut machine).unwrap();
        machine.settle();

        assert!(machine.is_idle());
        assert!(machine.grid().is_full());
        assert!(machine.score() >= before);
        for token in machine.grid().tokens() {
            assert_eq!(
                machine.grid().token_at(token.position).map(|t| t.id),
                Some(token.id)
            );
        }
    }
    assert!(machine.moves() > 0);
}

#[test]
fn test_hint_on_deadlocked_board() {
    let grid = Grid::parse(
        "
        RGB
        GBR
        ",
    )
    .unwrap();
    assert!(find_swaps(&grid).is_empty());

    let mut machine = TurnStateMachine::from_grid(grid, GameConfig::default()).unwrap();
    machine.start();
    assert_eq!(apply_best_swap(&mut machine), Err(HintError::NoLegalMove));
}

#[test]
fn test_snapshot_serializes_to_json() {
    let grid = Grid::parse("RGB\nGBR").unwrap();
    let machine = TurnStateMachine::from_grid(grid, GameConfig::default()).unwrap();
    let snap = machine.snapshot();

    let json = serde_json::to_string(&snap).unwrap();
    assert!(json.contains("\"phase\":\"idle\""));
    assert!(json.contains("\"board\":[\"RGB\",\"GBR\"]"));

    let back: TurnSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn test_config_file_drives_runner() {
    let path = std::env::temp_dir().join(format!("match-cascade-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"width": 5, "height": 5, "seed": 11, "fall_delay_ms": 32}"#).unwrap();

    let args = RunnerArgs {
        config: Some(path.clone()),
        seed: Some(12),
        ..RunnerArgs::default()
    };
    let config = load_config(&args).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!((config.width, config.height), (5, 5));
    assert_eq!(config.seed, 12);
    assert_eq!(config.fall_delay_ms, 32);

    let summary = run(config, 2).unwrap();
    assert_eq!(summary.final_state.board.len(), 5);
    assert!(!summary.final_state.running);
}

#[test]
fn test_bad_config_file_is_an_error() {
    let args = RunnerArgs {
        config: Some("/nonexistent/match-cascade.json".into()),
        ..RunnerArgs::default()
    };
    let err = load_config(&args).unwrap_err();
    assert!(err.to_string().contains("loading config"));
}
