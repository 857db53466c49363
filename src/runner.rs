//! Headless autoplay: plays hinted swaps on a fixed timestep and reports the result.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::{GameConfig, TurnEvent, TurnSnapshot, TurnStateMachine};
use crate::engine::{apply_best_swap, has_legal_move};
use crate::types::TICK_MS;

pub const DEFAULT_TURNS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerArgs {
    pub seed: Option<u32>,
    pub turns: u32,
    pub config: Option<PathBuf>,
    pub json: bool,
}

impl Default for RunnerArgs {
    fn default() -> Self {
        Self {
            seed: None,
            turns: DEFAULT_TURNS,
            config: None,
            json: false,
        }
    }
}

/// Parse `--seed N`, `--turns N`, `--config PATH` and `--json`
pub fn parse_runner_args(args: &[String]) -> Result<RunnerArgs> {
    let mut parsed = RunnerArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --seed"))?;
                parsed.seed = Some(
                    v.parse::<u32>()
                        .map_err(|_| anyhow!("invalid --seed value: {}", v))?,
                );
            }
            "--turns" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --turns"))?;
                parsed.turns = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --turns value: {}", v))?;
            }
            "--config" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                parsed.config = Some(PathBuf::from(v));
            }
            "--json" => parsed.json = true,
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(parsed)
}

/// Config file (or defaults), then environment, then `--seed`
pub fn load_config(args: &RunnerArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    config.apply_env().context("applying environment overrides")?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub turns_played: u32,
    pub matches: u32,
    pub longest_cascade: u32,
    pub simulated_ms: u64,
    pub deadlocked: bool,
    pub final_state: TurnSnapshot,
}

/// Play up to `turns` hinted swaps, ticking `TICK_MS` at a time until each
/// turn settles.
pub fn run(config: GameConfig, turns: u32) -> Result<RunSummary> {
    let mut machine = TurnStateMachine::new(config)?;
    machine.start();
    machine.drain_events();

    let mut summary = RunSummary {
        turns_played: 0,
        matches: 0,
        longest_cascade: 0,
        simulated_ms: 0,
        deadlocked: false,
        final_state: machine.snapshot(),
    };

    for turn in 1..=turns {
        if !has_legal_move(machine.grid()) {
            warn!(turn, "no legal move left");
            summary.deadlocked = true;
            break;
        }

        let hint = apply_best_swap(&mut machine)?;
        info!(
            turn,
            from = %hint.from,
            to = %hint.to,
            shape = hint.shape.as_str(),
            preview = hint.score,
            "swap"
        );

        while !machine.is_idle() {
            machine.tick(TICK_MS);
            summary.simulated_ms += u64::from(TICK_MS);
        }

        for event in machine.drain_events() {
            match event {
                TurnEvent::Matched {
                    selection,
                    score_delta,
                    cascade,
                } => {
                    summary.matches += selection.len() as u32;
                    summary.longest_cascade = summary.longest_cascade.max(cascade);
                    for candidate in &selection {
                        debug!(%candidate, cascade, "cleared");
                    }
                    info!(turn, cascade, score_delta, "resolved");
                }
                TurnEvent::CascadeCapped { passes } => {
                    warn!(turn, passes, "turn ended at cascade limit");
                }
                TurnEvent::SwapRejected { reason, .. } => {
                    warn!(turn, reason = reason.code(), "swap rejected");
                }
                _ => {}
            }
        }
        summary.turns_played = turn;
    }

    machine.stop();
    summary.final_state = machine.snapshot();
    Ok(summary)
}

pub fn render_text(summary: &RunSummary) -> String {
    let mut out = String::new();
    for row in &summary.final_state.board {
        out.push_str(row);
        out.push('\n');
    }
    out.push_str(&format!(
        "turns: {}  matches: {}  longest cascade: {}  score: {}",
        summary.turns_played,
        summary.matches,
        summary.longest_cascade,
        summary.final_state.score
    ));
    if summary.deadlocked {
        out.push_str("  (no legal move left)");
    }
    out
}
