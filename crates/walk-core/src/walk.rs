//! The walk driver: asks the model for one direction per step and tracks the resulting position.

use std::time::{Duration, Instant};

use crate::document::{ModelRun, Position, TemperatureBucket, TrialRecord};
use crate::error::{LlmError, WalkError};
use crate::llm::LlmClient;
use crate::prompt::build_step_prompt;

pub const STOP_TOKEN: &str = "STOP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// How a reply was interpreted. Only exact, case-sensitive tokens move the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Move(Direction),
    /// The model claimed its next move would leave the grid.
    Stop,
    Unrecognized,
}

impl Decision {
    /// Classifies a reply that has already been trimmed.
    pub fn classify(reply: &str) -> Self {
        if reply == STOP_TOKEN {
            return Decision::Stop;
        }
        Direction::ALL
            .into_iter()
            .find(|d| d.token() == reply)
            .map_or(Decision::Unrecognized, Decision::Move)
    }

    pub fn displacement(self) -> (i64, i64) {
        match self {
            Decision::Move(d) => d.delta(),
            Decision::Stop | Decision::Unrecognized => (0, 0),
        }
    }
}

pub fn displacement(reply: &str) -> (i64, i64) {
    Decision::classify(reply).displacement()
}

/// Parameters of one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkParams {
    /// Prompt context only; not enforced.
    pub grid_size: u32,
    pub steps: usize,
    pub temperatures: Vec<f64>,
    pub rounds_per_temperature: usize,
    /// Extra attempts per model call. Zero aborts on the first failure.
    pub retries: u32,
    pub retry_backoff: Duration,
}

/// Per-trial reply tallies, used for the batch log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionCounts {
    pub moves: usize,
    pub stops: usize,
    pub unrecognized: usize,
}

impl DecisionCounts {
    fn note(&mut self, decision: Decision) {
        match decision {
            Decision::Move(_) => self.moves += 1,
            Decision::Stop => self.stops += 1,
            Decision::Unrecognized => self.unrecognized += 1,
        }
    }

    fn add(&mut self, other: DecisionCounts) {
        self.moves += other.moves;
        self.stops += other.stops;
        self.unrecognized += other.unrecognized;
    }
}

async fn chat_with_retry(
    llm: &dyn LlmClient,
    model: &str,
    prompt: &str,
    temperature: f64,
    params: &WalkParams,
) -> Result<String, LlmError> {
    let mut attempt = 0;
    loop {
        match llm.chat(model, prompt.to_string(), temperature).await {
            Ok(reply) => return Ok(reply),
            Err(err) if attempt < params.retries => {
                attempt += 1;
                tracing::warn!(
                    "walk.llm.retry attempt={attempt} max={} error={err}",
                    params.retries
                );
                tokio::time::sleep(params.retry_backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Runs one trial from the origin. Each recorded position is where the walker stood before
/// that step's reply was applied.
pub async fn run_trial(
    params: &WalkParams,
    model: &str,
    temperature: f64,
    trial: usize,
    llm: &dyn LlmClient,
) -> Result<(TrialRecord, DecisionCounts), WalkError> {
    let mut record = TrialRecord::default();
    let mut counts = DecisionCounts::default();
    let mut position = Position::ORIGIN;

    for step in 0..params.steps {
        let prompt = build_step_prompt(params.grid_size, step, position);
        let raw = chat_with_retry(llm, model, &prompt, temperature, params)
            .await
            .map_err(|source| WalkError::Llm {
                temperature,
                trial,
                step,
                source,
            })?;
        let reply = raw.trim().to_string();
        let decision = Decision::classify(&reply);
        counts.note(decision);
        tracing::debug!(
            "walk.step temperature={temperature} trial={trial} step={step} position={position} reply={reply:?}"
        );

        record.push(position, reply);
        position = position.offset(decision.displacement());
    }

    Ok((record, counts))
}

/// Runs every trial at every temperature, strictly one model call at a time, and returns the
/// collected run. Nothing is written here; the caller decides where the document goes.
pub async fn run(
    params: &WalkParams,
    model: &str,
    llm: &dyn LlmClient,
) -> Result<ModelRun, WalkError> {
    let mut run = ModelRun::new(model);

    for &temperature in &params.temperatures {
        let mut bucket = TemperatureBucket::new(temperature);
        let mut counts = DecisionCounts::default();
        let start = Instant::now();

        for trial in 0..params.rounds_per_temperature {
            let (record, trial_counts) = run_trial(params, model, temperature, trial, llm).await?;
            counts.add(trial_counts);
            bucket.trials.push(record);
        }

        bucket.elapsed = start.elapsed();
        tracing::info!(
            "walk.temperature.done rounds={} temperature={temperature} elapsed_secs={:.2} moves={} stops={} unrecognized={}",
            params.rounds_per_temperature,
            bucket.elapsed.as_secs_f64(),
            counts.moves,
            counts.stops,
            counts.unrecognized,
        );
        run.buckets.push(bucket);
    }

    Ok(run)
}
