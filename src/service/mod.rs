/// Generation service: new mazes and quiz questions from an external
/// generator, with validation and an offline fallback.
///
/// ## Collaborators
///   - `MazeSource`     — produces a maze layout (`{"layout": [...]}`)
///   - `QuestionSource` — produces a multiple-choice question
///     (`{"question": ..., "options": [...], "correctIndex": n}`)
///
/// `command::CommandBackend` implements both by running a configured shell
/// command. `local::LocalQuestions` generates questions offline and is used
/// when no command is configured. Requests run on a background thread
/// (`worker::Pending`) so the game loop never blocks on them.
///
/// ## Failure policy
///   - Maze: any error is returned; the caller keeps the current level.
///   - Question: any error is logged and replaced by `fallback_question()`.
///   No retries.

pub mod command;
pub mod local;
pub mod prompt;
pub mod worker;

use serde::Deserialize;

use crate::config::GeneratorConfig;
use crate::sim::level::{self, LevelDef, LevelError};
use crate::sim::quiz::{Difficulty, Question};

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("no generator command configured")]
    NotConfigured,
    #[error("could not run generator: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("generator exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("malformed generator response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid maze: {0}")]
    InvalidMaze(#[from] LevelError),
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
    #[error("question was already asked: {0}")]
    RepeatedQuestion(String),
    #[error("generator worker stopped without answering")]
    WorkerLost,
}

pub trait MazeSource: Send {
    fn generate_maze(&mut self, width: usize, height: usize) -> Result<LevelDef, ServiceError>;
}

pub trait QuestionSource: Send {
    fn generate_question(
        &mut self,
        history: &[String],
        difficulty: Difficulty,
    ) -> Result<Question, ServiceError>;
}

/// Stands in for the maze generator when no command is configured.
pub struct Unconfigured;

impl MazeSource for Unconfigured {
    fn generate_maze(&mut self, _width: usize, _height: usize) -> Result<LevelDef, ServiceError> {
        Err(ServiceError::NotConfigured)
    }
}

pub fn maze_source(cfg: &GeneratorConfig) -> Box<dyn MazeSource> {
    match &cfg.command {
        Some(cmd) => Box::new(command::CommandBackend::new(cmd)),
        None => Box::new(Unconfigured),
    }
}

/// `seed` drives the offline generator; the command backend ignores it.
pub fn question_source(cfg: &GeneratorConfig, seed: u64) -> Box<dyn QuestionSource> {
    match &cfg.command {
        Some(cmd) => Box::new(command::CommandBackend::new(cmd)),
        None => Box::new(local::LocalQuestions::new(seed)),
    }
}

// ══════════════════════════════════════════════════════════════
// Response decoding
// ══════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct MazeResponse {
    layout: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct QuestionResponse {
    question: String,
    options: Vec<String>,
    #[serde(rename = "correctIndex")]
    correct_index: usize,
}

/// Generators often wrap JSON in prose or code fences; keep the outermost
/// `{ ... }` object.
fn json_body(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

pub fn parse_maze_response(text: &str) -> Result<LevelDef, ServiceError> {
    let resp: MazeResponse = serde_json::from_str(json_body(text))?;
    Ok(level::parse_layout("Generated Maze", &resp.layout)?)
}

/// Decode and validate a question. `history` holds texts already asked.
pub fn parse_question_response(text: &str, history: &[String]) -> Result<Question, ServiceError> {
    let resp: QuestionResponse = serde_json::from_str(json_body(text))?;
    let question = Question {
        text: resp.question.trim().to_string(),
        options: resp.options,
        correct_index: resp.correct_index,
    };
    validate_question(&question, history)?;
    Ok(question)
}

pub fn validate_question(q: &Question, history: &[String]) -> Result<(), ServiceError> {
    if q.text.is_empty() {
        return Err(ServiceError::InvalidQuestion("empty question text".into()));
    }
    if q.options.len() != OPTION_COUNT {
        return Err(ServiceError::InvalidQuestion(format!(
            "expected {OPTION_COUNT} options, got {}",
            q.options.len()
        )));
    }
    if q.correct_index >= OPTION_COUNT {
        return Err(ServiceError::InvalidQuestion(format!(
            "correct index {} out of range",
            q.correct_index
        )));
    }
    if history.iter().any(|h| h.trim() == q.text) {
        return Err(ServiceError::RepeatedQuestion(q.text.clone()));
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Fallback
// ══════════════════════════════════════════════════════════════

/// Shown whenever a question cannot be generated.
pub fn fallback_question() -> Question {
    Question {
        text: "Resuelve: 2x + 10 = 20".to_string(),
        options: vec![
            "x = 2".to_string(),
            "x = 5".to_string(),
            "x = 10".to_string(),
            "x = 0".to_string(),
        ],
        correct_index: 1,
    }
}

/// Ask `source` for a question; any failure yields the fallback.
pub fn fetch_question(
    source: &mut dyn QuestionSource,
    history: &[String],
    difficulty: Difficulty,
) -> Question {
    match source.generate_question(history, difficulty) {
        Ok(q) => q,
        Err(e) => {
            log::warn!("Question generation failed ({e}); using fallback question");
            fallback_question()
        }
    }
}

/// Ask `source` for a maze of the configured size.
pub fn fetch_maze(source: &mut dyn MazeSource, cfg: &GeneratorConfig) -> Result<LevelDef, ServiceError> {
    let def = source.generate_maze(cfg.maze_width, cfg.maze_height)?;
    if def.grid.width() != cfg.maze_width || def.grid.height() != cfg.maze_height {
        log::warn!(
            "Generated maze is {}x{}, asked for {}x{}",
            def.grid.width(),
            def.grid.height(),
            cfg.maze_width,
            cfg.maze_height,
        );
    }
    Ok(def)
}
