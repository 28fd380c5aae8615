/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub quiz: QuizConfig,
    pub generator: GeneratorConfig,
    pub gamepad: GamepadConfig,
    /// Fixed RNG seed for reproducible ghost walks; clock-seeded if unset.
    pub seed: Option<u64>,
    /// Custom maze layout loaded at startup instead of the built-in one.
    pub maze_file: Option<PathBuf>,
    pub log_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub frightened_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct QuizConfig {
    pub threshold_step: u32,
    pub streak_to_advance: u32,
    pub correct_feedback_ms: u64,
    pub wrong_feedback_ms: u64,
    pub transition_ms: u64,
    /// How many past question texts are sent along as "do not repeat".
    pub history_window: usize,
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Shell command bridging to the generation service. Receives the
    /// prompt on stdin and prints a JSON object on stdout.
    pub command: Option<String>,
    pub maze_width: usize,
    pub maze_height: usize,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub pause: Vec<String>,
    pub generate: Vec<String>,
    pub restart: Vec<String>,
    /// Buttons for answer options 1..=4.
    pub answers: [Vec<String>; 4],
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    quiz: TomlQuiz,
    #[serde(default)]
    generator: TomlGenerator,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_frightened")]
    frightened_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlQuiz {
    #[serde(default = "default_threshold_step")]
    threshold_step: u32,
    #[serde(default = "default_streak")]
    streak_to_advance: u32,
    #[serde(default = "default_correct_feedback")]
    correct_feedback_ms: u64,
    #[serde(default = "default_wrong_feedback")]
    wrong_feedback_ms: u64,
    #[serde(default = "default_transition")]
    transition_ms: u64,
    #[serde(default = "default_history_window")]
    history_window: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGenerator {
    #[serde(default)]
    command: Option<String>,
    #[serde(default = "default_maze_width")]
    maze_width: usize,
    #[serde(default = "default_maze_height")]
    maze_height: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_generate")]
    generate: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_answer_1")]
    answer_1: Vec<String>,
    #[serde(default = "default_answer_2")]
    answer_2: Vec<String>,
    #[serde(default = "default_answer_3")]
    answer_3: Vec<String>,
    #[serde(default = "default_answer_4")]
    answer_4: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    maze_file: Option<String>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 180 }
fn default_frightened() -> u32 { 50 }   // ~9s at 180ms
fn default_threshold_step() -> u32 { 500 }
fn default_streak() -> u32 { 3 }
fn default_correct_feedback() -> u64 { 1000 }
fn default_wrong_feedback() -> u64 { 2000 }
fn default_transition() -> u64 { 3000 }
fn default_history_window() -> usize { 20 }
fn default_maze_width() -> usize { 28 }
fn default_maze_height() -> usize { 17 }

fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_pause() -> Vec<String> { vec!["Select".into()] }
fn default_generate() -> Vec<String> { vec!["R1".into()] }
fn default_restart() -> Vec<String> { vec!["L1".into()] }
fn default_answer_1() -> Vec<String> { vec!["A".into()] }
fn default_answer_2() -> Vec<String> { vec!["B".into()] }
fn default_answer_3() -> Vec<String> { vec!["X".into()] }
fn default_answer_4() -> Vec<String> { vec!["Y".into()] }
fn default_log_file() -> String { "quizman.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            frightened_ticks: default_frightened(),
        }
    }
}

impl Default for TomlQuiz {
    fn default() -> Self {
        TomlQuiz {
            threshold_step: default_threshold_step(),
            streak_to_advance: default_streak(),
            correct_feedback_ms: default_correct_feedback(),
            wrong_feedback_ms: default_wrong_feedback(),
            transition_ms: default_transition(),
            history_window: default_history_window(),
        }
    }
}

impl Default for TomlGenerator {
    fn default() -> Self {
        TomlGenerator {
            command: None,
            maze_width: default_maze_width(),
            maze_height: default_maze_height(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            pause: default_pause(),
            generate: default_generate(),
            restart: default_restart(),
            answer_1: default_answer_1(),
            answer_2: default_answer_2(),
            answer_3: default_answer_3(),
            answer_4: default_answer_4(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            maze_file: None,
            log_file: default_log_file(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig {
            tick_rate_ms: default_tick_rate(),
            frightened_ticks: default_frightened(),
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig {
            threshold_step: default_threshold_step(),
            streak_to_advance: default_streak(),
            correct_feedback_ms: default_correct_feedback(),
            wrong_feedback_ms: default_wrong_feedback(),
            transition_ms: default_transition(),
            history_window: default_history_window(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Relative maze paths are resolved against the same search dirs.
        let maze_file = toml_cfg.general.maze_file.as_deref().map(|name| {
            let path = PathBuf::from(name);
            if path.is_absolute() {
                path
            } else {
                search_dirs.iter()
                    .map(|d| d.join(name))
                    .find(|p| p.is_file())
                    .unwrap_or(path)
            }
        });

        GameConfig::from_toml(toml_cfg, maze_file)
    }

    fn from_toml(toml_cfg: TomlConfig, maze_file: Option<PathBuf>) -> Self {
        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                frightened_ticks: toml_cfg.speed.frightened_ticks.max(1),
            },
            quiz: QuizConfig {
                threshold_step: toml_cfg.quiz.threshold_step.max(1),
                streak_to_advance: toml_cfg.quiz.streak_to_advance.max(1),
                correct_feedback_ms: toml_cfg.quiz.correct_feedback_ms,
                wrong_feedback_ms: toml_cfg.quiz.wrong_feedback_ms,
                transition_ms: toml_cfg.quiz.transition_ms,
                history_window: toml_cfg.quiz.history_window,
            },
            generator: GeneratorConfig {
                command: toml_cfg.generator.command.filter(|c| !c.trim().is_empty()),
                maze_width: toml_cfg.generator.maze_width,
                maze_height: toml_cfg.generator.maze_height,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                pause: toml_cfg.gamepad.pause,
                generate: toml_cfg.gamepad.generate,
                restart: toml_cfg.gamepad.restart,
                answers: [
                    toml_cfg.gamepad.answer_1,
                    toml_cfg.gamepad.answer_2,
                    toml_cfg.gamepad.answer_3,
                    toml_cfg.gamepad.answer_4,
                ],
            },
            seed: toml_cfg.general.seed,
            maze_file,
            log_file: PathBuf::from(toml_cfg.general.log_file),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
/// Runs before the logger exists, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text),
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Warning: config.toml parse error: {e}");
            eprintln!("Using default settings.");
            TomlConfig::default()
        }
    }
}
