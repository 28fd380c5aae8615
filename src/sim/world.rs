/// WorldState: the complete snapshot of a running game.
///
/// ## Tile Architecture
///
/// Two tile layers:
///   - `base_grid` — the level as loaded. **Never mutated** after load.
///   - `grid`      — the live board (dots and pellets disappear as eaten).
///
/// `restart_level` resets `grid = base_grid.clone()`, so a maze can be
/// replayed without re-parsing or regenerating it.
///
/// ## Counters
///
/// Score, the shared frightened countdown, quiz progress and the RNG are
/// all fields here. Tick functions take `&mut WorldState` and nothing
/// else mutable, so a seeded world replays the same way every time.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{QuizConfig, SpeedConfig};
use crate::domain::entity::{Ghost, Player, Pos};
use crate::domain::grid::Grid;
use super::level::{self, LevelDef};
use super::quiz::QuizState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VictoryKind {
    /// Every dot and pellet eaten.
    MazeCleared,
    /// Top quiz tier passed.
    CurriculumComplete,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Level loaded, waiting for the player to start.
    Idle,
    Playing,
    /// Simulation suspended while a question is fetched or answered.
    Quiz,
    /// Simulation suspended while a new maze is generated.
    GeneratingLevel,
    /// Tier cleared; short pause before the maze restarts.
    LevelTransition,
    GameOver,
    Victory(VictoryKind),
}

pub struct WorldState {
    // ── Tile layers ──
    pub base_grid: Grid,
    pub grid: Grid,
    pub level_name: String,

    // ── Entities ──
    pub player: Player,
    pub player_spawn: Pos,
    pub ghost_spawn: Pos,
    pub ghosts: Vec<Ghost>,
    /// Shared by every frightened ghost. 0 = nobody is frightened.
    pub frightened_ticks: u32,

    // ── Meta ──
    pub phase: Phase,
    pub paused: bool,
    pub score: u32,
    pub quiz: QuizState,
    pub tick: u64,
    pub rng: Pcg32,

    // ── Tuning ──
    pub speed: SpeedConfig,
    pub quiz_cfg: QuizConfig,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,

    /// Phase that maze generation was started from.
    pub generating_from: Option<Phase>,
}

impl WorldState {
    pub fn new(def: LevelDef, speed: SpeedConfig, quiz_cfg: QuizConfig, seed: u64) -> Self {
        let mut world = WorldState {
            base_grid: def.grid.clone(),
            grid: def.grid.clone(),
            level_name: String::new(),
            player: Player::new(def.player_start),
            player_spawn: def.player_start,
            ghost_spawn: def.ghost_start,
            ghosts: Ghost::roster(def.ghost_start),
            frightened_ticks: 0,
            phase: Phase::Idle,
            paused: false,
            score: 0,
            quiz: QuizState::new(),
            tick: 0,
            rng: Pcg32::seed_from_u64(seed),
            speed,
            quiz_cfg,
            message: String::new(),
            message_timer: 0,
            generating_from: None,
        };
        level::load_level(&mut world, def);
        world
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the transient message; call once per loop tick.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    /// Score at which the next quiz fires.
    pub fn next_quiz_at(&self) -> u32 {
        self.quiz.last_threshold + self.quiz_cfg.threshold_step
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver | Phase::Victory(_))
    }
}
