/// Level loading and validation.
///
/// ## Sources
///   1. Generated maze (via `service`), replacing the current level
///   2. Maze file (`general.maze_file` in config.toml)
///   3. Built-in classic layout
///
/// ## Maze file format (`.txt`):
///   Optional line 1: `# Maze Name`
///   Remaining lines: map rows
///
/// ## Tile legend:
///   '#' = Wall        '.' = Dot          'o' = Power pellet
///   'S' = Player spawn (exactly one)     'G' = Ghost house (at least one)
///   ' ' = Empty
///
/// Spawn cells are stored as empty floor. When a layout has several 'G'
/// cells, the last one scanned is the ghosts' home.

use std::path::Path;

use crate::domain::entity::{Player, Pos};
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;
use super::world::{Phase, WorldState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} is {found} wide, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("unknown symbol '{symbol}' at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
    #[error("layout has no player spawn 'S'")]
    MissingPlayerSpawn,
    #[error("layout has {0} player spawns, expected exactly one")]
    MultiplePlayerSpawns(usize),
    #[error("layout has no ghost house 'G'")]
    MissingGhostSpawn,
    #[error("layout has no dots or power pellets")]
    NoConsumables,
    #[error("could not read maze file: {0}")]
    Io(String),
}

/// A parsed, validated level.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub grid: Grid,
    pub player_start: Pos,
    pub ghost_start: Pos,
}

impl LevelDef {
    pub fn total_consumables(&self) -> usize {
        self.grid.remaining_consumables()
    }
}

// ══════════════════════════════════════════════════════════════
// Built-in layout
// ══════════════════════════════════════════════════════════════

pub const CLASSIC_LAYOUT: [&str; 17] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.#####.##.#####.######",
    "#............GG............#",
    "######.#####.##.#####.######",
    "#............S.............#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......##.......##..o#",
    "###.##.#####.##.#####.##.###",
    "#......##..........##......#",
    "############################",
];

pub fn classic() -> Result<LevelDef, LevelError> {
    parse_layout("Classic", &CLASSIC_LAYOUT)
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

/// Parse and validate rows of map symbols.
pub fn parse_layout<S: AsRef<str>>(name: &str, rows: &[S]) -> Result<LevelDef, LevelError> {
    let first = rows.first().ok_or(LevelError::Empty)?;
    let width = first.as_ref().chars().count();
    if width == 0 {
        return Err(LevelError::Empty);
    }

    let mut tiles = Vec::with_capacity(rows.len());
    let mut player_starts = vec![];
    let mut ghost_start = None;

    for (y, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        let found = row.chars().count();
        if found != width {
            return Err(LevelError::Ragged { row: y, expected: width, found });
        }

        let mut line = Vec::with_capacity(width);
        for (x, ch) in row.chars().enumerate() {
            let tile = match ch {
                'S' => {
                    player_starts.push(Pos::new(x, y));
                    Tile::Empty
                }
                'G' => {
                    ghost_start = Some(Pos::new(x, y));
                    Tile::Empty
                }
                other => Tile::from_symbol(other)
                    .ok_or(LevelError::UnknownSymbol { symbol: other, x, y })?,
            };
            line.push(tile);
        }
        tiles.push(line);
    }

    let player_start = match player_starts.as_slice() {
        [] => return Err(LevelError::MissingPlayerSpawn),
        [one] => *one,
        many => return Err(LevelError::MultiplePlayerSpawns(many.len())),
    };
    let ghost_start = ghost_start.ok_or(LevelError::MissingGhostSpawn)?;

    let grid = Grid::new(tiles);
    if grid.remaining_consumables() == 0 {
        return Err(LevelError::NoConsumables);
    }

    Ok(LevelDef {
        name: name.to_string(),
        grid,
        player_start,
        ghost_start,
    })
}

const MAP_ALPHABET: &str = "#.oSG ";

/// Parse a maze file: optional `# Name` line, then rows.
pub fn parse_maze_file(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut rows: Vec<&str> = vec![];

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if rows.is_empty() && name.is_empty() && line.starts_with('#') && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line);
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if name.is_empty() {
        name = "Custom Maze".to_string();
    }

    parse_layout(&name, &rows)
}

/// Distinguish `# Maze Name` from `#S..G#` (map data).
/// A name line holds at least one character outside the map alphabet.
fn is_name_line(line: &str) -> bool {
    line.chars().any(|c| !MAP_ALPHABET.contains(c))
}

pub fn load_maze_file(path: &Path) -> Result<LevelDef, LevelError> {
    let content = std::fs::read_to_string(path).map_err(|e| LevelError::Io(e.to_string()))?;
    parse_maze_file(&content)
}

// ══════════════════════════════════════════════════════════════
// Installing a level into the world
// ══════════════════════════════════════════════════════════════

/// Replace the world's level. Score and quiz progress are left alone;
/// callers decide what else resets.
pub fn load_level(world: &mut WorldState, def: LevelDef) {
    log::info!(
        "Loading level '{}' ({}x{}, {} consumables)",
        def.name,
        def.grid.width(),
        def.grid.height(),
        def.total_consumables(),
    );

    world.base_grid = def.grid.clone();
    world.grid = def.grid;
    world.level_name = def.name;
    world.player_spawn = def.player_start;
    world.ghost_spawn = def.ghost_start;
    world.player = Player::new(def.player_start);
    for g in &mut world.ghosts {
        g.home = def.ghost_start;
        g.reset();
    }
    world.frightened_ticks = 0;
}

/// Maze generation may start from the ready screen or an end screen.
pub fn can_generate(world: &WorldState) -> bool {
    matches!(world.phase, Phase::Idle | Phase::GameOver | Phase::Victory(_))
}

/// Enter GeneratingLevel. Returns false when generation is not allowed now.
pub fn begin_generation(world: &mut WorldState) -> bool {
    if !can_generate(world) {
        return false;
    }
    world.generating_from = Some(world.phase);
    world.phase = Phase::GeneratingLevel;
    world.set_message("Generating maze...", 0);
    true
}

/// Install a freshly generated maze, or keep the current one on failure.
/// Either way the world ends up Idle. A maze requested from the victory
/// screen keeps the tier that was reached.
pub fn finish_generation<E: std::fmt::Display>(world: &mut WorldState, result: Result<LevelDef, E>) {
    if world.phase != Phase::GeneratingLevel {
        return;
    }
    let origin = world.generating_from.take();
    match result {
        Ok(def) => {
            let difficulty = world.quiz.difficulty;
            load_level(world, def);
            super::step::reset_run(world);
            if matches!(origin, Some(Phase::Victory(_))) {
                world.quiz.difficulty = difficulty;
            }
            world.set_message("New maze ready!", 20);
        }
        Err(e) => {
            log::error!("Maze generation failed: {e}");
            world.phase = Phase::Idle;
            world.set_message("Maze generation failed", 30);
        }
    }
}
