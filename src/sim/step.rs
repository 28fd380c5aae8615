/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Snapshot positions (player + ghosts)
///   2. Player movement (buffered turn, then straight on, else halt)
///   3. Ghost revival / movement
///   4. Frightened countdown
///   5. Tile consumption (dot / power pellet)
///   6. Ghost contact (same cell or swapped cells)
///   7. Win check
///   8. Quiz threshold
///
/// Every move in 2–3 is computed from the snapshot in 1; the resolver
/// in 5–7 reads committed positions plus the snapshot for swap checks.
/// The step is a no-op unless the world is PLAYING and not paused.

use crate::domain::ai;
use crate::domain::entity::{Contact, Direction, Player, Pos};
use crate::domain::rules;
use crate::domain::tile::Tile;
use super::event::GameEvent;
use super::quiz::{self, QuizState};
use super::world::{Phase, VictoryKind, WorldState};

/// Points for eating a frightened ghost.
pub const GHOST_POINTS: u32 = 200;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState) -> Vec<GameEvent> {
    if world.phase != Phase::Playing || world.paused {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    let player_before = world.player.pos;
    let ghosts_before: Vec<Pos> = world.ghosts.iter().map(|g| g.pos).collect();

    resolve_player_movement(world);
    resolve_ghost_movement(world, &mut events);
    resolve_frightened_timer(world, &mut events);
    resolve_tile(world, &mut events);
    resolve_contacts(world, player_before, &ghosts_before, &mut events);
    resolve_win(world, &mut events);
    events.extend(quiz::check_threshold(world));

    events
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(world: &mut WorldState) {
    let p = &mut world.player;
    if let Some(dir) = rules::resolve_player_direction(&world.grid, p.pos, p.dir, p.next_dir) {
        p.dir = dir;
        p.pos = rules::next_position(&world.grid, p.pos, dir);
    }
    p.mouth_open = !p.mouth_open;
}

fn resolve_ghost_movement(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for g in &mut world.ghosts {
        // Reviving takes the whole tick.
        if g.try_revive() {
            events.push(GameEvent::GhostRevived { id: g.id });
            continue;
        }
        let dir = ai::choose_direction(&world.grid, g.pos, g.dir, &mut world.rng);
        g.dir = dir;
        g.pos = rules::next_position(&world.grid, g.pos, dir);
    }
}

fn resolve_frightened_timer(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.frightened_ticks == 0 {
        return;
    }
    world.frightened_ticks -= 1;
    if world.frightened_ticks == 0 {
        for g in &mut world.ghosts {
            g.calm();
        }
        events.push(GameEvent::FrightenedEnded);
    }
}

// ══════════════════════════════════════════════════════════════
// Resolver
// ══════════════════════════════════════════════════════════════

fn resolve_tile(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let pos = world.player.pos;
    let Some(eaten) = world.grid.consume(pos) else { return };
    world.score += eaten.points();

    match eaten {
        Tile::Dot => events.push(GameEvent::DotEaten { x: pos.x, y: pos.y }),
        Tile::PowerPellet => {
            world.frightened_ticks = world.speed.frightened_ticks;
            for g in &mut world.ghosts {
                g.frighten();
            }
            events.push(GameEvent::PowerPelletEaten { x: pos.x, y: pos.y });
        }
        Tile::Empty | Tile::Wall => {}
    }
}

fn resolve_contacts(
    world: &mut WorldState,
    player_before: Pos,
    ghosts_before: &[Pos],
    events: &mut Vec<GameEvent>,
) {
    let player_now = world.player.pos;

    for (g, &before) in world.ghosts.iter_mut().zip(ghosts_before) {
        let direct = g.pos == player_now;
        let swapped = g.pos == player_before && before == player_now;
        if !direct && !swapped {
            continue;
        }

        match g.touch() {
            Contact::Ate => {
                world.score += GHOST_POINTS;
                events.push(GameEvent::GhostEaten { id: g.id });
            }
            Contact::Caught => {
                if world.phase != Phase::GameOver {
                    world.phase = Phase::GameOver;
                    log::info!("Caught by ghost {} at score {}", g.id, world.score);
                    events.push(GameEvent::PlayerCaught { id: g.id });
                }
            }
            Contact::PassThrough => {}
        }
    }
}

fn resolve_win(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.grid.remaining_consumables() > 0 {
        return;
    }
    // Clearing the last dot wins even if a ghost arrived on the same tick.
    world.phase = Phase::Victory(VictoryKind::MazeCleared);
    log::info!("Maze '{}' cleared with score {}", world.level_name, world.score);
    events.push(GameEvent::MazeCleared);
}

// ══════════════════════════════════════════════════════════════
// Control actions (called from the input layer)
// ══════════════════════════════════════════════════════════════

/// Buffer a direction request; only PLAYING listens.
pub fn queue_direction(world: &mut WorldState, dir: Direction) {
    if world.phase == Phase::Playing && !world.paused && dir != Direction::None {
        world.player.next_dir = dir;
    }
}

/// IDLE → PLAYING, heading right.
pub fn start_game(world: &mut WorldState) -> bool {
    if world.phase != Phase::Idle {
        return false;
    }
    world.phase = Phase::Playing;
    world.paused = false;
    world.player.dir = Direction::Right;
    world.player.next_dir = Direction::Right;
    log::info!("Game started on '{}'", world.level_name);
    true
}

pub fn toggle_pause(world: &mut WorldState) {
    if world.phase == Phase::Playing {
        world.paused = !world.paused;
    }
}

/// Restore the base layout and every entity to its spawn, then wait in
/// IDLE. Score and quiz progress are untouched.
pub fn restart_level(world: &mut WorldState) {
    world.grid = world.base_grid.clone();
    world.player = Player::new(world.player_spawn);
    for g in &mut world.ghosts {
        g.home = world.ghost_spawn;
        g.reset();
    }
    world.frightened_ticks = 0;
    world.paused = false;
    world.phase = Phase::Idle;
}

/// A fresh run on the current maze: layout restored, score, quiz
/// thresholds, history, streak and tier all back to the start.
pub fn reset_run(world: &mut WorldState) {
    restart_level(world);
    world.score = 0;
    world.quiz = QuizState::new();
}

/// "Try again" from an end screen.
pub fn try_again(world: &mut WorldState) -> bool {
    if !world.is_over() {
        return false;
    }
    reset_run(world);
    log::info!("Run reset on '{}'", world.level_name);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QuizConfig, SpeedConfig};
    use crate::domain::entity::GhostMode;
    use crate::sim::level::parse_layout;

    fn world_from(rows: &[&str]) -> WorldState {
        let def = parse_layout("test", rows).unwrap();
        let mut w = WorldState::new(def, SpeedConfig::default(), QuizConfig::default(), 11);
        w.phase = Phase::Playing;
        w
    }

    /// Corridor on row 5 with the ghost house sealed off at (3,3).
    /// Sealed ghosts have no legal move and stay put.
    const SWAP_MAP: [&str; 7] = [
        "########",
        "#S.....#",
        "########",
        "###G####",
        "########",
        "#####..#",
        "########",
    ];

    fn swap_setup(mode: GhostMode) -> WorldState {
        let mut w = world_from(&SWAP_MAP);
        w.player.pos = Pos::new(5, 5);
        w.player.dir = Direction::Right;
        w.player.next_dir = Direction::Right;
        let g = &mut w.ghosts[0];
        g.pos = Pos::new(6, 5);
        g.dir = Direction::Left;
        g.mode = mode;
        w
    }

    #[test]
    fn idle_world_does_not_step() {
        let mut w = world_from(&SWAP_MAP);
        w.phase = Phase::Idle;
        assert!(step(&mut w).is_empty());
        assert_eq!(w.tick, 0);

        w.phase = Phase::Playing;
        w.paused = true;
        assert!(step(&mut w).is_empty());
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn start_heads_right() {
        let mut w = world_from(&SWAP_MAP);
        w.phase = Phase::Idle;
        assert!(start_game(&mut w));
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.player.dir, Direction::Right);
        assert_eq!(w.player.next_dir, Direction::Right);
        assert!(!start_game(&mut w));
    }

    #[test]
    fn directions_only_buffer_while_playing() {
        let mut w = world_from(&SWAP_MAP);
        queue_direction(&mut w, Direction::Left);
        assert_eq!(w.player.next_dir, Direction::Left);
        w.phase = Phase::Quiz;
        queue_direction(&mut w, Direction::Up);
        assert_eq!(w.player.next_dir, Direction::Left);
    }

    #[test]
    fn pause_only_while_playing() {
        let mut w = world_from(&SWAP_MAP);
        toggle_pause(&mut w);
        assert!(w.paused);
        toggle_pause(&mut w);
        assert!(!w.paused);
        w.phase = Phase::Idle;
        toggle_pause(&mut w);
        assert!(!w.paused);
    }

    #[test]
    fn dot_scores_once_and_mouth_toggles() {
        let mut w = world_from(&SWAP_MAP);
        w.player.dir = Direction::Right;
        w.player.next_dir = Direction::Right;

        let events = step(&mut w);
        assert_eq!(w.player.pos, Pos::new(2, 1));
        assert_eq!(w.score, 10);
        assert!(!w.player.mouth_open);
        assert!(events.contains(&GameEvent::DotEaten { x: 2, y: 1 }));

        // walk back over the eaten cell: no second score
        w.player.next_dir = Direction::Left;
        step(&mut w);
        w.player.next_dir = Direction::Right;
        step(&mut w);
        assert_eq!(w.player.pos, Pos::new(2, 1));
        assert_eq!(w.score, 10);
        assert!(!w.player.mouth_open);
    }

    #[test]
    fn swap_collision_is_detected() {
        let mut w = swap_setup(GhostMode::Chase);

        let events = step(&mut w);
        assert_eq!(w.player.pos, Pos::new(6, 5));
        assert_eq!(w.ghosts[0].pos, Pos::new(5, 5));
        assert_eq!(w.phase, Phase::GameOver);
        assert!(events.contains(&GameEvent::PlayerCaught { id: 1 }));
    }

    #[test]
    fn frightened_swap_eats_ghost() {
        let mut w = swap_setup(GhostMode::Frightened);
        w.frightened_ticks = 10;

        let events = step(&mut w);
        assert_eq!(w.ghosts[0].mode, GhostMode::Eaten);
        assert_eq!(w.ghosts[0].pos, Pos::new(3, 3));
        assert_eq!(w.score, 10 + GHOST_POINTS);
        assert!(events.contains(&GameEvent::GhostEaten { id: 1 }));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn countdown_calms_on_last_tick() {
        let mut w = world_from(&SWAP_MAP);
        for g in &mut w.ghosts[..3] {
            g.mode = GhostMode::Frightened;
        }
        w.ghosts[3].mode = GhostMode::Eaten;
        w.frightened_ticks = 2;

        step(&mut w);
        assert_eq!(w.frightened_ticks, 1);
        assert_eq!(w.ghosts[0].mode, GhostMode::Frightened);

        let events = step(&mut w);
        assert_eq!(w.frightened_ticks, 0);
        assert!(events.contains(&GameEvent::FrightenedEnded));
        for g in &w.ghosts[..3] {
            assert_eq!(g.mode, GhostMode::Chase);
        }
        // the eaten ghost revived at home on the first tick, never frightened
        assert_eq!(w.ghosts[3].mode, GhostMode::Chase);

        // no further edges
        assert!(!step(&mut w).contains(&GameEvent::FrightenedEnded));
    }

    #[test]
    fn last_dot_wins_exactly_once() {
        let mut w = world_from(&[
            "######",
            "#S.###",
            "######",
            "#G####",
            "######",
        ]);
        w.player.dir = Direction::Right;

        let events = step(&mut w);
        assert_eq!(w.phase, Phase::Victory(VictoryKind::MazeCleared));
        assert_eq!(events.iter().filter(|e| **e == GameEvent::MazeCleared).count(), 1);

        // terminal: further steps do nothing
        assert!(step(&mut w).is_empty());
    }

    #[test]
    fn clearing_beats_getting_caught_same_tick() {
        let mut w = world_from(&[
            "#####",
            "#S.G#",
            "#####",
        ]);
        w.player.dir = Direction::Right;
        for g in &mut w.ghosts {
            g.dir = Direction::Right;
            g.mode = GhostMode::Chase;
        }
        // (3,1) is a dead end, so every ghost reverses onto (2,1)
        let events = step(&mut w);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerCaught { .. })));
        assert_eq!(w.phase, Phase::Victory(VictoryKind::MazeCleared));
    }

    #[test]
    fn crossing_threshold_enters_quiz() {
        let mut w = world_from(&SWAP_MAP);
        w.score = 490;
        w.player.dir = Direction::Right;
        let events = step(&mut w);
        assert_eq!(w.score, 500);
        assert_eq!(w.phase, Phase::Quiz);
        assert!(events.contains(&GameEvent::QuizTriggered { threshold: 500 }));
        // the quiz suspends the simulation
        assert!(step(&mut w).is_empty());
    }

    #[test]
    fn pellet_eat_revive_scenario() {
        // Ghost house sealed at (1,3); ghost 1 is let loose in the corridor.
        let mut w = world_from(&[
            "##########",
            "#S.o    .#",
            "##########",
            "#G########",
            "##########",
        ]);
        let home = w.ghost_spawn;
        w.ghosts[0].pos = Pos::new(7, 1);
        w.ghosts[0].dir = Direction::Left;
        w.player.dir = Direction::Right;
        w.player.next_dir = Direction::Right;

        // tick 1: dot at (2,1)
        step(&mut w);
        assert_eq!(w.score, 10);
        assert_eq!(w.ghosts[0].pos, Pos::new(6, 1));

        // tick 2: pellet at (3,1); every ghost is frightened
        let events = step(&mut w);
        assert_eq!(w.score, 60);
        assert!(events.contains(&GameEvent::PowerPelletEaten { x: 3, y: 1 }));
        assert_eq!(w.frightened_ticks, w.speed.frightened_ticks);
        assert!(w.ghosts.iter().all(|g| g.mode == GhostMode::Frightened));

        // tick 3: both step onto (4,1); the ghost is eaten and sent home
        let events = step(&mut w);
        assert!(events.contains(&GameEvent::GhostEaten { id: 1 }));
        assert_eq!(w.score, 260);
        assert_eq!(w.ghosts[0].mode, GhostMode::Eaten);
        assert_eq!(w.ghosts[0].pos, home);
        assert_eq!(w.phase, Phase::Playing);

        // tick 4: it is home, so it revives instead of moving
        let events = step(&mut w);
        assert!(events.contains(&GameEvent::GhostRevived { id: 1 }));
        assert_eq!(w.ghosts[0].mode, GhostMode::Chase);
        assert_eq!(w.ghosts[0].pos, home);
    }

    #[test]
    fn pellet_protects_on_the_meeting_tick() {
        let mut w = world_from(&[
            "#######",
            "#S o .#",
            "#######",
            "#G#####",
            "#######",
        ]);
        w.player.pos = Pos::new(2, 1);
        w.player.dir = Direction::Right;
        w.player.next_dir = Direction::Right;
        let g = &mut w.ghosts[0];
        g.pos = Pos::new(4, 1);
        g.dir = Direction::Left;
        g.mode = GhostMode::Chase;

        // both land on the pellet cell in the same tick
        let events = step(&mut w);
        assert_eq!(w.player.pos, Pos::new(3, 1));
        assert!(events.contains(&GameEvent::PowerPelletEaten { x: 3, y: 1 }));
        assert!(events.contains(&GameEvent::GhostEaten { id: 1 }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerCaught { .. })));
        assert_eq!(w.ghosts[0].mode, GhostMode::Eaten);
        assert_eq!(w.score, 50 + GHOST_POINTS);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn try_again_resets_run() {
        let mut w = world_from(&SWAP_MAP);
        w.grid.consume(Pos::new(2, 1));
        w.score = 1200;
        w.quiz.streak = 2;
        w.quiz.last_threshold = 1000;
        w.quiz.history.push("q".into());
        w.quiz.difficulty = quiz::Difficulty::Quadratic;

        assert!(!try_again(&mut w), "not from PLAYING");
        w.phase = Phase::GameOver;
        assert!(try_again(&mut w));
        assert_eq!(w.phase, Phase::Idle);
        assert_eq!(w.score, 0);
        assert_eq!(w.quiz.streak, 0);
        assert_eq!(w.quiz.last_threshold, 0);
        assert!(w.quiz.history.is_empty());
        assert_eq!(w.quiz.difficulty, quiz::Difficulty::Linear);
        assert_eq!(w.grid.get(Pos::new(2, 1)), Tile::Dot);
        assert!(w.ghosts.iter().all(|g| g.mode == GhostMode::Scatter && g.pos == w.ghost_spawn));
    }
}
