/// Entry point and game loop.

mod config;
mod domain;
mod service;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;

use config::{GameConfig, GeneratorConfig};
use service::worker::{Pending, Poll};
use service::ServiceError;
use sim::event::GameEvent;
use sim::level::{self, LevelDef};
use sim::quiz::{self, Question};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{Command, InputState};
use ui::renderer::Renderer;
use ui::sound::{sfx_for, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

type MazeRequest = Pending<Result<LevelDef, ServiceError>>;
type QuestionRequest = Pending<Question>;

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    let seed = config.seed.unwrap_or_else(clock_seed);
    log::info!("Quiz-Man starting (seed {seed})");

    let def = match initial_level(&config) {
        Ok(def) => def,
        Err(e) => {
            eprintln!("Built-in maze is invalid: {e}");
            return;
        }
    };
    let mut world = WorldState::new(def, config.speed.clone(), config.quiz.clone(), seed);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Quiz-Man!");
    println!("Final Score: {}", world.score);
}

/// Log to the configured file; the terminal belongs to the renderer.
fn init_logging(config: &GameConfig) {
    let file = match File::create(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", config.log_file.display());
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// The configured maze file, or the built-in layout if there is none
/// or it fails to load.
fn initial_level(config: &GameConfig) -> Result<LevelDef, level::LevelError> {
    if let Some(path) = &config.maze_file {
        match level::load_maze_file(path) {
            Ok(def) => {
                log::info!("Loaded maze file {}", path.display());
                return Ok(def);
            }
            Err(e) => log::warn!("Maze file {} rejected ({e}); using built-in maze", path.display()),
        }
    }
    level::classic()
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> std::io::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut last_frame = Instant::now();

    let mut maze_req: Option<MazeRequest> = None;
    let mut question_req: Option<QuestionRequest> = None;

    loop {
        let answering = world.phase == Phase::Quiz;
        kb.drain_events(answering);
        gp.update(answering);

        let commands: Vec<Command> = kb.commands().iter().chain(gp.commands()).copied().collect();
        let mut events: Vec<GameEvent> = Vec::new();

        for cmd in commands {
            match cmd {
                Command::Quit => return Ok(()),
                Command::Generate => {
                    if maze_req.is_none() && level::begin_generation(world) {
                        maze_req = Some(request_maze(&config.generator));
                    }
                }
                other => apply_command(world, other, &mut events),
            }
        }

        // Quiz timers run on wall-clock time, independent of the tick.
        let now = Instant::now();
        let elapsed_ms = now.duration_since(last_frame).as_millis() as u64;
        last_frame = now;
        events.extend(quiz::advance_quiz(world, elapsed_ms));

        if last_tick.elapsed() >= tick_rate {
            events.extend(step::step(world));
            world.tick_message();
            last_tick = Instant::now();
        }

        if quiz::awaiting_question(world) && question_req.is_none() {
            question_req = Some(request_question(world, &config.generator));
        }

        if let Some(req) = &question_req {
            match req.poll() {
                Poll::Waiting => {}
                Poll::Ready(q) => {
                    quiz::present_question(world, q);
                    question_req = None;
                }
                Poll::Lost => {
                    quiz::present_question(world, service::fallback_question());
                    question_req = None;
                }
            }
        }

        if let Some(req) = &maze_req {
            match req.poll() {
                Poll::Waiting => {}
                Poll::Ready(result) => {
                    level::finish_generation(world, result);
                    maze_req = None;
                }
                Poll::Lost => {
                    level::finish_generation::<ServiceError>(world, Err(ServiceError::WorkerLost));
                    maze_req = None;
                }
            }
        }

        play_sounds(sound, &events);

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

fn apply_command(world: &mut WorldState, cmd: Command, events: &mut Vec<GameEvent>) {
    match cmd {
        Command::Move(dir) => step::queue_direction(world, dir),
        Command::Answer(i) => events.extend(quiz::submit_answer(world, i)),
        Command::Confirm => {
            if world.is_over() {
                step::try_again(world);
            } else {
                step::start_game(world);
            }
        }
        Command::Restart => {
            step::try_again(world);
        }
        Command::Pause => step::toggle_pause(world),
        Command::Generate | Command::Quit => {}
    }
}

fn request_maze(cfg: &GeneratorConfig) -> MazeRequest {
    let mut source = service::maze_source(cfg);
    let cfg = cfg.clone();
    Pending::spawn("maze", move || service::fetch_maze(source.as_mut(), &cfg))
}

fn request_question(world: &mut WorldState, cfg: &GeneratorConfig) -> QuestionRequest {
    let history = quiz::recent_history(world);
    let difficulty = world.quiz.difficulty;
    let mut source = service::question_source(cfg, world.rng.random::<u64>());
    Pending::spawn("question", move || {
        service::fetch_question(source.as_mut(), &history, difficulty)
    })
}

fn play_sounds(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(engine) = sound else { return };
    for sfx in events.iter().filter_map(sfx_for) {
        engine.play(sfx);
    }
}
