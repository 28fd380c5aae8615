/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move
///   A / B / X / Y         →  Answer 1 / 2 / 3 / 4
///   Start                 →  Start
///   R1                    →  Generate a new maze
///   L1                    →  Try again
///   Select                →  Pause
///
/// Only edges matter: a button or a stick crossing the deadzone yields
/// one `Command` on the frame it goes down.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::Direction;
use super::input::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    confirm: Vec<Btn>,
    pause: Vec<Btn>,
    generate: Vec<Btn>,
    restart: Vec<Btn>,
    answers: [Vec<Btn>; 4],
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm:  vec![Btn::Start],
            pause:    vec![Btn::Select],
            generate: vec![Btn::R1],
            restart:  vec![Btn::L1],
            answers:  [vec![Btn::A], vec![Btn::B], vec![Btn::X], vec![Btn::Y]],
        }
    }
}

impl ActionMap {
    /// Commands triggered by `btn` going down. With `answering` set the
    /// answer bindings win over everything else.
    fn commands_for(&self, btn: Btn, answering: bool) -> Vec<Command> {
        if answering {
            if let Some(i) = self.answers.iter().position(|a| a.contains(&btn)) {
                return vec![Command::Answer(i)];
            }
        }
        let mut out = vec![];
        if self.confirm.contains(&btn) { out.push(Command::Confirm); }
        if self.pause.contains(&btn) { out.push(Command::Pause); }
        if self.generate.contains(&btn) { out.push(Command::Generate); }
        if self.restart.contains(&btn) { out.push(Command::Restart); }
        out
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Direction the stick currently points past the deadzone.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Direction,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,
    commands: Vec<Command>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("Gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            stick_dir: Direction::None,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            commands: Vec::with_capacity(4),
            connected,
        }
    }

    /// Load button mapping from config. Unknown names are skipped; an
    /// action left with no valid button keeps its default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        fn apply(slot: &mut Vec<Btn>, names: &[String]) {
            let parsed = parse_list(names);
            if !parsed.is_empty() { *slot = parsed; }
        }
        let map = &mut self.action_map;
        apply(&mut map.confirm, &cfg.confirm);
        apply(&mut map.pause, &cfg.pause);
        apply(&mut map.generate, &cfg.generate);
        apply(&mut map.restart, &cfg.restart);
        for (slot, names) in map.answers.iter_mut().zip(cfg.answers.iter()) {
            apply(slot, names);
        }
    }

    /// Poll the controller; call once per frame.
    #[cfg_attr(not(feature = "gamepad"), allow(unused_variables))]
    pub fn update(&mut self, answering: bool) {
        self.commands.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs(answering);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self, answering: bool) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn, answering);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("Gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("Gamepad disconnected");
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        let dir = stick_direction(self.stick_x, self.stick_y);
        if dir != self.stick_dir && dir != Direction::None {
            self.commands.push(Command::Move(dir));
        }
        self.stick_dir = dir;
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, gilrs_btn: Button, answering: bool) {
        // D-pad is not part of the Btn enum
        let dpad = match gilrs_btn {
            Button::DPadUp    => Some(Direction::Up),
            Button::DPadDown  => Some(Direction::Down),
            Button::DPadLeft  => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = dpad {
            self.commands.push(Command::Move(dir));
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.commands.extend(self.action_map.commands_for(btn, answering));
        }
    }
}

/// Dominant stick axis past the deadzone. Stick Y grows upward.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Direction {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return Direction::None;
    }
    if x.abs() >= y.abs() {
        if x < 0.0 { Direction::Left } else { Direction::Right }
    } else if y > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_buttons_only_answer_in_quiz() {
        let map = ActionMap::default();
        assert_eq!(map.commands_for(Btn::X, true), vec![Command::Answer(2)]);
        assert!(map.commands_for(Btn::X, false).is_empty());
        assert_eq!(map.commands_for(Btn::Start, true), vec![Command::Confirm]);
        assert_eq!(map.commands_for(Btn::R1, false), vec![Command::Generate]);
        assert_eq!(map.commands_for(Btn::L1, false), vec![Command::Restart]);
    }

    #[test]
    fn config_overrides_and_ignores_unknown_names() {
        let mut pad = GamepadState::new();
        let cfg = GamepadConfig {
            confirm: vec!["A".into()],
            pause: vec!["bogus".into()],
            generate: vec!["R2".into()],
            restart: vec!["L1".into()],
            answers: [vec!["L2".into()], vec!["B".into()], vec!["X".into()], vec!["Y".into()]],
        };
        pad.load_button_config(&cfg);
        let map = &pad.action_map;
        assert_eq!(map.confirm, vec![Btn::A]);
        assert_eq!(map.pause, vec![Btn::Select]);
        assert_eq!(map.generate, vec![Btn::R2]);
        assert_eq!(map.answers[0], vec![Btn::L2]);
    }

    #[test]
    fn stick_picks_dominant_axis() {
        assert_eq!(stick_direction(0.1, -0.1), Direction::None);
        assert_eq!(stick_direction(-0.9, 0.3), Direction::Left);
        assert_eq!(stick_direction(0.2, 0.8), Direction::Up);
        assert_eq!(stick_direction(0.0, -0.5), Direction::Down);
    }
}
