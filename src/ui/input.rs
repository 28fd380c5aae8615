/// Keyboard input → game commands.
///
/// Every pending terminal event is drained once per frame and translated
/// into `Command`s. Movement is buffered, not held: the latest direction
/// pressed between two ticks is the one the next tick consults, so only
/// press/repeat events matter and releases are ignored.
///
/// ## Keys
///   Arrows / WASD       →  Move
///   1-4 / A-D           →  Answer (while a question is shown)
///   Enter / Space       →  Start
///   G                   →  Generate a new maze
///   R                   →  Try again
///   P / F1              →  Pause
///   Q / Esc / Ctrl+C    →  Quit
///
/// A-D double as WASD; `answering` decides which reading applies.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    Answer(usize),
    Confirm,
    Generate,
    Restart,
    Pause,
    Quit,
}

pub struct InputState {
    /// Commands decoded during the most recent `drain_events()`.
    commands: Vec<Command>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { commands: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self, answering: bool) {
        self.commands.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(cmd) = map_key(&key, answering) {
                    self.commands.push(cmd);
                }
            }
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

/// Translate one key press.
pub fn map_key(key: &KeyEvent, answering: bool) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }

    let cmd = match key.code {
        KeyCode::Up => Command::Move(Direction::Up),
        KeyCode::Down => Command::Move(Direction::Down),
        KeyCode::Left => Command::Move(Direction::Left),
        KeyCode::Right => Command::Move(Direction::Right),
        KeyCode::Enter => Command::Confirm,
        KeyCode::Esc => Command::Quit,
        KeyCode::F(1) => Command::Pause,
        KeyCode::Char(c) => return map_char(c.to_ascii_lowercase(), answering),
        _ => return None,
    };
    Some(cmd)
}

fn map_char(c: char, answering: bool) -> Option<Command> {
    if answering {
        match c {
            '1'..='4' => return Some(Command::Answer(c as usize - '1' as usize)),
            'a'..='d' => return Some(Command::Answer(c as usize - 'a' as usize)),
            _ => {}
        }
    }
    let cmd = match c {
        'w' => Command::Move(Direction::Up),
        's' => Command::Move(Direction::Down),
        'a' => Command::Move(Direction::Left),
        'd' => Command::Move(Direction::Right),
        ' ' => Command::Confirm,
        'g' => Command::Generate,
        'r' => Command::Restart,
        'p' => Command::Pause,
        'q' => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_move() {
        assert_eq!(map_key(&press(KeyCode::Left), false), Some(Command::Move(Direction::Left)));
        assert_eq!(map_key(&press(KeyCode::Char('W')), false), Some(Command::Move(Direction::Up)));
        assert_eq!(map_key(&press(KeyCode::Char('d')), false), Some(Command::Move(Direction::Right)));
    }

    #[test]
    fn letters_answer_while_quiz_is_open() {
        assert_eq!(map_key(&press(KeyCode::Char('a')), true), Some(Command::Answer(0)));
        assert_eq!(map_key(&press(KeyCode::Char('D')), true), Some(Command::Answer(3)));
        assert_eq!(map_key(&press(KeyCode::Char('3')), true), Some(Command::Answer(2)));
        assert_eq!(map_key(&press(KeyCode::Char('5')), true), None);
        // digits do nothing outside the quiz
        assert_eq!(map_key(&press(KeyCode::Char('1')), false), None);
        // arrows still decode; the world ignores them during a quiz
        assert_eq!(map_key(&press(KeyCode::Up), true), Some(Command::Move(Direction::Up)));
    }

    #[test]
    fn meta_keys() {
        assert_eq!(map_key(&press(KeyCode::Enter), false), Some(Command::Confirm));
        assert_eq!(map_key(&press(KeyCode::Char(' ')), false), Some(Command::Confirm));
        assert_eq!(map_key(&press(KeyCode::Char('g')), false), Some(Command::Generate));
        assert_eq!(map_key(&press(KeyCode::Char('r')), false), Some(Command::Restart));
        assert_eq!(map_key(&press(KeyCode::F(1)), false), Some(Command::Pause));
        assert_eq!(map_key(&press(KeyCode::Esc), true), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c, true), Some(Command::Quit));
    }
}
