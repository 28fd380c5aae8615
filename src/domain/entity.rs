/// Entities: Player and Ghost (pursuer), plus the shared Direction type.
/// The ghost mode state machine lives here as methods on `Ghost`;
/// the step function decides *when* each transition fires.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// The four real headings, in the order pursuers enumerate them.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    /// Unit offset (dx, dy). Screen coordinates: y grows downward.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }
}

/// A committed grid position. Always inside the grid it belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Pos,
    pub dir: Direction,
    /// Latest requested heading; applied when the move becomes legal.
    pub next_dir: Direction,
    pub mouth_open: bool,
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Player {
            pos,
            dir: Direction::None,
            next_dir: Direction::None,
            mouth_open: true,
        }
    }
}

/// Pursuer mode. Scatter and Chase only differ cosmetically here;
/// movement is the same random walk in every mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    Eaten,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostColor {
    Red,
    Pink,
    Cyan,
    Orange,
}

/// What touching a ghost means for the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    /// Frightened ghost got eaten and sent home.
    Ate,
    /// Scatter/Chase ghost caught the player.
    Caught,
    /// Eaten ghosts are harmless.
    PassThrough,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: usize,
    pub pos: Pos,
    pub home: Pos,
    pub color: GhostColor,
    pub mode: GhostMode,
    pub dir: Direction,
}

impl Ghost {
    pub fn new(id: usize, home: Pos, color: GhostColor, dir: Direction) -> Self {
        Ghost {
            id,
            pos: home,
            home,
            color,
            mode: GhostMode::Scatter,
            dir,
        }
    }

    /// The standard four-ghost roster, all starting from `home`.
    pub fn roster(home: Pos) -> Vec<Ghost> {
        vec![
            Ghost::new(1, home, GhostColor::Red, Direction::Up),
            Ghost::new(2, home, GhostColor::Pink, Direction::Down),
            Ghost::new(3, home, GhostColor::Cyan, Direction::Left),
            Ghost::new(4, home, GhostColor::Orange, Direction::Right),
        ]
    }

    /// Power pellet eaten. Eaten ghosts are still on their way back
    /// and ignore it.
    pub fn frighten(&mut self) {
        if self.mode != GhostMode::Eaten {
            self.mode = GhostMode::Frightened;
        }
    }

    /// Frightened countdown expired.
    pub fn calm(&mut self) {
        if self.mode == GhostMode::Frightened {
            self.mode = GhostMode::Chase;
        }
    }

    /// Eaten ghost standing on its home cell comes back to life.
    /// Returns true if the ghost revived.
    pub fn try_revive(&mut self) -> bool {
        if self.mode == GhostMode::Eaten && self.pos == self.home {
            self.mode = GhostMode::Chase;
            return true;
        }
        false
    }

    /// Apply the contact rule and report the outcome.
    pub fn touch(&mut self) -> Contact {
        match self.mode {
            GhostMode::Frightened => {
                self.mode = GhostMode::Eaten;
                self.pos = self.home;
                Contact::Ate
            }
            GhostMode::Eaten => Contact::PassThrough,
            GhostMode::Scatter | GhostMode::Chase => Contact::Caught,
        }
    }

    /// Back to the pen at level start / reset.
    pub fn reset(&mut self) {
        self.pos = self.home;
        self.mode = GhostMode::Scatter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for d in Direction::ALL {
            assert_ne!(d.opposite(), d);
            assert_eq!(d.opposite().opposite(), d);
        }
        assert_eq!(Direction::None.opposite(), Direction::None);
        assert_eq!(Direction::None.offset(), (0, 0));
    }

    #[test]
    fn frighten_skips_eaten() {
        let mut g = Ghost::new(1, Pos::new(3, 3), GhostColor::Red, Direction::Up);
        g.frighten();
        assert_eq!(g.mode, GhostMode::Frightened);

        g.mode = GhostMode::Eaten;
        g.frighten();
        assert_eq!(g.mode, GhostMode::Eaten);
    }

    #[test]
    fn calm_only_touches_frightened() {
        let mut g = Ghost::new(1, Pos::new(3, 3), GhostColor::Red, Direction::Up);
        g.calm();
        assert_eq!(g.mode, GhostMode::Scatter);
        g.mode = GhostMode::Frightened;
        g.calm();
        assert_eq!(g.mode, GhostMode::Chase);
    }

    #[test]
    fn touching_frightened_ghost_sends_it_home() {
        let mut g = Ghost::new(1, Pos::new(3, 3), GhostColor::Red, Direction::Up);
        g.pos = Pos::new(7, 1);
        g.mode = GhostMode::Frightened;
        assert_eq!(g.touch(), Contact::Ate);
        assert_eq!(g.mode, GhostMode::Eaten);
        assert_eq!(g.pos, g.home);

        // second touch while eaten is harmless
        assert_eq!(g.touch(), Contact::PassThrough);
    }

    #[test]
    fn touching_hunting_ghost_is_fatal() {
        let mut g = Ghost::new(1, Pos::new(3, 3), GhostColor::Red, Direction::Up);
        assert_eq!(g.touch(), Contact::Caught);
        g.mode = GhostMode::Chase;
        assert_eq!(g.touch(), Contact::Caught);
    }

    #[test]
    fn revive_requires_home() {
        let mut g = Ghost::new(1, Pos::new(3, 3), GhostColor::Red, Direction::Up);
        g.mode = GhostMode::Eaten;
        g.pos = Pos::new(4, 3);
        assert!(!g.try_revive());
        g.pos = g.home;
        assert!(g.try_revive());
        assert_eq!(g.mode, GhostMode::Chase);
    }
}
