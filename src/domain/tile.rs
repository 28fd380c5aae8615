/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Wall,
    Dot,         // +10, counts toward clearing the maze
    PowerPellet, // +50, frightens pursuers
}

impl Tile {
    /// Can an entity occupy this cell?
    pub fn is_passable(self) -> bool {
        !matches!(self, Tile::Wall)
    }

    /// Is this something the player eats (and the maze must be cleared of)?
    pub fn is_consumable(self) -> bool {
        matches!(self, Tile::Dot | Tile::PowerPellet)
    }

    /// Score awarded for eating this tile.
    pub fn points(self) -> u32 {
        match self {
            Tile::Dot => 10,
            Tile::PowerPellet => 50,
            _ => 0,
        }
    }

    /// Map symbol for a playfield tile. Spawn markers are not tiles;
    /// the level parser handles them before calling this.
    pub fn from_symbol(ch: char) -> Option<Tile> {
        match ch {
            '#' => Some(Tile::Wall),
            '.' => Some(Tile::Dot),
            'o' => Some(Tile::PowerPellet),
            ' ' => Some(Tile::Empty),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn symbol(self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Dot => '.',
            Tile::PowerPellet => 'o',
            Tile::Empty => ' ',
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}
