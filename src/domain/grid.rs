/// The playfield: a rectangular tile grid with horizontal wrap-around.
///
/// ## Coordinates
///   - x wraps modulo `width` (the side tunnels), so any integer x is valid.
///   - y does not wrap. Rows outside `[0, height)` are an error.
///
/// ## Consumables
///   Dots and power pellets are eaten in place (tile becomes `Empty`).
///   The number left is always recounted from the tiles; there is no
///   separate counter that could drift out of sync with the grid.

use super::entity::Pos;
use super::tile::Tile;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("row {y} is outside the grid (height {height})")]
    OutOfBounds { y: i32, height: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build from rows of equal length. The level parser guarantees
    /// a non-empty rectangle before calling this.
    pub fn new(tiles: Vec<Vec<Tile>>) -> Self {
        let height = tiles.len();
        let width = tiles.first().map_or(0, |r| r.len());
        Grid { tiles, width, height }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Normalize any x into `[0, width)`.
    #[inline]
    pub fn wrap_x(&self, x: i32) -> usize {
        x.rem_euclid(self.width as i32) as usize
    }

    /// Checked lookup: x wraps, y must be a real row.
    pub fn tile_at(&self, x: i32, y: i32) -> Result<Tile, GridError> {
        if y < 0 || y as usize >= self.height {
            return Err(GridError::OutOfBounds { y, height: self.height });
        }
        Ok(self.tiles[y as usize][self.wrap_x(x)])
    }

    /// Lookup for a committed position (already inside the grid).
    #[inline]
    pub fn get(&self, pos: Pos) -> Tile {
        self.tiles[pos.y][pos.x]
    }

    /// Eat whatever is at `pos`. Returns the eaten tile, or `None` when
    /// there was nothing to eat. Callers score from the return value,
    /// so a repeated call cannot score twice.
    pub fn consume(&mut self, pos: Pos) -> Option<Tile> {
        let cell = &mut self.tiles[pos.y][pos.x];
        if cell.is_consumable() {
            let eaten = *cell;
            *cell = Tile::Empty;
            Some(eaten)
        } else {
            None
        }
    }

    /// Dots + power pellets still on the board.
    pub fn remaining_consumables(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|t| t.is_consumable())
            .count()
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.tiles
    }
}
