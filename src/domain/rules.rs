/// Movement rules — pure functions over a `Grid`.
///
/// A move is legal when the target row exists and the (wrapped) target
/// tile is not a wall. Dots, pellets and empty cells are all walkable.
/// Rules do not look at entities; contact is the resolver's business.

use super::entity::{Direction, Pos};
use super::grid::Grid;

/// Raw target of a move: x unwrapped, y unchecked.
#[inline]
fn target(pos: Pos, dir: Direction) -> (i32, i32) {
    let (dx, dy) = dir.offset();
    (pos.x as i32 + dx, pos.y as i32 + dy)
}

pub fn is_valid_move(grid: &Grid, pos: Pos, dir: Direction) -> bool {
    let (x, y) = target(pos, dir);
    match grid.tile_at(x, y) {
        Ok(tile) => tile.is_passable(),
        Err(_) => false,
    }
}

/// Apply a move without validating it. x wraps; y only gets the unit
/// offset (a move off the top row saturates at 0, which only an
/// unvalidated caller can hit).
pub fn next_position(grid: &Grid, pos: Pos, dir: Direction) -> Pos {
    let (x, y) = target(pos, dir);
    Pos::new(grid.wrap_x(x), y.max(0) as usize)
}

/// Which way the player actually moves this tick.
///   1. The buffered request, if that move is legal now.
///   2. Otherwise keep going the committed way, if still legal.
///   3. Otherwise halt (`None`).
pub fn resolve_player_direction(
    grid: &Grid,
    pos: Pos,
    current: Direction,
    desired: Direction,
) -> Option<Direction> {
    if desired != Direction::None && is_valid_move(grid, pos, desired) {
        return Some(desired);
    }
    if is_valid_move(grid, pos, current) {
        return Some(current);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;
    use crate::domain::tile::Tile;
    use proptest::prelude::*;

    const DIRS5: [Direction; 5] = [
        Direction::Up, Direction::Down, Direction::Left, Direction::Right, Direction::None,
    ];

    // ── is_valid_move ──

    #[test]
    fn blocked_by_wall() {
        let g = grid_from(&[
            "#####",
            "#. .#",
            "#####",
        ]);
        assert!(!is_valid_move(&g, Pos::new(1, 1), Direction::Up));
        assert!(!is_valid_move(&g, Pos::new(1, 1), Direction::Left));
        assert!(is_valid_move(&g, Pos::new(1, 1), Direction::Right));
    }

    #[test]
    fn rows_do_not_wrap() {
        let g = grid_from(&[
            ". .",
            "...",
        ]);
        assert!(!is_valid_move(&g, Pos::new(0, 0), Direction::Up));
        assert!(!is_valid_move(&g, Pos::new(0, 1), Direction::Down));
        assert!(is_valid_move(&g, Pos::new(0, 0), Direction::Down));
    }

    #[test]
    fn tunnel_wraps_both_ways() {
        let g = grid_from(&[
            "#####",
            " ... ",
            "#####",
        ]);
        assert!(is_valid_move(&g, Pos::new(0, 1), Direction::Left));
        assert_eq!(next_position(&g, Pos::new(0, 1), Direction::Left), Pos::new(4, 1));
        assert!(is_valid_move(&g, Pos::new(4, 1), Direction::Right));
        assert_eq!(next_position(&g, Pos::new(4, 1), Direction::Right), Pos::new(0, 1));
    }

    #[test]
    fn wrap_target_is_wall_checked_after_wrapping() {
        let g = grid_from(&[
            "#...#",
        ]);
        // from x=4 going right lands on x=0 which is a wall
        assert!(!is_valid_move(&g, Pos::new(4, 0), Direction::Right));
        assert!(!is_valid_move(&g, Pos::new(0, 0), Direction::Left));
    }

    // ── resolve_player_direction ──

    #[test]
    fn buffered_turn_applies_when_legal() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "##.##",
            "#####",
        ]);
        // at the junction, desired Down is legal
        let d = resolve_player_direction(&g, Pos::new(2, 1), Direction::Right, Direction::Down);
        assert_eq!(d, Some(Direction::Down));
    }

    #[test]
    fn buffered_turn_waits_while_blocked() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "##.##",
            "#####",
        ]);
        let d = resolve_player_direction(&g, Pos::new(1, 1), Direction::Right, Direction::Down);
        assert_eq!(d, Some(Direction::Right));
    }

    #[test]
    fn halts_against_wall() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "#####",
        ]);
        let d = resolve_player_direction(&g, Pos::new(3, 1), Direction::Right, Direction::Up);
        assert_eq!(d, None);
    }

    #[test]
    fn none_request_is_ignored() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "#####",
        ]);
        let d = resolve_player_direction(&g, Pos::new(1, 1), Direction::Right, Direction::None);
        assert_eq!(d, Some(Direction::Right));
    }

    // ── properties ──

    proptest! {
        #[test]
        fn next_position_wraps_x_and_steps_y(x in 0usize..7, y in 1usize..4, d in 0usize..5) {
            let g = grid_from(&[
                ".......",
                ".......",
                ".......",
                ".......",
                ".......",
            ]);
            let dir = DIRS5[d];
            let p = next_position(&g, Pos::new(x, y), dir);
            let (_, dy) = dir.offset();
            prop_assert!(p.x < g.width());
            prop_assert_eq!(p.y as i32, y as i32 + dy);
        }

        #[test]
        fn valid_iff_row_exists_and_not_wall(
            walls in proptest::collection::vec(any::<bool>(), 35),
            x in 0usize..7,
            y in 0usize..5,
            d in 0usize..4,
        ) {
            let tiles: Vec<Vec<Tile>> = walls
                .chunks(7)
                .map(|row| row.iter().map(|&w| if w { Tile::Wall } else { Tile::Dot }).collect())
                .collect();
            let g = Grid::new(tiles);
            let dir = DIRS5[d];
            let (dx, dy) = dir.offset();
            let ty = y as i32 + dy;
            let expected = if ty < 0 || ty >= 5 {
                false
            } else {
                g.tile_at(x as i32 + dx, ty) != Ok(Tile::Wall)
            };
            prop_assert_eq!(is_valid_move(&g, Pos::new(x, y), dir), expected);
        }
    }
}
