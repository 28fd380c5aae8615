/// Ghost AI — a random walk that never doubles back.
///
/// Each tick a ghost:
///   1. Lists the four headings minus the reverse of its current one.
///   2. Keeps only the legal moves.
///   3. If nothing is left (dead end), reverses if it can, else stays put.
///   4. Picks uniformly at random among what is left.
///
/// There is no target tile; the mode only changes what contact means.
/// The RNG is injected so a seeded world replays identically.

use rand::Rng;

use super::entity::{Direction, Pos};
use super::grid::Grid;
use super::rules::is_valid_move;

pub fn choose_direction<R: Rng + ?Sized>(
    grid: &Grid,
    pos: Pos,
    heading: Direction,
    rng: &mut R,
) -> Direction {
    let reverse = heading.opposite();
    let options: Vec<Direction> = Direction::ALL
        .iter()
        .copied()
        .filter(|&d| d != reverse && is_valid_move(grid, pos, d))
        .collect();

    if options.is_empty() {
        return if reverse != Direction::None && is_valid_move(grid, pos, reverse) {
            reverse
        } else {
            Direction::None
        };
    }

    options[rng.random_range(0..options.len())]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::domain::grid::tests::grid_from;

    #[test]
    fn corridor_never_reverses() {
        let g = grid_from(&[
            "#######",
            "#.....#",
            "#######",
        ]);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(choose_direction(&g, Pos::new(3, 1), Direction::Right, &mut rng), Direction::Right);
        }
    }

    #[test]
    fn dead_end_forces_reverse() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "#####",
        ]);
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(choose_direction(&g, Pos::new(3, 1), Direction::Right, &mut rng), Direction::Left);
    }

    #[test]
    fn boxed_in_holds_position() {
        let g = grid_from(&[
            "###",
            "#.#",
            "###",
        ]);
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(choose_direction(&g, Pos::new(1, 1), Direction::Up, &mut rng), Direction::None);
        assert_eq!(choose_direction(&g, Pos::new(1, 1), Direction::None, &mut rng), Direction::None);
    }

    #[test]
    fn junction_uses_every_forward_option() {
        let g = grid_from(&[
            "#####",
            "#...#",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        // at (1,1) heading Left: Up/Left are walls, Right is the reverse,
        // so only Down remains
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(choose_direction(&g, Pos::new(1, 1), Direction::Left, &mut rng), Direction::Down);

        // open cross: heading Up, options are Up/Left/Right
        let g = grid_from(&[
            "#.#",
            "...",
            "#.#",
        ]);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(choose_direction(&g, Pos::new(1, 1), Direction::Up, &mut rng));
        }
        assert_eq!(seen, HashSet::from([Direction::Up, Direction::Left, Direction::Right]));
    }

    #[test]
    fn same_seed_same_walk() {
        let g = grid_from(&[
            "#.#",
            "...",
            "#.#",
        ]);
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        for _ in 0..32 {
            assert_eq!(
                choose_direction(&g, Pos::new(1, 1), Direction::None, &mut a),
                choose_direction(&g, Pos::new(1, 1), Direction::None, &mut b),
            );
        }
    }
}
