use crate::Coords;
use crate::grid::{self, CAPACITY, HEIGHT, WIDTH};
use crate::snake::Snake;

use rand::Rng;
use rand::seq::IteratorRandom;

/// Random draws to try before scanning the whole board for a free cell.
const MAX_SAMPLES: usize = CAPACITY;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FoodKind {
    Normal,
    Bonus,
}

impl FoodKind {
    pub fn glyph(self) -> char {
        match self {
            FoodKind::Normal => '+',
            FoodKind::Bonus => '*',
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Food {
    pub pos: Coords,
    pub kind: FoodKind,
}

pub fn spawn<R: Rng + ?Sized>(rng: &mut R, snake: &Snake) -> Food {
    let pos = sample_free(rng, snake)
        .or_else(|| scan_free(rng, snake))
        // The snake is always shorter than the board, so this is never hit.
        .unwrap_or((1, 1));

    // One outcome in seven is a bonus
    let kind = if rng.gen_range(0..=6) == 6 { FoodKind::Bonus } else { FoodKind::Normal };

    Food { pos, kind }
}

fn sample_free<R: Rng + ?Sized>(rng: &mut R, snake: &Snake) -> Option<Coords> {
    (0..MAX_SAMPLES)
        .map(|_| (rng.gen_range(1..WIDTH - 1), rng.gen_range(1..HEIGHT - 1)))
        .find(|pos| !grid::is_occupied(*pos, snake))
}

fn scan_free<R: Rng + ?Sized>(rng: &mut R, snake: &Snake) -> Option<Coords> {
    tracing::debug!(length = snake.len(), "food sampling exhausted, scanning the board");
    grid::interior()
        .filter(|pos| !grid::is_occupied(*pos, snake))
        .choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn never_spawns_on_the_snake() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut snake = Snake::new();
        let turns = [Direction::Down, Direction::Right, Direction::Up, Direction::Right];

        for trial in 0..10_000 {
            if trial % 50 == 0 {
                snake.grow(FoodKind::Normal);
            }
            snake.turn(turns[(trial / 9) % turns.len()]);
            snake.advance(true);

            let food = spawn(&mut rng, &snake);
            assert!(!snake.body().contains(&food.pos));
            assert!(!grid::is_wall(food.pos));
        }
    }

    #[test]
    fn bonus_is_about_one_in_seven() {
        let mut rng = StdRng::seed_from_u64(42);
        let snake = Snake::new();

        let bonus = (0..7_000)
            .filter(|_| spawn(&mut rng, &snake).kind == FoodKind::Bonus)
            .count();

        assert!((800..1200).contains(&bonus), "got {} bonus foods", bonus);
    }

    #[test]
    fn scan_finds_a_free_cell() {
        let mut rng = StdRng::seed_from_u64(3);
        let snake = Snake::new();

        let pos = scan_free(&mut rng, &snake).unwrap();
        assert!(!grid::is_occupied(pos, &snake));
    }
}
