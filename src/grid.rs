use crate::{Coords, TermInt};
use crate::food::Food;
use crate::snake::Snake;

/// Width of the play field, walls included.
pub const WIDTH: TermInt = 78;
/// Height of the play field, walls included.
pub const HEIGHT: TermInt = 23;
/// Number of interior cells, i.e. the longest the snake can ever be.
pub const CAPACITY: usize = (HEIGHT as usize - 2) * (WIDTH as usize - 2);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
    Snake,
    Food,
}

pub fn is_wall((x, y): Coords) -> bool {
    x == 0 || y == 0 || x >= WIDTH - 1 || y >= HEIGHT - 1
}

/// Whether `pos` is covered by the snake's body. The head is not part of
/// the body, so a head can be tested against it before deciding on death.
pub fn is_body(pos: Coords, snake: &Snake) -> bool {
    snake.body()[1..].contains(&pos)
}

/// Like `is_body`, but the head counts too.
pub fn is_occupied(pos: Coords, snake: &Snake) -> bool {
    snake.body().contains(&pos)
}

pub fn is_food(pos: Coords, food: &Food) -> bool {
    food.pos == pos
}

pub fn classify(pos: Coords, snake: &Snake, food: &Food) -> Cell {
    if is_wall(pos) {
        Cell::Wall
    } else if is_body(pos, snake) {
        Cell::Snake
    } else if is_food(pos, food) {
        Cell::Food
    } else {
        Cell::Empty
    }
}

/// Every non-wall cell, row by row.
pub fn interior() -> impl Iterator<Item = Coords> {
    (1..HEIGHT - 1).flat_map(|y| (1..WIDTH - 1).map(move |x| (x, y)))
}
