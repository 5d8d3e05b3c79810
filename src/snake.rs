use crate::Coords;
use crate::food::{Food, FoodKind};
use crate::grid::{self, CAPACITY, HEIGHT, WIDTH};
use Direction::*;

const START_LENGTH: usize = 4;
const START_HEAD: Coords = (10, 5);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }
}

/// What eating did to the snake.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Growth {
    Grew,
    ScoreOnly,
    /// The board filled up and the snake went back to its starting length.
    Reset,
}

/// The snake keeps its whole trajectory: `pos[i]` is where the head was `i`
/// ticks ago. Only the first `length` entries are the body, the rest is trail
/// that growing pulls back in.
pub struct Snake {
    pos: [Coords; CAPACITY],
    length: usize,
    direction: Direction,
    score: u32,
    paused: bool,
}

impl Snake {
    pub fn new() -> Self {
        let mut snake = Snake {
            pos: [START_HEAD; CAPACITY],
            length: START_LENGTH,
            direction: Right,
            score: 0,
            paused: false,
        };
        snake.reset();
        snake
    }

    pub fn reset(&mut self) {
        let (x, y) = START_HEAD;
        for i in 0..START_LENGTH {
            self.pos[i] = (x - i as u16, y);
        }

        let tail = self.pos[START_LENGTH - 1];
        self.pos[START_LENGTH..].fill(tail);

        self.length = START_LENGTH;
        self.direction = Right;
        self.score = 0;
        self.paused = false;
    }

    pub fn body(&self) -> &[Coords] {
        &self.pos[..self.length]
    }

    pub fn head(&self) -> Coords {
        self.pos[0]
    }

    /// The cell the tail left on the last advance.
    pub fn vacated(&self) -> Coords {
        self.pos[self.length]
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Changes direction unless that would turn the snake back onto itself.
    pub fn turn(&mut self, new_direction: Direction) -> bool {
        if new_direction == self.direction.opposite() {
            return false;
        }

        self.direction = new_direction;
        true
    }

    pub fn advance(&mut self, warp: bool) {
        self.pos.copy_within(0..CAPACITY - 1, 1);

        let (dx, dy) = self.direction.delta();
        let (x, y) = self.pos[0];
        let head = (x.saturating_add_signed(dx), y.saturating_add_signed(dy));

        self.pos[0] = if warp { warp_around(head) } else { head };
    }

    pub fn is_dead(&self, warp: bool) -> bool {
        let head = self.head();
        grid::is_body(head, self) || (!warp && grid::is_wall(head))
    }

    pub fn consume(&self, food: &Food) -> bool {
        grid::is_food(self.head(), food)
    }

    /// Normal food adds two segments since the new tail only shows up after
    /// the next shift; both kinds score one point.
    pub fn grow(&mut self, kind: FoodKind) -> Growth {
        self.score += 1;

        if kind == FoodKind::Bonus {
            return Growth::ScoreOnly;
        }

        self.length += 2;
        if self.length >= CAPACITY {
            self.length = START_LENGTH;
            return Growth::Reset;
        }

        Growth::Grew
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

/// A head landing on a wall comes out on the opposite interior edge.
fn warp_around((x, y): Coords) -> Coords {
    if x == WIDTH - 1 {
        (1, y)
    } else if x == 0 {
        (WIDTH - 2, y)
    } else if y == HEIGHT - 1 {
        (x, 1)
    } else if y == 0 {
        (x, HEIGHT - 2)
    } else {
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steer(snake: &mut Snake, path: &[Direction], warp: bool) {
        for dir in path {
            snake.turn(*dir);
            snake.advance(warp);
        }
    }

    #[test]
    fn reset_lays_out_four_segments_heading_right() {
        let mut snake = Snake::new();
        steer(&mut snake, &[Down, Down, Left], true);
        snake.grow(FoodKind::Normal);
        snake.reset();

        assert_eq!(snake.body(), &[(10, 5), (9, 5), (8, 5), (7, 5)]);
        assert_eq!(snake.direction(), Right);
        assert_eq!(snake.score(), 0);
        assert!(!snake.is_paused());
    }

    #[test]
    fn turn_never_reverses() {
        for start in [Up, Down, Left, Right] {
            for wanted in [Up, Down, Left, Right] {
                let mut snake = Snake::new();
                if start == Left {
                    steer(&mut snake, &[Up, Left], true);
                } else {
                    snake.turn(start);
                }
                let before = snake.direction();
                snake.turn(wanted);
                assert_ne!(snake.direction(), before.opposite());
            }
        }
    }

    #[test]
    fn advance_shifts_every_segment_one_slot() {
        let mut snake = Snake::new();
        snake.grow(FoodKind::Normal);
        steer(&mut snake, &[Down, Down, Right], true);

        let before = snake.body().to_vec();
        snake.advance(true);

        for i in 1..snake.len() {
            assert_eq!(snake.body()[i], before[i - 1]);
        }
        assert_eq!(snake.head(), (before[0].0 + 1, before[0].1));
    }

    #[test]
    fn biting_the_body_is_fatal() {
        let mut snake = Snake::new();
        for _ in 0..3 {
            snake.grow(FoodKind::Normal);
        }
        steer(&mut snake, &[Right, Right, Right, Right, Right], true);
        assert!(!snake.is_dead(true));

        steer(&mut snake, &[Down, Left, Up], true);
        assert!(snake.is_dead(true));
    }

    #[test]
    fn dead_whenever_head_matches_a_segment() {
        for grown in 0..4 {
            let mut snake = Snake::new();
            for _ in 0..grown {
                snake.grow(FoodKind::Normal);
            }
            steer(&mut snake, &[Right; 12], true);

            for segment in 1..snake.len() {
                let saved = snake.pos[0];
                snake.pos[0] = snake.pos[segment];
                assert!(snake.is_dead(true), "length {} segment {}", snake.len(), segment);
                snake.pos[0] = saved;
            }
            assert!(!snake.is_dead(true));
        }
    }

    #[test]
    fn walls_kill_only_without_warp() {
        let mut snake = Snake::new();
        steer(&mut snake, &[Up; 4], false);
        assert_eq!(snake.head(), (10, 1));
        assert!(!snake.is_dead(false));

        snake.advance(false);
        assert_eq!(snake.head(), (10, 0));
        assert!(snake.is_dead(false));
    }

    /// Puts a fresh snake's head at `from`, heading `path`, and advances once.
    fn warp_from(from: Coords, path: &[Direction]) -> Snake {
        let mut snake = Snake::new();
        for dir in path {
            snake.turn(*dir);
        }
        snake.pos[0] = from;
        snake.advance(true);
        snake
    }

    #[test]
    fn warp_wraps_each_edge() {
        let cases = [
            ((WIDTH - 2, 7), &[Right][..], (1, 7)),
            ((1, 7), &[Up, Left][..], (WIDTH - 2, 7)),
            ((20, HEIGHT - 2), &[Down][..], (20, 1)),
            ((20, 1), &[Up][..], (20, HEIGHT - 2)),
        ];

        for (from, path, to) in cases {
            let snake = warp_from(from, path);
            assert_eq!(snake.head(), to);
            assert!(!snake.is_dead(true), "died warping from {:?}", from);
        }
    }

    #[test]
    fn normal_food_adds_two_segments() {
        let mut snake = Snake::new();
        assert_eq!(snake.grow(FoodKind::Normal), Growth::Grew);
        assert_eq!(snake.len(), 6);
        assert_eq!(snake.score(), 1);
    }

    #[test]
    fn bonus_food_only_scores() {
        let mut snake = Snake::new();
        assert_eq!(snake.grow(FoodKind::Bonus), Growth::ScoreOnly);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.score(), 1);
    }

    #[test]
    fn filling_the_board_resets_length() {
        let mut snake = Snake::new();
        snake.length = CAPACITY - 2;
        assert_eq!(snake.grow(FoodKind::Normal), Growth::Reset);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.score(), 1);
    }

    #[test]
    fn consume_matches_the_head_only() {
        let snake = Snake::new();
        let under_head = Food { pos: snake.head(), kind: FoodKind::Normal };
        let under_body = Food { pos: snake.body()[2], kind: FoodKind::Bonus };

        assert!(snake.consume(&under_head));
        assert!(!snake.consume(&under_body));
    }
}
