use std::time::Duration;

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::food::{self, Food};
use crate::grid::{self, Cell};
use crate::score::{self, ScoreStore, ScoreTable};
use crate::snake::{Direction::{self, *}, Growth, Snake};
use crate::term::{Frontend, Key, Paint, TermError};

// Terminal cells are taller than they are wide, so vertical moves wait longer
const VERTICAL_DELAY: Duration = Duration::from_millis(118);
const HORIZONTAL_DELAY: Duration = Duration::from_millis(100);
const ERASE_DELAY: Duration = Duration::from_millis(50);

const SNAKE_BODY_CHAR: char = '#';
const SNAKE_HEAD_CHAR: char = '@';

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Menu,
    Run,
    ScoreDisplay,
    Terminated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Tick {
    Running,
    Died,
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Registration {
    Disabled,
    Ranked(usize),
    Unranked,
    Failed,
}

/// Everything a game owns between states.
pub struct Session {
    config: Config,
    snake: Snake,
    food: Food,
    rng: StdRng,
    scores: ScoreStore,
}

impl Session {
    pub fn new(config: Config, mut rng: StdRng) -> Self {
        let snake = Snake::new();
        let food = food::spawn(&mut rng, &snake);
        let scores = ScoreStore::new(&config.score_dir);

        Session { config, snake, food, rng, scores }
    }

    fn warp(&self) -> bool {
        self.config.wall_crossing_enabled
    }

    fn new_run(&mut self) {
        self.snake.reset();
        self.food = food::spawn(&mut self.rng, &self.snake);
    }

    fn feed(&mut self) -> Growth {
        let kind = self.food.kind;
        let growth = self.snake.grow(kind);
        self.food = food::spawn(&mut self.rng, &self.snake);

        debug!(?kind, ?growth, score = self.snake.score(), length = self.snake.len(), "food eaten");
        growth
    }

    fn register_score(&self) -> Registration {
        if !self.config.scoring_enabled {
            return Registration::Disabled;
        }

        let name = score::player_name();
        match self.scores.register(self.warp(), &name, self.snake.score(), score::now()) {
            Ok(Some(rank)) => Registration::Ranked(rank),
            Ok(None) => Registration::Unranked,
            Err(err) => {
                warn!(%err, "could not save score");
                Registration::Failed
            }
        }
    }
}

pub struct SnakeGame<F: Frontend> {
    term: F,
    session: Session,
    state: State,
}

impl<F: Frontend> SnakeGame<F> {
    pub fn new(term: F, session: Session, state: State) -> Self {
        SnakeGame { term, session, state }
    }

    pub fn run(&mut self) -> Result<(), TermError> {
        while self.state != State::Terminated {
            self.state = self.step()?;
        }

        Ok(())
    }

    pub fn step(&mut self) -> Result<State, TermError> {
        match self.state {
            State::Menu => self.menu(),
            State::Run => self.play(),
            State::ScoreDisplay => self.show_scores(),
            State::Terminated => Ok(State::Terminated),
        }
    }

    fn menu(&mut self) -> Result<State, TermError> {
        let config = &self.session.config;
        let lines = [
            "nsnake".to_string(),
            String::new(),
            "Enter  play".to_string(),
            "s      high scores".to_string(),
            format!("w      wall crossing: {}", on_off(config.wall_crossing_enabled)),
            format!("n      scoring: {}", on_off(config.scoring_enabled)),
            format!("c      color: {}", config.color_index),
            "q      quit".to_string(),
        ];

        self.term.clear()?;
        self.show(&lines)?;

        let config = &mut self.session.config;
        let next = match self.term.read_key_blocking()? {
            Key::Enter => State::Run,
            Key::Char('s') | Key::Char('S') => State::ScoreDisplay,
            Key::Char('w') | Key::Char('W') => {
                config.wall_crossing_enabled = !config.wall_crossing_enabled;
                State::Menu
            }
            Key::Char('n') | Key::Char('N') => {
                config.scoring_enabled = !config.scoring_enabled;
                State::Menu
            }
            Key::Char('c') | Key::Char('C') => {
                config.cycle_color();
                State::Menu
            }
            Key::Char('q') | Key::Char('Q') | Key::Interrupt => State::Terminated,
            _ => State::Menu,
        };

        Ok(next)
    }

    fn play(&mut self) -> Result<State, TermError> {
        self.start_run()?;

        let outcome = loop {
            match self.tick()? {
                Tick::Running => {}
                end => break end,
            }
        };

        let snake = &self.session.snake;
        info!(score = snake.score(), length = snake.len(), died = outcome == Tick::Died, "run over");

        self.erase_snake()?;
        let registration = self.session.register_score();

        if outcome == Tick::Quit {
            return Ok(State::Terminated);
        }

        // Keys held down during the run must not dismiss the prompt
        self.term.drain_input()?;
        self.game_over(registration)
    }

    fn start_run(&mut self) -> Result<(), TermError> {
        self.session.new_run();
        info!(warp = self.session.warp(), scoring = self.session.config.scoring_enabled, "run started");

        self.term.clear()?;
        self.draw_field()
    }

    /// One iteration of a run: input, simulation, drawing, then the delay.
    fn tick(&mut self) -> Result<Tick, TermError> {
        if let Some(key) = self.term.poll_key()? {
            if let Some(end) = self.handle_run_key(key)? {
                return Ok(end);
            }
        }

        if !self.session.snake.is_paused() {
            let warp = self.session.warp();
            let snake = &mut self.session.snake;

            snake.advance(warp);
            if snake.is_dead(warp) {
                return Ok(Tick::Died);
            }

            if snake.consume(&self.session.food) && self.session.feed() == Growth::Reset {
                self.term.clear()?;
                self.draw_field()?;
            }
        }

        self.draw()?;
        self.term.sleep(self.delay());

        Ok(Tick::Running)
    }

    fn handle_run_key(&mut self, key: Key) -> Result<Option<Tick>, TermError> {
        match key {
            Key::Char('q') | Key::Char('Q') | Key::Interrupt => return Ok(Some(Tick::Quit)),
            Key::Char('c') | Key::Char('C') => self.session.config.cycle_color(),
            _ if self.session.snake.is_paused() => self.set_paused(false)?,
            Key::Char('p') | Key::Char('P') => self.set_paused(true)?,
            key => {
                if let Some(dir) = direction_for(key) {
                    self.session.snake.turn(dir);
                }
            }
        }

        Ok(None)
    }

    fn set_paused(&mut self, paused: bool) -> Result<(), TermError> {
        self.session.snake.set_paused(paused);

        if paused {
            self.term.show_message(&["Paused", "", "Press any key to resume"])
        } else {
            self.term.hide_message()
        }
    }

    fn delay(&self) -> Duration {
        if self.session.snake.direction().is_vertical() {
            VERTICAL_DELAY
        } else {
            HORIZONTAL_DELAY
        }
    }

    /// Repaints every interior cell, then the snake and food on top.
    fn draw_field(&mut self) -> Result<(), TermError> {
        let Session { snake, food, config, .. } = &self.session;

        for pos in grid::interior() {
            let (ch, paint) = match grid::classify(pos, snake, food) {
                Cell::Snake => (SNAKE_BODY_CHAR, Paint::Snake(config.color_index)),
                Cell::Food => (food.kind.glyph(), Paint::Food),
                Cell::Empty | Cell::Wall => (' ', Paint::Plain),
            };
            self.term.print_at(pos, ch, paint)?;
        }

        self.draw()
    }

    fn draw(&mut self) -> Result<(), TermError> {
        let Session { snake, food, config, .. } = &self.session;
        let color = config.color_index;

        // The tail's old cell goes first, it may still be under the new tail
        self.term.print_at(snake.vacated(), ' ', Paint::Plain)?;
        for pos in &snake.body()[1..] {
            self.term.print_at(*pos, SNAKE_BODY_CHAR, Paint::Snake(color))?;
        }
        self.term.print_at(snake.head(), SNAKE_HEAD_CHAR, Paint::Head(color))?;
        self.term.print_at(food.pos, food.kind.glyph(), Paint::Food)?;

        self.term.print_status(&format!("Score : {}", snake.score()))?;
        self.term.flush()
    }

    fn erase_snake(&mut self) -> Result<(), TermError> {
        for pos in self.session.snake.body() {
            self.term.print_at(*pos, ' ', Paint::Plain)?;
            self.term.flush()?;
            self.term.sleep(ERASE_DELAY);
        }

        Ok(())
    }

    fn game_over(&mut self, registration: Registration) -> Result<State, TermError> {
        let verdict = match registration {
            Registration::Disabled => "Scoring disabled".to_string(),
            Registration::Ranked(rank) => format!("New high score, rank {}", rank + 1),
            Registration::Unranked => "Not a high score".to_string(),
            Registration::Failed => "Could not save the score".to_string(),
        };

        let lines = [
            "Game over!".to_string(),
            format!("Score: {}", self.session.snake.score()),
            verdict,
            String::new(),
            "Press any key to continue".to_string(),
        ];
        self.show(&lines)?;

        match self.term.read_key_blocking()? {
            Key::Interrupt => Ok(State::Terminated),
            _ => Ok(State::Menu),
        }
    }

    fn show_scores(&mut self) -> Result<State, TermError> {
        let warp = self.session.warp();
        let table = self.session.scores.table(warp).unwrap_or_else(|err| {
            warn!(%err, "could not read scores");
            ScoreTable::default()
        });

        let mut lines = vec![format!("High scores, wall crossing {}", on_off(warp)), String::new()];
        if table.is_empty() {
            lines.push("No scores yet".to_string());
        }
        for (rank, entry) in table.entries().enumerate() {
            lines.push(format!(
                "{:>2}. {:<16}{:>8}  {}",
                rank + 1,
                entry.name,
                entry.score,
                entry.local_time("%Y-%m-%d %H:%M")
            ));
        }
        lines.push(String::new());
        lines.push("Press any key to return".to_string());

        self.term.clear()?;
        self.show(&lines)?;

        match self.term.read_key_blocking()? {
            Key::Interrupt => Ok(State::Terminated),
            _ => Ok(State::Menu),
        }
    }

    fn show(&mut self, lines: &[String]) -> Result<(), TermError> {
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.term.show_message(&lines)
    }
}

/// Arrow keys, plus vi-style letters in either case.
fn direction_for(key: Key) -> Option<Direction> {
    match key {
        Key::Up | Key::Char('k') | Key::Char('K') => Some(Up),
        Key::Down | Key::Char('j') | Key::Char('J') => Some(Down),
        Key::Left | Key::Char('h') | Key::Char('H') => Some(Left),
        Key::Right | Key::Char('l') | Key::Char('L') => Some(Right),
        _ => None,
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
