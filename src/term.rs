use crate::{Coords, TermInt};
use crate::grid::{HEIGHT, WIDTH};
use std::{io::{self, Stdout, Write, stdout}, thread, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, read, poll};
use crossterm::style::{Attribute, Color};
use thiserror::Error;

/// Smallest terminal that fits the play field, its walls and the score line.
pub const MIN_COLS: TermInt = WIDTH + 2;
pub const MIN_ROWS: TermInt = HEIGHT + 2;

const COLORS: [Color; 8] = [
    Color::Black,
    Color::DarkRed,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkMagenta,
    Color::DarkCyan,
    Color::Grey,
];

#[derive(Debug, Error)]
pub enum TermError {
    #[error("terminal too small ({width}x{height}), need at least {}x{}", MIN_COLS, MIN_ROWS)]
    TooSmall { width: TermInt, height: TermInt },
    #[error("terminal error: {0}")]
    Crossterm(#[from] crossterm::ErrorKind),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

/// A keystroke, reduced to what the game cares about.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Char(char),
    /// Ctrl+C
    Interrupt,
    Other,
}

impl From<KeyEvent> for Key {
    fn from(ev: KeyEvent) -> Self {
        match ev {
            KeyEvent { code: KeyCode::Char('c'), modifiers } if modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
            KeyEvent { code, modifiers: _ } => match code {
                KeyCode::Up => Key::Up,
                KeyCode::Down => Key::Down,
                KeyCode::Left => Key::Left,
                KeyCode::Right => Key::Right,
                KeyCode::Enter => Key::Enter,
                KeyCode::Char(c) => Key::Char(c),
                _ => Key::Other,
            }
        }
    }
}

/// How a glyph is drawn. Snake paints carry the color index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Paint {
    Plain,
    Snake(u8),
    Head(u8),
    Food,
}

/// Everything the game needs from the terminal. Positions are play field
/// coordinates, walls included.
pub trait Frontend {
    fn poll_key(&mut self) -> Result<Option<Key>, TermError>;
    fn read_key_blocking(&mut self) -> Result<Key, TermError>;
    fn print_at(&mut self, pos: Coords, ch: char, paint: Paint) -> Result<(), TermError>;
    fn print_status(&mut self, text: &str) -> Result<(), TermError>;
    /// Clears the screen and draws an empty, walled play field.
    fn clear(&mut self) -> Result<(), TermError>;
    fn show_message(&mut self, lines: &[&str]) -> Result<(), TermError>;
    fn hide_message(&mut self) -> Result<(), TermError>;
    fn flush(&mut self) -> Result<(), TermError>;
    fn sleep(&mut self, duration: Duration);
    /// Throws away keys typed so far, so a prompt only sees fresh input.
    fn drain_input(&mut self) -> Result<(), TermError>;
}

pub struct TermManager {
    origin: Coords,
    colors: bool,
    stdout: Stdout,
    screen: Vec<(char, Paint)>,
    status: String,
    current_msg: Option<Message>,
}

struct Message {
    lines: Vec<String>,
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new(colors: bool) -> Result<Self, TermError> {
        let (width, height) = terminal::size()?;
        check_size(width, height)?;

        let mut term = TermManager {
            origin: frame_origin(width, height),
            colors,
            stdout: stdout(),
            screen: vec![(' ', Paint::Plain); WIDTH as usize * HEIGHT as usize],
            status: String::new(),
            current_msg: None,
        };
        term.setup()?;

        Ok(term)
    }

    fn setup(&mut self) -> Result<(), TermError> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), TermError> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        Ok(())
    }

    fn next_key(&mut self, ev: Event) -> Result<Option<Key>, TermError> {
        match ev {
            Event::Key(ev) => Ok(Some(ev.into())),
            Event::Resize(width, height) => {
                self.resize(width, height)?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Re-centers the play field and repaints it from the screen buffer.
    fn resize(&mut self, width: TermInt, height: TermInt) -> Result<(), TermError> {
        tracing::debug!(width, height, "terminal resized");
        check_size(width, height)?;

        self.origin = frame_origin(width, height);

        let lines = self.current_msg.take().map(|msg| msg.lines);
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.draw_borders()?;
        for y in 1..HEIGHT - 1 {
            for x in 1..WIDTH - 1 {
                let (ch, paint) = self.screen[index((x, y))];
                self.paint_at((x, y), ch, paint)?;
            }
        }

        let status = std::mem::take(&mut self.status);
        self.print_status(&status)?;

        if let Some(lines) = lines {
            let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
            self.show_message(&lines)?;
        }

        self.flush()
    }

    fn draw_borders(&mut self) -> Result<(), TermError> {
        let end_x = WIDTH - 1;
        let end_y = HEIGHT - 1;

        for x in 0..WIDTH {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.paint_at((x, 0), ch, Paint::Plain)?;
            self.paint_at((x, end_y), ch, Paint::Plain)?;
        }

        for y in 1..end_y {
            self.paint_at((0, y), '|', Paint::Plain)?;
            self.paint_at((end_x, y), '|', Paint::Plain)?;
        }

        Ok(())
    }

    fn paint_at(&mut self, pos: Coords, ch: char, paint: Paint) -> Result<(), TermError> {
        let at = cursor::MoveTo(self.origin.0 + pos.0, self.origin.1 + pos.1);

        match (self.colors, paint) {
            (false, _) | (true, Paint::Plain) => queue!(self.stdout, at, style::Print(ch))?,
            (true, Paint::Snake(color)) => queue!(
                self.stdout,
                at,
                style::SetForegroundColor(snake_color(color)),
                style::Print(ch),
                style::ResetColor
            )?,
            (true, Paint::Head(color)) => queue!(
                self.stdout,
                at,
                style::SetForegroundColor(snake_color(color)),
                style::SetAttribute(Attribute::Bold),
                style::Print(ch),
                style::SetAttribute(Attribute::Reset),
                style::ResetColor
            )?,
            (true, Paint::Food) => queue!(
                self.stdout,
                at,
                style::SetForegroundColor(Color::Yellow),
                style::SetAttribute(Attribute::Bold),
                style::Print(ch),
                style::SetAttribute(Attribute::Reset),
                style::ResetColor
            )?,
        }

        Ok(())
    }

    fn covered_by_message(&self, (x, y): Coords) -> bool {
        match &self.current_msg {
            Some(msg) => {
                let (left, top) = msg.top_left;
                (left..left + msg.width).contains(&x) && (top..top + msg.height).contains(&y)
            }
            None => false,
        }
    }
}

impl Frontend for TermManager {
    fn poll_key(&mut self) -> Result<Option<Key>, TermError> {
        while poll(Duration::from_millis(0))? {
            if let Some(key) = self.next_key(read()?)? {
                return Ok(Some(key));
            }
        }

        Ok(None)
    }

    fn read_key_blocking(&mut self) -> Result<Key, TermError> {
        loop {
            if let Some(key) = self.next_key(read()?)? {
                return Ok(key);
            }
        }
    }

    fn print_at(&mut self, pos: Coords, ch: char, paint: Paint) -> Result<(), TermError> {
        self.screen[index(pos)] = (ch, paint);

        // Cells under a message are repainted from the buffer when it hides
        if self.covered_by_message(pos) {
            return Ok(());
        }

        self.paint_at(pos, ch, paint)
    }

    fn print_status(&mut self, text: &str) -> Result<(), TermError> {
        let (col, row) = status_position(self.origin);
        let at = cursor::MoveTo(col, row);
        queue!(
            self.stdout,
            at,
            terminal::Clear(ClearType::CurrentLine),
            style::SetAttribute(Attribute::Bold),
            style::Print(text),
            style::SetAttribute(Attribute::Reset)
        )?;

        self.status = text.to_string();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), TermError> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![(' ', Paint::Plain); WIDTH as usize * HEIGHT as usize];
        self.status.clear();
        self.current_msg = None;
        self.draw_borders()
    }

    fn show_message(&mut self, lines: &[&str]) -> Result<(), TermError> {
        if self.current_msg.is_some() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let top_left = (
            (WIDTH / 2).saturating_sub(msg_width / 2),
            (HEIGHT / 2).saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.paint_at((top_left.0 + x_diff, *y), ' ', Paint::Plain)?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.paint_at((top_left.0 + x_diff as TermInt, y), ch, Paint::Plain)?;
            }
        }

        self.current_msg = Some(Message {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            top_left,
            width: msg_width,
            height: msg_height,
        });
        self.flush()
    }

    fn hide_message(&mut self) -> Result<(), TermError> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left;

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let pos = (top_left.0 + x_diff, top_left.1 + y_diff);
                let (ch, paint) = self.screen[index(pos)];
                self.paint_at(pos, ch, paint)?;
            }
        }

        self.flush()
    }

    fn flush(&mut self) -> Result<(), TermError> {
        self.stdout.flush()?;
        Ok(())
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn drain_input(&mut self) -> Result<(), TermError> {
        while poll(Duration::from_millis(0))? {
            // Resizes still go through `next_key` so the frame follows them
            let _ = self.next_key(read()?)?;
        }

        Ok(())
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::error!(?err, "failed to restore the terminal");
        }
    }
}

fn check_size(width: TermInt, height: TermInt) -> Result<(), TermError> {
    if width < MIN_COLS || height < MIN_ROWS {
        return Err(TermError::TooSmall { width, height });
    }
    Ok(())
}

/// Top-left corner of the play field, centered with a row left for the score.
fn frame_origin(width: TermInt, height: TermInt) -> Coords {
    let x = width.saturating_sub(WIDTH) / 2;
    let y = (height.saturating_sub(HEIGHT) / 2).max(1);
    (x, y)
}

/// The score line sits on the row just above the play field.
fn status_position((x, y): Coords) -> Coords {
    (x, y.saturating_sub(1))
}

fn index((x, y): Coords) -> usize {
    WIDTH as usize * y as usize + x as usize
}

fn snake_color(index: u8) -> Color {
    COLORS[index as usize % COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Key {
        KeyEvent { code, modifiers }.into()
    }

    #[test]
    fn keys_map_to_logical_codes() {
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE), Key::Up);
        assert_eq!(key(KeyCode::Enter, KeyModifiers::NONE), Key::Enter);
        assert_eq!(key(KeyCode::Char('h'), KeyModifiers::NONE), Key::Char('h'));
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::NONE), Key::Char('c'));
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::CONTROL), Key::Interrupt);
        assert_eq!(key(KeyCode::F(1), KeyModifiers::NONE), Key::Other);
    }

    #[test]
    fn size_gate_matches_the_field() {
        assert!(check_size(MIN_COLS, MIN_ROWS).is_ok());
        assert!(matches!(check_size(MIN_COLS - 1, MIN_ROWS), Err(TermError::TooSmall { .. })));
        assert!(matches!(check_size(MIN_COLS, MIN_ROWS - 1), Err(TermError::TooSmall { .. })));
    }

    #[test]
    fn field_is_centered_below_the_score_line() {
        assert_eq!(frame_origin(MIN_COLS, MIN_ROWS), (1, 1));
        assert_eq!(frame_origin(WIDTH + 20, HEIGHT + 10), (10, 5));

        let origin = frame_origin(WIDTH + 20, HEIGHT + 10);
        assert_eq!(status_position(origin), (10, 4));
        assert_eq!(status_position(frame_origin(MIN_COLS, MIN_ROWS)), (1, 0));
    }
}
