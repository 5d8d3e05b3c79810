use std::path::PathBuf;

/// Snake color used when none, or an invalid one, is given.
pub const DEFAULT_COLOR: u8 = 2;
pub const COLOR_COUNT: u8 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub color_enabled: bool,
    pub color_index: u8,
    pub scoring_enabled: bool,
    pub wall_crossing_enabled: bool,
    pub score_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            color_enabled: true,
            color_index: DEFAULT_COLOR,
            scoring_enabled: true,
            wall_crossing_enabled: true,
            score_dir: default_score_dir(),
        }
    }
}

impl Config {
    pub fn with_color(mut self, color: i64) -> Self {
        self.color_index = normalize_color(color);
        self
    }

    pub fn cycle_color(&mut self) {
        self.color_index = (self.color_index + 1) % COLOR_COUNT;
    }
}

pub fn normalize_color(color: i64) -> u8 {
    u8::try_from(color)
        .ok()
        .filter(|c| *c < COLOR_COUNT)
        .unwrap_or(DEFAULT_COLOR)
}

/// `<data dir>/nsnake`, or the working directory if there is no data dir.
pub fn default_score_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("nsnake"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_colors_fall_back_to_green() {
        assert_eq!(normalize_color(5), 5);
        assert_eq!(normalize_color(0), 0);
        assert_eq!(normalize_color(8), DEFAULT_COLOR);
        assert_eq!(normalize_color(-1), DEFAULT_COLOR);
        assert_eq!(normalize_color(1_000), DEFAULT_COLOR);
    }

    #[test]
    fn colors_cycle_through_eight() {
        let mut config = Config::default().with_color(7);
        config.cycle_color();
        assert_eq!(config.color_index, 0);
    }
}
