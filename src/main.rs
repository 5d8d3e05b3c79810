mod config;
mod food;
mod game;
mod grid;
mod score;
mod snake;
mod term;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

use config::Config;
use game::{Session, SnakeGame, State};
use term::TermManager;

pub type TermInt = u16;
pub type Coords = (u16, u16);

#[derive(Parser, Debug)]
#[command(name = "nsnake", version, about = "A snake game for your terminal")]
struct Cli {
    /// Disable colors.
    #[arg(short = 'c', long)]
    no_color: bool,

    /// Snake color, 0 to 7.
    #[arg(short = 'C', long, default_value_t = i64::from(config::DEFAULT_COLOR), allow_negative_numbers = true)]
    color: i64,

    /// Don't record scores.
    #[arg(short = 'n', long)]
    no_score: bool,

    /// Print the high scores and exit.
    #[arg(short = 's', long)]
    scores: bool,

    /// Say which table is printed with --scores.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable wall crossing; touching a wall kills the snake.
    #[arg(short = 'w', long)]
    no_warp: bool,

    /// Directory holding the score files.
    #[arg(long, env = "NSNAKE_SCORE_DIR")]
    score_dir: Option<PathBuf>,

    /// Where RUST_LOG output goes; the game owns the terminal while it runs.
    #[arg(long, env = "NSNAKE_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Config {
        let defaults = Config::default();

        Config {
            color_enabled: !self.no_color,
            scoring_enabled: !self.no_score,
            wall_crossing_enabled: !self.no_warp,
            score_dir: self.score_dir.clone().unwrap_or(defaults.score_dir),
            ..defaults
        }
        .with_color(self.color)
    }

    fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("nsnake.log"))
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_path());

    // The terminal is restored by the time `run` returns
    if let Err(err) = run(&cli) {
        eprintln!("nsnake: {:#}", err);
        exit(1);
    }
}

/// Logging stays off unless `RUST_LOG` is set, and then goes to a file so it
/// never draws over the play field.
fn init_tracing(path: &Path) {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let file = match File::create(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("nsnake: logging disabled, could not create {}: {}", path.display(), err);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config();
    info!(?config, "starting");

    if cli.scores {
        return print_scores(&config, cli.verbose);
    }

    let term = TermManager::new(config.color_enabled).context("failed to set up the terminal")?;
    let session = Session::new(config, StdRng::from_entropy());
    let mut game = SnakeGame::new(term, session, State::Menu);

    game.run()?;
    Ok(())
}

fn print_scores(config: &Config, verbose: bool) -> Result<()> {
    let warp = config.wall_crossing_enabled;
    let table = score::ScoreStore::new(&config.score_dir)
        .table(warp)
        .context("could not read the score file")?;
    info!(warp, entries = table.len(), "printing scores");

    if verbose {
        println!("Wall crossing {}", if warp { "enabled" } else { "disabled" });
    }

    for entry in table.entries() {
        println!("{:<16}{:<10} {}", entry.name, entry.score, entry.local_time("%c"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_build_the_config() {
        let cli = Cli::parse_from(["nsnake", "-c", "-n", "-w", "-C", "5", "--score-dir", "/tmp/scores"]);
        let config = cli.config();

        assert!(!config.color_enabled);
        assert!(!config.scoring_enabled);
        assert!(!config.wall_crossing_enabled);
        assert_eq!(config.color_index, 5);
        assert_eq!(config.score_dir, PathBuf::from("/tmp/scores"));
    }

    #[test]
    fn defaults_enable_everything() {
        let config = Cli::parse_from(["nsnake", "--score-dir", "."]).config();

        assert!(config.color_enabled && config.scoring_enabled && config.wall_crossing_enabled);
        assert_eq!(config.color_index, config::DEFAULT_COLOR);
    }

    #[test]
    fn logs_go_to_a_file_not_the_terminal() {
        let cli = Cli::parse_from(["nsnake", "--log-file", "/tmp/nsnake-test.log"]);
        assert_eq!(cli.log_path(), PathBuf::from("/tmp/nsnake-test.log"));

        let cli = Cli::parse_from(["nsnake"]);
        if std::env::var_os("NSNAKE_LOG_FILE").is_none() {
            assert_eq!(cli.log_path(), std::env::temp_dir().join("nsnake.log"));
        }
    }

    #[test]
    fn invalid_color_falls_back() {
        let config = Cli::parse_from(["nsnake", "-C", "-3", "--score-dir", "."]).config();
        assert_eq!(config.color_index, config::DEFAULT_COLOR);
    }
}
