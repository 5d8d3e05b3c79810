use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone, Utc};
use thiserror::Error;

/// Entries kept per table.
pub const MAX_SCORES: usize = 10;
/// Longest name stored with a score, in characters.
pub const NAME_LEN: usize = 32;

const UNKNOWN_PLAYER: &str = "unknown";
const WARP_FILE: &str = "scores-warp.txt";
const NO_WARP_FILE: &str = "scores-nowarp.txt";

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("could not access score file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub time: i64,
}

impl ScoreEntry {
    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.splitn(3, '|');
        let name = fields.next().filter(|name| !name.is_empty())?;
        let score = fields.next()?.parse().ok()?;
        let time = fields.next()?.parse().ok()?;

        Some(ScoreEntry { name: name.to_string(), score, time })
    }

    /// The timestamp in local time, or the raw number if it is out of range.
    pub fn local_time(&self, format: &str) -> String {
        match Local.timestamp_opt(self.time, 0).single() {
            Some(date) => date.format(format).to_string(),
            None => self.time.to_string(),
        }
    }
}

/// High scores in descending order. Slots fill from the top, the first empty
/// one ends the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreTable {
    slots: [Option<ScoreEntry>; MAX_SCORES],
}

impl ScoreTable {
    /// Parses records in file order and stops at the first line that isn't
    /// one, including a line that isn't valid UTF-8.
    pub fn parse(bytes: &[u8]) -> Self {
        let mut table = ScoreTable::default();
        let records = bytes
            .split(|b| *b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .map(|line| std::str::from_utf8(line).ok().and_then(ScoreEntry::parse));

        for (slot, entry) in table.slots.iter_mut().zip(records) {
            match entry {
                Some(entry) => *slot = Some(entry),
                None => break,
            }
        }

        table
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.slots.iter().map_while(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    /// Puts `entry` above the first score it ties or beats and returns its
    /// rank, or `None` when it doesn't make the table.
    pub fn insert(&mut self, entry: ScoreEntry) -> Option<usize> {
        let rank = self.slots.iter().position(|slot| match slot {
            Some(existing) => existing.score <= entry.score,
            None => true,
        })?;

        // The last slot rotates to `rank` and is overwritten
        self.slots[rank..].rotate_right(1);
        self.slots[rank] = Some(entry);

        Some(rank)
    }

    pub fn to_records(&self) -> String {
        self.entries()
            .map(|e| format!("{}|{}|{}\n", e.name, e.score, e.time))
            .collect()
    }
}

/// Reads a table, treating a missing file as an empty one.
pub fn read(path: &Path) -> Result<ScoreTable, ScoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(ScoreTable::parse(&bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(ScoreTable::default()),
        Err(source) => Err(ScoreError::Io { path: path.to_path_buf(), source }),
    }
}

pub fn write(path: &Path, table: &ScoreTable) -> Result<(), ScoreError> {
    let io_err = |source| ScoreError::Io { path: path.to_path_buf(), source };

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    fs::write(path, table.to_records()).map_err(io_err)
}

/// The two score files, one per wall-crossing setting.
pub struct ScoreStore {
    dir: PathBuf,
}

impl ScoreStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ScoreStore { dir: dir.into() }
    }

    pub fn path(&self, warp: bool) -> PathBuf {
        self.dir.join(if warp { WARP_FILE } else { NO_WARP_FILE })
    }

    pub fn table(&self, warp: bool) -> Result<ScoreTable, ScoreError> {
        read(&self.path(warp))
    }

    /// Records a finished run. Returns the rank it got, or `None` if it didn't
    /// qualify, in which case the file is left alone.
    pub fn register(&self, warp: bool, name: &str, score: u32, time: i64) -> Result<Option<usize>, ScoreError> {
        let path = self.path(warp);
        let mut table = read(&path)?;

        let entry = ScoreEntry { name: name.to_string(), score, time };
        let rank = match table.insert(entry) {
            Some(rank) => rank,
            None => return Ok(None),
        };

        write(&path, &table)?;
        tracing::info!(path = %path.display(), rank, score, "registered score");

        Ok(Some(rank))
    }
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// The account name of whoever is playing, fit for a score record.
pub fn player_name() -> String {
    let account = ["USER", "LOGNAME", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok());

    sanitize_name(account.as_deref())
}

fn sanitize_name(account: Option<&str>) -> String {
    let name: String = account
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != '|' && !c.is_control())
        .take(NAME_LEN)
        .collect();

    if name.is_empty() {
        UNKNOWN_PLAYER.to_string()
    } else {
        name
    }
}
