/// Level loading: map text → `LevelDef` → `Spawns`.
///
/// ## Sources
///   1. `[general] level_file` from config.toml, if set
///   2. The built-in level
///
/// ## File format (`.txt`):
///   Lines starting with `#` are header lines; the first one names the level.
///   Every other line is a map row. Rows are padded with spaces to the
///   widest row so the grid is rectangular.
///
/// ## Tile legend (one tile = `TILE_SIZE` px):
///   'P' = Platform      'C' = Coin         'E' = Enemy
///   'B' = Beer          'S' = Sign         'D' = Door (last one wins)
///   anything else = empty

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::domain::entity::{
    Collectible, Door, Enemy, Platform, Sign, ENEMY_PATROL_RANGE,
};
use crate::domain::geometry::Rect;
use crate::domain::rules::{SCORE_BEER, SCORE_COIN};
use crate::domain::tile::Tile;

pub const TILE_SIZE: f32 = 64.0;

/// Pool a sign draws its message from.
pub const SIGN_MESSAGES: &[&str] = &[
    "Go Valenti!", "We love you", "Valenti for President", "Dream big",
    "You're our hero", "Champion!!!", "Long live Valenti", "The very best",
    "One of a kind", "Keep it up", "Mighty Valenti", "Number one",
    "Don't give up", "We're with you", "Everybody loves you", "Big news at home",
];

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

impl LevelDef {
    pub fn columns(&self) -> usize {
        self.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0)
    }
}

#[derive(Debug, Error)]
pub enum LevelError {
    /// No map rows, or rows with no cells.
    #[error("level map is empty")]
    Empty,
    #[error("invalid tile size {0}")]
    InvalidTileSize(f32),
    #[error("cannot read level file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a level spawns, in world pixels.
#[derive(Clone, Debug, Default)]
pub struct Spawns {
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub signs: Vec<Sign>,
    pub door: Option<Door>,
    pub width: f32,
    pub height: f32,
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut rows = vec![];

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(header) = line.strip_prefix('#') {
            if name.is_empty() {
                name = header.trim().to_string();
            }
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    let def = LevelDef {
        name: if name.is_empty() { "Unnamed Level".to_string() } else { name },
        rows,
    };
    if def.columns() == 0 {
        return Err(LevelError::Empty);
    }
    Ok(pad_rows(def))
}

pub fn load_level_file(path: &Path) -> Result<LevelDef, LevelError> {
    let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&content)
}

/// Pad every row with spaces to the widest row.
fn pad_rows(mut def: LevelDef) -> LevelDef {
    let width = def.columns();
    for row in &mut def.rows {
        let len = row.chars().count();
        if len < width {
            row.extend(std::iter::repeat(' ').take(width - len));
        }
    }
    def
}

// ══════════════════════════════════════════════════════════════
// Spawn list
// ══════════════════════════════════════════════════════════════

/// Turn the grid into entities. Signs draw their message from `rng`.
pub fn build_spawns<R: Rng>(
    def: &LevelDef,
    tile_size: f32,
    rng: &mut R,
) -> Result<Spawns, LevelError> {
    if !(tile_size > 0.0) {
        return Err(LevelError::InvalidTileSize(tile_size));
    }
    let columns = def.columns();
    if columns == 0 {
        return Err(LevelError::Empty);
    }

    let mut spawns = Spawns {
        width: columns as f32 * tile_size,
        height: def.rows.len() as f32 * tile_size,
        ..Spawns::default()
    };
    let mut doors: Vec<(usize, usize)> = vec![];

    for (row, line) in def.rows.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let x = col as f32 * tile_size;
            let y = row as f32 * tile_size;
            let cx = x + tile_size / 2.0;
            let cy = y + tile_size / 2.0;

            match Tile::from_char(ch) {
                Tile::Platform => spawns.platforms.push(Platform {
                    rect: Rect::new(x, y, tile_size, tile_size),
                }),
                Tile::Coin => spawns.collectibles.push(Collectible::coin(cx, cy, SCORE_COIN)),
                Tile::Beer => spawns.collectibles.push(Collectible::beer(cx, cy, SCORE_BEER)),
                Tile::Enemy => spawns.enemies.push(Enemy::new(
                    cx, cy,
                    x - ENEMY_PATROL_RANGE,
                    x + ENEMY_PATROL_RANGE,
                )),
                Tile::Sign => {
                    let message = SIGN_MESSAGES.choose(rng).copied().unwrap_or_default();
                    spawns.signs.push(Sign::new(cx, cy, message));
                }
                Tile::Door => {
                    doors.push((col, row));
                    spawns.door = Some(Door::at_tile(x, y));
                }
                Tile::Empty => {}
            }
        }
    }

    if let [.., (col, row)] = doors[..] {
        if doors.len() > 1 {
            log::warn!(
                "level has {} door cells; using the last one (column {col}, row {row})",
                doors.len(),
            );
        }
    }

    Ok(spawns)
}

// ══════════════════════════════════════════════════════════════
// Built-in level
// ══════════════════════════════════════════════════════════════

/// The original "Valenti's Run" map. Blank rows 0 and 1 are full width
/// and set the level width, so the file keeps its trailing spaces.
const EMBEDDED_LEVEL: &str = include_str!("../../levels/valenti_run.txt");

pub fn embedded_level() -> Result<LevelDef, LevelError> {
    parse_level(EMBEDDED_LEVEL)
}
