/// Game settings from `config.toml`.
///
/// The first `config.toml` found in the candidate directories wins. Every
/// key is optional; problems are collected in `GameConfig::warnings`
/// because the logger is not up yet when this runs.
///
/// ```toml
/// [physics]
/// gravity = 1.2
/// move_speed = 8.0
/// jump_speed = 22.0
/// double_jump_speed = 18.0
///
/// [timing]
/// fps = 60
///
/// [audio]
/// music_volume = 0.5
/// sfx_volume = 1.0
///
/// [gamepad]
/// jump = ["A"]
///
/// [general]
/// level_file = "levels/custom.txt"
/// log_file = "super-valenti.log"
/// ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
    pub audio: AudioConfig,
    pub gamepad: GamepadConfig,
    /// Custom level; `None` plays the built-in one.
    pub level_file: Option<PathBuf>,
    pub log_file: PathBuf,
    /// Problems found while loading, logged once the logger is up.
    pub warnings: Vec<String>,
}

/// Velocities in px/frame; +y is down, so jumps are negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub move_speed: f32,
    pub jump_velocity: f32,
    pub double_jump_velocity: f32,
}

impl PhysicsConfig {
    /// Upward kick after stomping an enemy.
    pub fn stomp_velocity(&self) -> f32 {
        self.jump_velocity / 2.0
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            move_speed: default_move_speed(),
            jump_velocity: -default_jump_speed(),
            double_jump_velocity: -default_double_jump_speed(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TimingConfig {
    pub fps: u32,
}

impl TimingConfig {
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AudioConfig {
    pub music_volume: f32,
    pub sfx_volume: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub pause: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_jump_speed")]
    jump_speed: f32,
    #[serde(default = "default_double_jump_speed")]
    double_jump_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_fps")]
    fps: u32,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_music_volume")]
    music_volume: f32,
    #[serde(default = "default_sfx_volume")]
    sfx_volume: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    level_file: Option<String>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_gravity() -> f32 { 1.2 }
fn default_move_speed() -> f32 { 8.0 }
fn default_jump_speed() -> f32 { 22.0 }
fn default_double_jump_speed() -> f32 { 18.0 }
fn default_fps() -> u32 { 60 }
fn default_music_volume() -> f32 { 0.5 }
fn default_sfx_volume() -> f32 { 1.0 }

fn default_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into(), "X".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "super-valenti.log".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            move_speed: default_move_speed(),
            jump_speed: default_jump_speed(),
            double_jump_speed: default_double_jump_speed(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { fps: default_fps() }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            music_volume: default_music_volume(),
            sfx_volume: default_sfx_volume(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            pause: default_pause(),
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            level_file: None,
            log_file: default_log_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current working directory, data dirs.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Self::from_toml(toml_cfg, &search_dirs, warnings)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf], mut warnings: Vec<String>) -> Self {
        let level_file = toml_cfg.general.level_file
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| resolve_path(s, search_dirs));

        let mut fps = toml_cfg.timing.fps;
        if fps == 0 {
            warnings.push("timing.fps must be positive; using 60".to_string());
            fps = default_fps();
        }

        let physics = &toml_cfg.physics;
        GameConfig {
            physics: PhysicsConfig {
                gravity: physics.gravity,
                move_speed: physics.move_speed.abs(),
                jump_velocity: -physics.jump_speed.abs(),
                double_jump_velocity: -physics.double_jump_speed.abs(),
            },
            timing: TimingConfig { fps },
            audio: AudioConfig {
                music_volume: toml_cfg.audio.music_volume.clamp(0.0, 1.0),
                sfx_volume: toml_cfg.audio.sfx_volume.clamp(0.0, 1.0),
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                pause: toml_cfg.gamepad.pause,
                restart: toml_cfg.gamepad.restart,
                quit: toml_cfg.gamepad.quit,
            },
            level_file,
            log_file: PathBuf::from(toml_cfg.general.log_file),
            warnings,
        }
    }
}

/// Absolute paths are kept; relative ones are looked up in the search dirs,
/// falling back to CWD-relative.
fn resolve_path(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|p| p.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/super-valenti)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/super-valenti");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/super-valenti)
    let sys = PathBuf::from("/usr/share/super-valenti");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!(
                            "{} parse error, using default settings: {e}",
                            path.display(),
                        ));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> GameConfig {
        let cfg: TomlConfig = toml::from_str(text).unwrap();
        GameConfig::from_toml(cfg, &[], vec![])
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("");
        assert_eq!(cfg.physics, PhysicsConfig::default());
        assert_eq!(cfg.physics.jump_velocity, -22.0);
        assert_eq!(cfg.physics.stomp_velocity(), -11.0);
        assert_eq!(cfg.timing.fps, 60);
        assert!(cfg.level_file.is_none());
        assert_eq!(cfg.log_file, PathBuf::from("super-valenti.log"));
        assert_eq!(cfg.gamepad.jump, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse("[physics]\ngravity = 2.0\n\n[audio]\nmusic_volume = 3.0\n");
        assert_eq!(cfg.physics.gravity, 2.0);
        assert_eq!(cfg.physics.move_speed, 8.0);
        assert_eq!(cfg.audio.music_volume, 1.0, "volume is clamped");
        assert_eq!(cfg.audio.sfx_volume, 1.0);
    }

    #[test]
    fn zero_fps_falls_back_with_warning() {
        let cfg = parse("[timing]\nfps = 0\n");
        assert_eq!(cfg.timing.fps, 60);
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn level_file_is_kept_when_absolute() {
        let cfg = parse("[general]\nlevel_file = \"/tmp/level.txt\"\n");
        assert_eq!(cfg.level_file, Some(PathBuf::from("/tmp/level.txt")));
        let blank = parse("[general]\nlevel_file = \"\"\n");
        assert!(blank.level_file.is_none());
    }

    #[test]
    fn frame_duration_matches_fps() {
        let t = TimingConfig { fps: 50 };
        assert!((t.frame_duration().as_secs_f64() - 0.02).abs() < 1e-6);
    }
}
