/// WorldState: the complete snapshot of a running game.
///
/// ## Entities
///
/// Rebuilt from the level's `LevelDef` on every `setup()`:
///   - `platforms` are static and never mutated after setup
///   - `enemies`, `collectibles`, `signs` shrink as the player interacts
///   - `door` and `river` are singletons
///
/// ## Session
///
/// `score`, `lives`, `kills` and `elapsed` survive `setup()` and are only
/// reset by a restart. `best_time` survives restarts for the whole process.
///
/// ## Camera / Viewport
///
/// World coordinates are pixels. The viewport is a fixed logical size;
/// the renderer scales it to the terminal.
///   - `camera.offset_x` is the world x of the viewport's left edge
///   - `screen_x = world_x - camera.offset_x`

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::{AudioConfig, PhysicsConfig};
use crate::domain::background::BackgroundSequencer;
use crate::domain::entity::{
    Collectible, Door, Enemy, Platform, Player, River, Sign, PLAYER_SPAWN,
};
use crate::domain::rules::{self, STARTING_LIVES};
use super::level::{build_spawns, LevelDef, LevelError, TILE_SIZE};

pub const VIEW_W: f32 = 1280.0;
pub const VIEW_H: f32 = 720.0;

/// Notification lifetime (3 s at 60 fps).
pub const MESSAGE_FRAMES: u32 = 180;

/// Fraction of the remaining distance the camera closes each frame.
const CAMERA_LERP: f32 = 0.1;

/// Volume change per key press.
pub const VOLUME_STEP: f32 = 0.1;

const ENCOURAGEMENTS: &[&str] = &[
    "Super Valenti, grab a cold one to get your strength back!",
    "Don't give up! Victory is close!",
    "Take a break, the world can wait for its hero!",
    "Breathe, think, and come back stronger than before!",
    "Even heroes need a rest.",
    "A cold beer is the secret to success. You're the proof!",
    "A pause... but not from glory!",
    "The world is counting on you, Valenti!",
    "You were born for greatness. Remember that!",
    "It's not over until you've won!",
    "Rest is part of victory. Enjoy it!",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
    Complete,
}

/// Horizontal-only camera: eases toward the player, clamped to the level.
#[derive(Clone, Debug)]
pub struct Camera {
    pub offset_x: f32,
    pub view_w: f32,
    pub view_h: f32,
}

impl Camera {
    pub fn new(view_w: f32, view_h: f32) -> Self {
        Camera { offset_x: 0.0, view_w, view_h }
    }

    /// Largest offset that keeps the viewport inside the level.
    pub fn max_offset(&self, level_w: f32) -> f32 {
        (level_w - self.view_w).max(0.0)
    }

    /// Ease toward centering `target_x`, then clamp.
    pub fn follow(&mut self, target_x: f32, level_w: f32) {
        let desired = target_x - self.view_w / 2.0;
        self.offset_x += (desired - self.offset_x) * CAMERA_LERP;
        self.offset_x = self.offset_x.clamp(0.0, self.max_offset(level_w));
    }

    pub fn reset(&mut self) {
        self.offset_x = 0.0;
    }
}

/// Music and effect volumes in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioLevels {
    pub music: f32,
    pub sfx: f32,
}

impl AudioLevels {
    pub fn new(music: f32, sfx: f32) -> Self {
        AudioLevels { music: music.clamp(0.0, 1.0), sfx: sfx.clamp(0.0, 1.0) }
    }

    pub fn adjust_music(&mut self, delta: f32) {
        self.music = (self.music + delta).clamp(0.0, 1.0);
    }

    pub fn adjust_sfx(&mut self, delta: f32) {
        self.sfx = (self.sfx + delta).clamp(0.0, 1.0);
    }
}

impl From<AudioConfig> for AudioLevels {
    fn from(cfg: AudioConfig) -> Self {
        AudioLevels::new(cfg.music_volume, cfg.sfx_volume)
    }
}

pub struct WorldState {
    // ── Level ──
    pub level: LevelDef,
    pub width: f32,
    pub height: f32,

    // ── Entities ──
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub signs: Vec<Sign>,
    pub door: Option<Door>,
    pub river: River,
    pub background: BackgroundSequencer,

    // ── Tuning ──
    pub physics: PhysicsConfig,

    // ── Session ──
    pub phase: Phase,
    pub score: u32,
    pub lives: i32,
    pub kills: u32,
    /// Seconds of unpaused play since the last restart.
    pub elapsed: f64,
    /// Fastest completion this process has seen.
    pub best_time: Option<f64>,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub paused: bool,
    pub encouragement: String,
    pub audio: AudioLevels,

    // ── Camera / Viewport ──
    pub camera: Camera,

    rng: StdRng,
}

// ── Construction ──

impl WorldState {
    pub fn new(
        level: LevelDef,
        physics: PhysicsConfig,
        audio: AudioLevels,
        rng: StdRng,
    ) -> Result<Self, LevelError> {
        let mut world = WorldState {
            level,
            width: 0.0,
            height: 0.0,
            player: Player::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            platforms: vec![],
            enemies: vec![],
            collectibles: vec![],
            signs: vec![],
            door: None,
            river: River::new(0.0, 0.0, VIEW_W),
            background: BackgroundSequencer::with_defaults(0.0),
            physics,
            phase: Phase::Playing,
            score: 0,
            lives: STARTING_LIVES,
            kills: 0,
            elapsed: 0.0,
            best_time: None,
            message: String::new(),
            message_timer: 0,
            paused: false,
            encouragement: String::new(),
            audio,
            camera: Camera::new(VIEW_W, VIEW_H),
            rng,
        };
        world.setup()?;
        Ok(world)
    }

    /// (Re)spawn every entity from the level and reset the camera.
    /// Session counters are left alone.
    pub fn setup(&mut self) -> Result<(), LevelError> {
        let spawns = build_spawns(&self.level, TILE_SIZE, &mut self.rng)?;

        self.width = spawns.width;
        self.height = spawns.height;
        self.platforms = spawns.platforms;
        self.enemies = spawns.enemies;
        self.collectibles = spawns.collectibles;
        self.signs = spawns.signs;
        self.door = spawns.door;
        self.river = River::new(self.width, self.height, self.camera.view_w);
        self.background = BackgroundSequencer::with_defaults(self.width);
        self.player = Player::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1);
        self.camera.reset();
        self.message.clear();
        self.message_timer = 0;

        log::info!(
            "level '{}' ready: {}x{} px, {} enemies, {} pickups, {} signs",
            self.level.name, self.width, self.height,
            self.enemies.len(), self.collectibles.len(), self.signs.len(),
        );
        Ok(())
    }
}

// ── Session helpers ──

impl WorldState {
    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count the notification down; clears it on expiry.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }

    /// Pause only applies while playing. Entering pause picks a new
    /// encouragement line. Returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        if self.phase != Phase::Playing {
            return self.paused;
        }
        self.paused = !self.paused;
        if self.paused {
            self.encouragement = ENCOURAGEMENTS.choose(&mut self.rng)
                .map(|s| s.to_string())
                .unwrap_or_default();
        }
        self.paused
    }

    /// Lives as shown on the HUD (never negative).
    pub fn display_lives(&self) -> i32 {
        self.lives.max(0)
    }

    pub fn final_score(&self) -> u32 {
        rules::final_score(self.score, self.elapsed)
    }

    pub fn is_over(&self) -> bool {
        self.phase != Phase::Playing
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::level::parse_level;
    use rand::SeedableRng;

    /// World over a small map with default physics and a fixed seed.
    pub(crate) fn world_from(rows: &[&str]) -> WorldState {
        let level = parse_level(&rows.join("\n")).unwrap();
        WorldState::new(
            level,
            PhysicsConfig::default(),
            AudioLevels::new(0.5, 1.0),
            StdRng::seed_from_u64(42),
        ).unwrap()
    }

    #[test]
    fn camera_clamps_to_level() {
        let mut cam = Camera::new(VIEW_W, VIEW_H);
        for _ in 0..500 { cam.follow(100_000.0, 5000.0); }
        assert!((cam.offset_x - (5000.0 - VIEW_W)).abs() < 0.001);
        for _ in 0..500 { cam.follow(-100_000.0, 5000.0); }
        assert_eq!(cam.offset_x, 0.0);
    }

    #[test]
    fn camera_eases_toward_target() {
        let mut cam = Camera::new(VIEW_W, VIEW_H);
        cam.follow(VIEW_W / 2.0 + 100.0, 10_000.0);
        assert!((cam.offset_x - 10.0).abs() < 0.001);
    }

    #[test]
    fn camera_stays_at_zero_on_narrow_level() {
        let mut cam = Camera::new(VIEW_W, VIEW_H);
        for _ in 0..100 { cam.follow(600.0, 640.0); }
        assert_eq!(cam.offset_x, 0.0);
    }

    #[test]
    fn audio_levels_clamp() {
        let mut a = AudioLevels::new(0.95, 0.05);
        a.adjust_music(VOLUME_STEP);
        a.adjust_sfx(-VOLUME_STEP);
        assert_eq!(a.music, 1.0);
        assert_eq!(a.sfx, 0.0);
    }

    #[test]
    fn setup_spawns_player_and_river() {
        let w = world_from(&["    ", "    ", "PPPP"]);
        assert_eq!(w.player.rect.x, PLAYER_SPAWN.0);
        assert_eq!(w.width, 256.0);
        assert_eq!(w.river.rect.top(), 192.0 + 40.0);
        assert_eq!(w.lives, STARTING_LIVES);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn pause_picks_encouragement_and_only_while_playing() {
        let mut w = world_from(&["PPPP"]);
        assert!(w.toggle_pause());
        assert!(ENCOURAGEMENTS.contains(&w.encouragement.as_str()));
        assert!(!w.toggle_pause());

        w.phase = Phase::GameOver;
        assert!(!w.toggle_pause());
        assert!(!w.paused);
    }

    #[test]
    fn message_expires() {
        let mut w = world_from(&["PPPP"]);
        w.set_message("hello", 2);
        w.tick_message();
        assert_eq!(w.message, "hello");
        w.tick_message();
        assert!(w.message.is_empty());
    }

    #[test]
    fn display_lives_never_negative() {
        let mut w = world_from(&["PPPP"]);
        w.lives = -2;
        assert_eq!(w.display_lives(), 0);
    }
}
