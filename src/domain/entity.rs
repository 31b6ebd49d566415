/// Entities: Player, Enemy, Collectible, Sign, Platform, Door, River.
/// Timers are frame counters; nothing here reads a clock.

use super::geometry::Rect;

pub const PLAYER_W: f32 = 40.0;
pub const PLAYER_H: f32 = 80.0;
pub const PLAYER_SPAWN: (f32, f32) = (128.0, 128.0);

/// Frames of invincibility after taking a hit (2 s at 60 fps).
pub const INVINCIBILITY_FRAMES: i32 = 120;
/// Flicker period while invincible; the first half of each period is dimmed.
const FLICKER_PERIOD: i32 = 10;
/// Seconds between run-cycle frames.
pub const ANIMATION_INTERVAL: f32 = 0.1;
/// Idle frame + three stride frames.
pub const RUN_FRAMES: u8 = 4;

pub const ENEMY_SIZE: f32 = 64.0;
pub const ENEMY_SPEED: f32 = 2.0;
pub const ENEMY_PATROL_RANGE: f32 = 200.0;
pub const ENEMY_DEATH_FRAMES: u32 = 30;
const ENEMY_DEATH_DRIFT: f32 = 2.0;
/// Transparent margin of the enemy sprite; contact uses the inset box.
pub const ENEMY_MASK_INSET: f32 = 6.0;

pub const COIN_SIZE: f32 = 24.0;
pub const BEER_SIZE: (f32, f32) = (20.0, 40.0);
pub const SIGN_SIZE: (f32, f32) = (100.0, 50.0);
pub const DOOR_SIZE: (f32, f32) = (200.0, 250.0);
/// The door sprite is anchored this far above its tile.
pub const DOOR_RISE: f32 = 190.0;

pub const RIVER_GAP: f32 = 40.0;
pub const RIVER_HEIGHT: f32 = 100.0;
const RIVER_FLOW_SPEED: f32 = 0.5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Frame input: movement is continuous (held key), jump is edge-triggered.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<Facing>,
    pub jump: bool,
}

/// Which sprite the player shows this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pose {
    Idle(Facing),
    Run(Facing, u8),
}

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
    pub invincible: bool,
    pub invincibility_timer: i32,
    pub facing: Facing,
    pub anim_frame: u8,
    anim_elapsed: f32,
    pub pose: Pose,
    /// Render opacity, toggled while invincible.
    pub alpha: f32,
    pub double_jump_enabled: bool,
    pub has_double_jumped: bool,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            rect: Rect::new(x, y, PLAYER_W, PLAYER_H),
            vx: 0.0,
            vy: 0.0,
            on_ground: false,
            invincible: false,
            invincibility_timer: 0,
            facing: Facing::Right,
            anim_frame: 0,
            anim_elapsed: 0.0,
            pose: Pose::Idle(Facing::Right),
            alpha: 1.0,
            double_jump_enabled: false,
            has_double_jumped: false,
        }
    }

    /// Count down the invincibility window and drive the flicker cue.
    pub fn tick_invincibility(&mut self) {
        if !self.invincible { return; }
        self.invincibility_timer -= 1;
        if self.invincibility_timer <= 0 {
            self.invincible = false;
            self.alpha = 1.0;
        } else if self.invincibility_timer % FLICKER_PERIOD < FLICKER_PERIOD / 2 {
            self.alpha = 0.5;
        } else {
            self.alpha = 1.0;
        }
    }

    /// Advance the run cycle by `dt` seconds.
    /// Frames only advance while moving; standing still holds the idle pose.
    pub fn animate(&mut self, dt: f32) {
        self.anim_elapsed += dt;
        if self.anim_elapsed <= ANIMATION_INTERVAL { return; }
        self.anim_elapsed = 0.0;
        if self.vx != 0.0 {
            self.anim_frame = (self.anim_frame + 1) % RUN_FRAMES;
            self.pose = Pose::Run(self.facing, self.anim_frame);
        } else {
            self.pose = Pose::Idle(self.facing);
        }
    }

    /// Ground jump. Fails (and changes nothing) unless grounded.
    pub fn jump(&mut self, speed: f32) -> bool {
        if !self.on_ground { return false; }
        self.vy = speed;
        self.on_ground = false;
        true
    }

    /// Air jump. Fails unless unlocked and unused since the last landing.
    pub fn double_jump(&mut self, speed: f32) -> bool {
        if !self.double_jump_enabled || self.has_double_jumped { return false; }
        self.vy = speed;
        self.has_double_jumped = true;
        true
    }

    pub fn start_invincibility(&mut self) {
        self.invincible = true;
        self.invincibility_timer = INVINCIBILITY_FRAMES;
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub rect: Rect,
    pub boundary_left: f32,
    pub boundary_right: f32,
    pub vx: f32,
    pub dying: bool,
    pub death_timer: u32,
    pub alpha: f32,
}

impl Enemy {
    pub fn new(cx: f32, cy: f32, boundary_left: f32, boundary_right: f32) -> Self {
        Enemy {
            rect: Rect::centered(cx, cy, ENEMY_SIZE, ENEMY_SIZE),
            boundary_left,
            boundary_right,
            vx: ENEMY_SPEED,
            dying: false,
            death_timer: 0,
            alpha: 1.0,
        }
    }

    /// Advance one frame. Returns true once the death fade has finished
    /// and the enemy should be removed.
    pub fn tick(&mut self) -> bool {
        if self.dying {
            self.death_timer = self.death_timer.saturating_sub(1);
            if self.death_timer == 0 { return true; }
            self.alpha = self.death_timer as f32 / ENEMY_DEATH_FRAMES as f32;
            self.rect.y -= ENEMY_DEATH_DRIFT;
            return false;
        }

        self.rect.x += self.vx;
        if self.rect.right() > self.boundary_right || self.rect.left() < self.boundary_left {
            self.vx = -self.vx;
        }
        false
    }

    pub fn die(&mut self) {
        self.dying = true;
        self.death_timer = ENEMY_DEATH_FRAMES;
    }

    /// Contact box: the sprite rect minus its transparent margin.
    pub fn hitbox(&self) -> Rect {
        self.rect.inset(ENEMY_MASK_INSET)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollectibleKind {
    Coin,
    Beer,
}

#[derive(Clone, Debug)]
pub struct Collectible {
    pub rect: Rect,
    pub value: u32,
    pub kind: CollectibleKind,
}

impl Collectible {
    pub fn coin(cx: f32, cy: f32, value: u32) -> Self {
        Collectible {
            rect: Rect::centered(cx, cy, COIN_SIZE, COIN_SIZE),
            value,
            kind: CollectibleKind::Coin,
        }
    }

    pub fn beer(cx: f32, cy: f32, value: u32) -> Self {
        Collectible {
            rect: Rect::centered(cx, cy, BEER_SIZE.0, BEER_SIZE.1),
            value,
            kind: CollectibleKind::Beer,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Sign {
    pub rect: Rect,
    pub message: String,
}

impl Sign {
    pub fn new(cx: f32, cy: f32, message: &str) -> Self {
        Sign {
            rect: Rect::centered(cx, cy, SIGN_SIZE.0, SIGN_SIZE.1),
            message: message.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Platform {
    pub rect: Rect,
}

/// Level exit. Not solid; overlapping it completes the level.
#[derive(Clone, Copy, Debug)]
pub struct Door {
    pub rect: Rect,
}

impl Door {
    /// Door for the tile whose top-left corner is (x, y).
    pub fn at_tile(x: f32, y: f32) -> Self {
        Door { rect: Rect::new(x, y - DOOR_RISE, DOOR_SIZE.0, DOOR_SIZE.1) }
    }
}

/// Hazard strip below the level. `flow_offset` scrolls for the water effect.
#[derive(Clone, Debug)]
pub struct River {
    pub rect: Rect,
    pub flow_offset: f32,
}

impl River {
    pub fn new(level_width: f32, level_height: f32, view_w: f32) -> Self {
        River {
            rect: Rect::new(0.0, level_height + RIVER_GAP, level_width + view_w, RIVER_HEIGHT),
            flow_offset: 0.0,
        }
    }

    pub fn tick(&mut self, view_w: f32) {
        self.flow_offset -= RIVER_FLOW_SPEED;
        if self.flow_offset < view_w - self.rect.w {
            self.flow_offset = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_requires_ground() {
        let mut p = Player::new(0.0, 0.0);
        assert!(!p.jump(-22.0));
        assert_eq!(p.vy, 0.0);

        p.on_ground = true;
        assert!(p.jump(-22.0));
        assert_eq!(p.vy, -22.0);
        assert!(!p.on_ground, "jump leaves the ground immediately");
        assert!(!p.jump(-22.0));
    }

    #[test]
    fn double_jump_requires_unlock_and_is_single_use() {
        let mut p = Player::new(0.0, 0.0);
        p.vy = 3.0;
        assert!(!p.double_jump(-18.0));
        assert_eq!(p.vy, 3.0);

        p.double_jump_enabled = true;
        assert!(p.double_jump(-18.0));
        assert_eq!(p.vy, -18.0);
        assert!(p.has_double_jumped);

        p.vy = 5.0;
        assert!(!p.double_jump(-18.0));
        assert_eq!(p.vy, 5.0);
    }

    #[test]
    fn invincibility_flickers_then_expires() {
        let mut p = Player::new(0.0, 0.0);
        p.start_invincibility();
        let mut dimmed = 0;
        for _ in 0..INVINCIBILITY_FRAMES - 1 {
            p.tick_invincibility();
            assert!(p.invincible);
            if p.alpha < 1.0 { dimmed += 1; }
        }
        assert!(dimmed > 0);
        p.tick_invincibility();
        assert!(!p.invincible);
        assert_eq!(p.alpha, 1.0);
    }

    #[test]
    fn animation_runs_only_while_moving() {
        let mut p = Player::new(0.0, 0.0);
        p.animate(0.2);
        assert_eq!(p.pose, Pose::Idle(Facing::Right));

        p.vx = -8.0;
        p.facing = Facing::Left;
        p.animate(0.2);
        assert_eq!(p.pose, Pose::Run(Facing::Left, 1));
        p.animate(0.05);
        assert_eq!(p.pose, Pose::Run(Facing::Left, 1), "interval not elapsed");
        for _ in 0..3 { p.animate(0.2); }
        assert_eq!(p.anim_frame, 0, "run cycle wraps");
    }

    #[test]
    fn enemy_turns_at_patrol_bounds() {
        let mut e = Enemy::new(100.0, 32.0, 60.0, 140.0);
        assert_eq!(e.rect.left(), 68.0);
        let mut flips = 0;
        let mut last = e.vx;
        for _ in 0..200 {
            e.tick();
            if e.vx != last { flips += 1; last = e.vx; }
            assert!(e.rect.left() >= 60.0 - ENEMY_SPEED);
            assert!(e.rect.right() <= 140.0 + ENEMY_SPEED);
        }
        assert!(flips >= 2);
    }

    #[test]
    fn dying_enemy_fades_and_expires() {
        let mut e = Enemy::new(100.0, 100.0, 0.0, 400.0);
        e.die();
        let y0 = e.rect.y;
        for i in 1..ENEMY_DEATH_FRAMES {
            assert!(!e.tick(), "still fading at frame {i}");
        }
        assert!(e.alpha < 0.1);
        assert!(e.rect.y < y0);
        assert!(e.tick());
    }

    #[test]
    fn door_rises_above_its_tile() {
        let d = Door::at_tile(640.0, 448.0);
        assert_eq!(d.rect.top(), 448.0 - DOOR_RISE);
        assert_eq!(d.rect.w, DOOR_SIZE.0);
    }

    #[test]
    fn river_flow_wraps() {
        let mut r = River::new(200.0, 576.0, 100.0);
        for _ in 0..1000 {
            r.tick(100.0);
            assert!(r.flow_offset <= 0.0);
            assert!(r.flow_offset >= 100.0 - r.rect.w);
        }
    }
}
