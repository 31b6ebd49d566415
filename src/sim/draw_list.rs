/// Draw list: a render-agnostic snapshot of one frame.
///
/// Layer order (back to front):
///   background → river → platforms → door → signs → collectibles
///   → enemies → player
///
/// Background items are in screen space; everything else is in world
/// space and must be shifted by `camera_x`. World items entirely outside
/// the viewport are culled, except the river which always spans it.

use crate::domain::background::BgLayer;
use crate::domain::entity::{CollectibleKind, Pose};
use crate::domain::geometry::Rect;
use crate::domain::rules;
use super::world::{Phase, WorldState};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Sprite {
    Background(BgLayer),
    River { flow: f32 },
    Platform,
    Door,
    Sign,
    Coin,
    Beer,
    Enemy,
    Player(Pose),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Space {
    World,
    Screen,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DrawItem {
    pub sprite: Sprite,
    pub rect: Rect,
    pub space: Space,
    /// 0 = invisible, 1 = opaque.
    pub alpha: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    /// Never negative.
    pub lives: i32,
    pub kills: u32,
    pub elapsed: f64,
    pub best_time: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub text: String,
    pub frames_left: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    Paused { encouragement: String, music: f32, sfx: f32 },
    GameOver { final_score: u32, rank: &'static str },
    Complete { final_score: u32, rank: &'static str, time: f64 },
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub items: Vec<DrawItem>,
    pub hud: Hud,
    pub notification: Option<Notification>,
    pub overlay: Option<Overlay>,
    pub camera_x: f32,
    pub view_w: f32,
    pub view_h: f32,
}

impl Frame {
    /// Item rect in viewport pixels.
    pub fn screen_rect(&self, item: &DrawItem) -> Rect {
        match item.space {
            Space::Screen => item.rect,
            Space::World => Rect { x: item.rect.x - self.camera_x, ..item.rect },
        }
    }
}

pub fn build(world: &WorldState) -> Frame {
    let cam = &world.camera;
    let view = Rect::new(cam.offset_x, 0.0, cam.view_w, f32::MAX);
    let mut items = Vec::with_capacity(
        4 + world.platforms.len() + world.signs.len()
            + world.collectibles.len() + world.enemies.len(),
    );

    let mut push_world = |sprite: Sprite, rect: Rect, alpha: f32| {
        if rect.right() >= view.left() && rect.left() <= view.right() {
            items.push(DrawItem { sprite, rect, space: Space::World, alpha });
        }
    };

    // Background
    let mut background = vec![];
    if let Some(bg) = world.background.frame(world.player.rect.x, cam.view_w) {
        background.push(DrawItem {
            sprite: Sprite::Background(bg.current),
            rect: Rect::new(bg.x_current, 0.0, cam.view_w, cam.view_h),
            space: Space::Screen,
            alpha: 1.0,
        });
        if let Some((layer, x)) = bg.next {
            background.push(DrawItem {
                sprite: Sprite::Background(layer),
                rect: Rect::new(x, 0.0, cam.view_w, cam.view_h),
                space: Space::Screen,
                alpha: 1.0,
            });
        }
    }

    // River: the strip scrolls with the flow but always covers the viewport.
    let river = DrawItem {
        sprite: Sprite::River { flow: world.river.flow_offset },
        rect: world.river.rect,
        space: Space::World,
        alpha: 1.0,
    };

    for p in &world.platforms {
        push_world(Sprite::Platform, p.rect, 1.0);
    }
    if let Some(door) = &world.door {
        push_world(Sprite::Door, door.rect, 1.0);
    }
    for s in &world.signs {
        push_world(Sprite::Sign, s.rect, 1.0);
    }
    for c in &world.collectibles {
        let sprite = match c.kind {
            CollectibleKind::Coin => Sprite::Coin,
            CollectibleKind::Beer => Sprite::Beer,
        };
        push_world(sprite, c.rect, 1.0);
    }
    for e in &world.enemies {
        push_world(Sprite::Enemy, e.rect, e.alpha);
    }
    push_world(Sprite::Player(world.player.pose), world.player.rect, world.player.alpha);

    let mut ordered = background;
    ordered.push(river);
    ordered.extend(items);

    Frame {
        items: ordered,
        hud: Hud {
            score: world.score,
            lives: world.display_lives(),
            kills: world.kills,
            elapsed: world.elapsed,
            best_time: world.best_time,
        },
        notification: (world.message_timer > 0 && !world.message.is_empty()).then(|| {
            Notification { text: world.message.clone(), frames_left: world.message_timer }
        }),
        overlay: overlay(world),
        camera_x: cam.offset_x,
        view_w: cam.view_w,
        view_h: cam.view_h,
    }
}

fn overlay(world: &WorldState) -> Option<Overlay> {
    match world.phase {
        Phase::Playing if world.paused => Some(Overlay::Paused {
            encouragement: world.encouragement.clone(),
            music: world.audio.music,
            sfx: world.audio.sfx,
        }),
        Phase::Playing => None,
        Phase::GameOver => {
            let final_score = world.final_score();
            Some(Overlay::GameOver { final_score, rank: rules::score_rank(final_score) })
        }
        Phase::Complete => {
            let final_score = world.final_score();
            Some(Overlay::Complete {
                final_score,
                rank: rules::score_rank(final_score),
                time: world.elapsed,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Collectible, Enemy};
    use crate::sim::world::tests::world_from;

    fn layer(sprite: &Sprite) -> u8 {
        match sprite {
            Sprite::Background(_) => 0,
            Sprite::River { .. } => 1,
            Sprite::Platform => 2,
            Sprite::Door => 3,
            Sprite::Sign => 4,
            Sprite::Coin | Sprite::Beer => 5,
            Sprite::Enemy => 6,
            Sprite::Player(_) => 7,
        }
    }

    #[test]
    fn items_are_in_layer_order() {
        let mut w = world_from(&[
            "  S  C B   D  ",
            "E   E         ",
            "PPPPPPPPPPPPPP",
        ]);
        w.collectibles.push(Collectible::coin(10.0, 10.0, 5));
        let frame = build(&w);
        let layers: Vec<u8> = frame.items.iter().map(|i| layer(&i.sprite)).collect();
        assert!(layers.windows(2).all(|p| p[0] <= p[1]), "{layers:?}");
        assert_eq!(layers.first(), Some(&0));
        assert_eq!(layers.last(), Some(&7));
    }

    #[test]
    fn offscreen_world_items_are_culled() {
        let row = format!("{}P", " ".repeat(100));
        let ground = "P".repeat(101);
        let w = world_from(&[row.as_str(), ground.as_str()]);
        let frame = build(&w);
        let platforms = frame.items.iter().filter(|i| i.sprite == Sprite::Platform).count();
        // 1280 px viewport covers columns 0..=20 of the ground row.
        assert_eq!(platforms, 21);
        assert!(frame.items.iter().any(|i| matches!(i.sprite, Sprite::River { .. })));
    }

    #[test]
    fn world_items_shift_by_camera() {
        let mut w = world_from(&["PPPP"]);
        w.camera.offset_x = 100.0;
        let frame = build(&w);
        let platform = frame.items.iter().find(|i| i.sprite == Sprite::Platform).unwrap();
        assert_eq!(platform.rect.x, 64.0, "first column is culled");
        assert_eq!(frame.screen_rect(platform).x, -36.0);
        let bg = frame.items.iter().find(|i| i.space == Space::Screen).unwrap();
        assert_eq!(frame.screen_rect(bg), bg.rect);
    }

    #[test]
    fn hud_clamps_lives() {
        let mut w = world_from(&["PPPP"]);
        w.lives = -1;
        w.score = 42;
        let frame = build(&w);
        assert_eq!(frame.hud.lives, 0);
        assert_eq!(frame.hud.score, 42);
    }

    #[test]
    fn dying_enemy_carries_its_fade() {
        let mut w = world_from(&["PPPP"]);
        let mut e = Enemy::new(100.0, 100.0, 0.0, 400.0);
        e.die();
        e.tick();
        w.enemies = vec![e];
        let frame = build(&w);
        let drawn = frame.items.iter().find(|i| i.sprite == Sprite::Enemy).unwrap();
        assert!(drawn.alpha < 1.0);
    }

    #[test]
    fn overlay_follows_phase() {
        let mut w = world_from(&["PPPP"]);
        assert!(build(&w).overlay.is_none());

        w.toggle_pause();
        assert!(matches!(build(&w).overlay, Some(Overlay::Paused { .. })));
        w.toggle_pause();

        w.score = 500;
        w.elapsed = 12.34;
        w.phase = Phase::GameOver;
        assert_eq!(
            build(&w).overlay,
            Some(Overlay::GameOver { final_score: 0, rank: "Try again!" }),
        );

        w.score = 1200;
        w.elapsed = 1.0;
        w.phase = Phase::Complete;
        assert_eq!(
            build(&w).overlay,
            Some(Overlay::Complete { final_score: 1100, rank: "Rising Talent", time: 1.0 }),
        );
    }

    #[test]
    fn notification_only_while_timer_runs() {
        let mut w = world_from(&["PPPP"]);
        assert!(build(&w).notification.is_none());
        w.set_message("hi", 3);
        let n = build(&w).notification.unwrap();
        assert_eq!(n.text, "hi");
        assert_eq!(n.frames_left, 3);
    }
}
