/// Player integration and collision against static platforms.
///
/// ## Axis separation
///
/// Each frame resolves X fully before Y:
///   1. Horizontal: apply `vx`, then push the leading edge out of every
///      overlapping platform (moving right → right edge to platform left,
///      moving left → left edge to platform right).
///   2. Vertical: add gravity to `vy` (no terminal velocity), apply `vy`,
///      then for each overlapping platform:
///        - falling → bottom edge to platform top, `vy = 0`, grounded
///        - rising  → top edge to platform bottom, `vy = 0`
///
/// Resolving one axis at a time means a corner hit never pushes the
/// player diagonally, and the grounded flag is exactly "a downward
/// collision was resolved this frame".

use super::entity::{Platform, Player};
use super::geometry::Rect;

/// Indices of platforms overlapping `rect`, in level order.
fn overlapping(rect: &Rect, platforms: &[Platform]) -> Vec<usize> {
    platforms.iter()
        .enumerate()
        .filter(|(_, p)| rect.overlaps(&p.rect))
        .map(|(i, _)| i)
        .collect()
}

/// Apply horizontal velocity and clamp against platforms.
pub fn move_horizontal(player: &mut Player, platforms: &[Platform]) {
    player.rect.x += player.vx;

    for i in overlapping(&player.rect, platforms) {
        let hit = platforms[i].rect;
        if player.vx > 0.0 {
            player.rect.set_right(hit.left());
        }
        if player.vx < 0.0 {
            player.rect.set_left(hit.right());
        }
    }
}

/// Apply gravity + vertical velocity and resolve landings / head bumps.
pub fn move_vertical(player: &mut Player, platforms: &[Platform], gravity: f32) {
    player.vy += gravity;
    player.rect.y += player.vy;

    player.on_ground = false;
    for i in overlapping(&player.rect, platforms) {
        let hit = platforms[i].rect;
        if player.vy > 0.0 {
            player.rect.set_bottom(hit.top());
            player.vy = 0.0;
            player.on_ground = true;
        } else if player.vy < 0.0 {
            player.rect.set_top(hit.bottom());
            player.vy = 0.0;
        }
    }

    if player.on_ground {
        player.has_double_jumped = false;
    }
}

/// Full per-frame move: X then Y.
pub fn integrate_player(player: &mut Player, platforms: &[Platform], gravity: f32) {
    move_horizontal(player, platforms);
    move_vertical(player, platforms, gravity);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const G: f32 = 1.2;
    const TILE: f32 = 64.0;

    /// Build platforms from rows: '#' is a 64 px block.
    fn platforms_from(rows: &[&str]) -> Vec<Platform> {
        let mut out = vec![];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    out.push(Platform {
                        rect: Rect::new(x as f32 * TILE, y as f32 * TILE, TILE, TILE),
                    });
                }
            }
        }
        out
    }

    fn overlaps_any(rect: &Rect, platforms: &[Platform]) -> bool {
        platforms.iter().any(|p| rect.overlaps(&p.rect))
    }

    // ── Horizontal ──

    #[test]
    fn walking_right_into_wall_stops_at_its_left_edge() {
        let plats = platforms_from(&[
            "   #",
        ]);
        let mut p = Player::new(150.0, 0.0);
        p.rect.h = 40.0;
        p.vx = 8.0;
        move_horizontal(&mut p, &plats);
        assert_eq!(p.rect.right(), 3.0 * TILE);
    }

    #[test]
    fn walking_left_into_wall_stops_at_its_right_edge() {
        let plats = platforms_from(&[
            "#   ",
        ]);
        let mut p = Player::new(68.0, 0.0);
        p.rect.h = 40.0;
        p.vx = -8.0;
        move_horizontal(&mut p, &plats);
        assert_eq!(p.rect.left(), TILE);
    }

    #[test]
    fn free_horizontal_move() {
        let plats = platforms_from(&["    "]);
        let mut p = Player::new(10.0, 0.0);
        p.vx = 8.0;
        move_horizontal(&mut p, &plats);
        assert_eq!(p.rect.x, 18.0);
    }

    // ── Vertical ──

    #[test]
    fn falling_player_lands_on_platform() {
        let plats = platforms_from(&[
            "    ",
            "    ",
            "####",
        ]);
        let mut p = Player::new(64.0, 0.0);
        for _ in 0..60 {
            move_vertical(&mut p, &plats, G);
            if p.on_ground { break; }
        }
        assert!(p.on_ground);
        assert_eq!(p.rect.bottom(), 2.0 * TILE);
        assert_eq!(p.vy, 0.0);
        assert!(!overlaps_any(&p.rect, &plats));
    }

    #[test]
    fn standing_player_stays_grounded() {
        let plats = platforms_from(&[
            "    ",
            "    ",
            "####",
        ]);
        let mut p = Player::new(64.0, 2.0 * TILE - 80.0);
        for _ in 0..10 {
            integrate_player(&mut p, &plats, G);
            assert!(p.on_ground);
            assert_eq!(p.rect.bottom(), 2.0 * TILE);
        }
    }

    #[test]
    fn rising_player_bumps_head() {
        let plats = platforms_from(&[
            "####",
            "    ",
            "    ",
        ]);
        let mut p = Player::new(64.0, 80.0);
        p.vy = -22.0;
        move_vertical(&mut p, &plats, G);
        assert_eq!(p.rect.top(), TILE);
        assert_eq!(p.vy, 0.0);
        assert!(!p.on_ground);
    }

    #[test]
    fn gravity_has_no_terminal_velocity() {
        let plats: Vec<Platform> = vec![];
        let mut p = Player::new(0.0, 0.0);
        for _ in 0..500 {
            move_vertical(&mut p, &plats, G);
        }
        assert!((p.vy - 500.0 * G).abs() < 0.1);
    }

    #[test]
    fn landing_resets_double_jump() {
        let plats = platforms_from(&[
            "    ",
            "    ",
            "####",
        ]);
        let mut p = Player::new(64.0, 0.0);
        p.double_jump_enabled = true;
        assert!(p.double_jump(-18.0));
        for _ in 0..120 {
            move_vertical(&mut p, &plats, G);
            if p.on_ground {
                assert!(!p.has_double_jumped);
                return;
            }
        }
        panic!("player never landed");
    }

    #[test]
    fn never_overlaps_after_vertical_resolution() {
        let plats = platforms_from(&[
            "        ",
            "  ##    ",
            "        ",
            "     #  ",
            "########",
        ]);
        for start_x in [0.0_f32, 30.0, 300.0, 330.0, 420.0] {
            let mut p = Player::new(start_x, 0.0);
            p.vx = 3.0;
            for frame in 0..200 {
                if frame % 40 == 0 { p.on_ground = true; p.jump(-22.0); }
                integrate_player(&mut p, &plats, G);
                assert!(!overlaps_any(&p.rect, &plats),
                    "overlap at x={start_x} frame={frame}: {:?}", p.rect);
            }
        }
    }
}
