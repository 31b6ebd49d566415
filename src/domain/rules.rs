/// Scoring rules: point values, the time penalty and end-screen ranks.
///
/// Pure functions, no world state.
///
/// ## Points
/// ┌──────────────┬────────┐
/// │ Event         │ Points │
/// ├──────────────┼────────┤
/// │ Coin          │ +5     │
/// │ Sign          │ +7     │
/// │ Enemy stomped │ +10    │
/// │ Beer          │ +2     │
/// └──────────────┴────────┘
///
/// ## Final score
/// `max(0, score − floor(elapsed_seconds × 100))`
///
/// ## Rank
/// ┌─────────────┬──────────────────────────┐
/// │ Final score  │ Rank                     │
/// ├─────────────┼──────────────────────────┤
/// │ ≥ 10000      │ Legend of the Clock      │
/// │ ≥ 9000       │ Absolute Champion        │
/// │ ≥ 8000       │ Hero of the Realm        │
/// │ ≥ 7000       │ Master Valenti           │
/// │ ≥ 6000       │ Valiant Warrior          │
/// │ ≥ 5000       │ Seasoned Adventurer      │
/// │ ≥ 4000       │ Brave Explorer           │
/// │ ≥ 3000       │ Apprentice Valenti       │
/// │ ≥ 2000       │ Casual Adventurer        │
/// │ ≥ 1000       │ Rising Talent            │
/// │ ≥ 500        │ Plucky Novice            │
/// │ otherwise    │ Try again!               │
/// └─────────────┴──────────────────────────┘

pub const SCORE_COIN: u32 = 5;
pub const SCORE_SIGN: u32 = 7;
pub const SCORE_ENEMY: u32 = 10;
pub const SCORE_BEER: u32 = 2;

pub const STARTING_LIVES: i32 = 3;

/// Points lost per second of play.
const TIME_PENALTY_PER_SECOND: f64 = 100.0;

const RANKS: &[(u32, &str)] = &[
    (10000, "Legend of the Clock"),
    (9000, "Absolute Champion"),
    (8000, "Hero of the Realm"),
    (7000, "Master Valenti"),
    (6000, "Valiant Warrior"),
    (5000, "Seasoned Adventurer"),
    (4000, "Brave Explorer"),
    (3000, "Apprentice Valenti"),
    (2000, "Casual Adventurer"),
    (1000, "Rising Talent"),
    (500, "Plucky Novice"),
];

/// Score after the elapsed-time penalty, clamped at zero.
pub fn final_score(score: u32, elapsed_secs: f64) -> u32 {
    let penalty = (elapsed_secs.max(0.0) * TIME_PENALTY_PER_SECOND).floor() as i64;
    (score as i64 - penalty).max(0) as u32
}

pub fn score_rank(final_score: u32) -> &'static str {
    RANKS.iter()
        .find(|(threshold, _)| final_score >= *threshold)
        .map(|(_, name)| *name)
        .unwrap_or("Try again!")
}

/// `mm:ss` for the HUD.
pub fn format_time(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_clamps_at_zero() {
        assert_eq!(final_score(500, 12.34), 0);
    }

    #[test]
    fn penalty_floors_fractional_points() {
        assert_eq!(final_score(500, 1.239), 500 - 123);
        assert_eq!(final_score(500, 0.0), 500);
        assert_eq!(final_score(1000, 5.0), 500);
    }

    #[test]
    fn rank_thresholds() {
        assert_eq!(score_rank(10000), "Legend of the Clock");
        assert_eq!(score_rank(9999), "Absolute Champion");
        assert_eq!(score_rank(500), "Plucky Novice");
        assert_eq!(score_rank(499), "Try again!");
        assert_eq!(score_rank(0), "Try again!");
    }

    #[test]
    fn time_format() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.9), "00:59");
        assert_eq!(format_time(125.0), "02:05");
    }
}
