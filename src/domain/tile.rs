/// Level map tile codes.
/// Each map character names the entity spawned in that cell;
/// semantics are centralized here so the level parser stays a plain loop.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Platform, // Solid ground block
    Coin,     // Score pickup
    Enemy,    // Patrolling enemy spawn
    Beer,     // Extra life + double jump
    Sign,     // One-shot message + score
    Door,     // Level exit
}

impl Tile {
    /// Map character → tile. Unknown characters are empty space.
    pub fn from_char(ch: char) -> Tile {
        match ch {
            'P' => Tile::Platform,
            'C' => Tile::Coin,
            'E' => Tile::Enemy,
            'B' => Tile::Beer,
            'S' => Tile::Sign,
            'D' => Tile::Door,
            _ => Tile::Empty,
        }
    }
}
