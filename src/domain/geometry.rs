/// Axis-aligned rectangles in world pixels.
///
/// Origin is top-left, +y points down (screen convention).
/// Overlap is strict: rectangles that only share an edge do not collide,
/// so an entity resting exactly on a platform top is not "inside" it.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rectangle of size (w, h) centered on (cx, cy).
    pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Rect::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    #[inline]
    pub fn left(&self) -> f32 { self.x }
    #[inline]
    pub fn right(&self) -> f32 { self.x + self.w }
    #[inline]
    pub fn top(&self) -> f32 { self.y }
    #[inline]
    pub fn bottom(&self) -> f32 { self.y + self.h }
    #[inline]
    pub fn center_x(&self) -> f32 { self.x + self.w * 0.5 }
    #[inline]
    pub fn center_y(&self) -> f32 { self.y + self.h * 0.5 }

    pub fn set_left(&mut self, v: f32) { self.x = v; }
    pub fn set_right(&mut self, v: f32) { self.x = v - self.w; }
    pub fn set_top(&mut self, v: f32) { self.y = v; }
    pub fn set_bottom(&mut self, v: f32) { self.y = v - self.h; }

    /// Strict overlap test (shared edges don't count).
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Shrink by `inset` on every side, never below zero size.
    pub fn inset(&self, inset: f32) -> Rect {
        let w = (self.w - inset * 2.0).max(0.0);
        let h = (self.h - inset * 2.0).max(0.0);
        Rect::centered(self.center_x(), self.center_y(), w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_center() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center_x(), 25.0);
        assert_eq!(r.center_y(), 40.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let floor = Rect::new(0.0, 100.0, 64.0, 64.0);
        let standing = Rect::new(10.0, 20.0, 40.0, 80.0);
        assert!(!standing.overlaps(&floor));

        let sunk = Rect::new(10.0, 21.0, 40.0, 80.0);
        assert!(sunk.overlaps(&floor));
    }

    #[test]
    fn setters_move_without_resizing() {
        let mut r = Rect::new(0.0, 0.0, 40.0, 80.0);
        r.set_right(100.0);
        assert_eq!(r.x, 60.0);
        r.set_bottom(200.0);
        assert_eq!(r.y, 120.0);
        assert_eq!((r.w, r.h), (40.0, 80.0));
    }

    #[test]
    fn inset_keeps_center() {
        let r = Rect::new(0.0, 0.0, 64.0, 64.0).inset(6.0);
        assert_eq!(r, Rect::new(6.0, 6.0, 52.0, 52.0));

        let tiny = Rect::new(0.0, 0.0, 4.0, 4.0).inset(6.0);
        assert_eq!((tiny.w, tiny.h), (0.0, 0.0));
    }
}
