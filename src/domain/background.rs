/// Parallax background sequencing.
///
/// The level is split into horizontal segments, each owning one background
/// layer. Inside a segment the layer slides left as the player advances and
/// the following layer slides in behind it, so crossing a segment boundary
/// hands off seamlessly.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BgLayer {
    Hills,
    Sky,
    Dusk,
    Sunset,
}

/// Default segment spans in pixels; 0 takes whatever width remains.
pub const DEFAULT_SEGMENTS: &[(BgLayer, f32)] = &[
    (BgLayer::Hills, 6000.0),
    (BgLayer::Sky, 4000.0),
    (BgLayer::Dusk, 5000.0),
    (BgLayer::Sunset, 3000.0),
];

/// Layers to draw this frame, as screen-space x positions.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BackgroundFrame {
    pub current: BgLayer,
    pub x_current: f32,
    pub next: Option<(BgLayer, f32)>,
}

struct Segment {
    layer: BgLayer,
    start: f32,
    span: f32,
}

pub struct BackgroundSequencer {
    segments: Vec<Segment>,
}

impl BackgroundSequencer {
    /// Lay `spans` end to end. A zero span is resolved against `level_width`.
    pub fn new(spans: &[(BgLayer, f32)], level_width: f32) -> Self {
        let mut segments = Vec::with_capacity(spans.len());
        let mut start = 0.0;
        for &(layer, span) in spans {
            let span = if span == 0.0 { (level_width - start).max(0.0) } else { span };
            segments.push(Segment { layer, start, span });
            start += span;
        }
        BackgroundSequencer { segments }
    }

    pub fn with_defaults(level_width: f32) -> Self {
        Self::new(DEFAULT_SEGMENTS, level_width)
    }

    /// Segment containing `x`, clamped to the first/last segment.
    fn locate(&self, x: f32) -> Option<usize> {
        if self.segments.is_empty() { return None; }
        let idx = self.segments.iter()
            .position(|s| x < s.start + s.span)
            .unwrap_or(self.segments.len() - 1);
        Some(idx)
    }

    pub fn frame(&self, player_x: f32, view_w: f32) -> Option<BackgroundFrame> {
        let idx = self.locate(player_x)?;
        let seg = &self.segments[idx];
        let progress = if seg.span > 0.0 {
            ((player_x - seg.start) / seg.span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let x_current = -progress * view_w;
        let next = self.segments.get(idx + 1).map(|n| (n.layer, x_current + view_w));
        Some(BackgroundFrame { current: seg.layer, x_current, next })
    }
}
