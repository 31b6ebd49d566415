/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Rasterize the draw list into the `front` buffer, scaling the
///      1280×720 viewport onto the terminal's map area
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout:
///   row 0          HUD (score, lives, kills, time, point legend)
///   rows 2..       map area
///   below map      notification bar, help bar

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::background::BgLayer;
use crate::domain::entity::{Facing, Pose};
use crate::domain::rules::{self, format_time};
use crate::sim::draw_list::{DrawItem, Frame, Hud, Overlay, Sprite};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell, also used
    /// for `Clear` so row gaps on VTE terminals match the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer; never equal to a real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Draw a glyph over whatever background is already there.
    fn overlay(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        let bg = self.get(x, y).bg;
        self.set(x, y, Cell::new(ch, fg, bg));
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Map area geometry ──

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap + notification + help
const RESERVED_ROWS: usize = MAP_ROW + 3;

/// Maps viewport pixels onto terminal cells of the map area.
#[derive(Clone, Copy, Debug)]
struct Viewport {
    cols: usize,
    rows: usize,
    sx: f32,
    sy: f32,
}

impl Viewport {
    fn new(cols: usize, rows: usize, view_w: f32, view_h: f32) -> Self {
        Viewport {
            cols,
            rows,
            sx: cols as f32 / view_w.max(1.0),
            sy: rows as f32 / view_h.max(1.0),
        }
    }
}

/// Half-open cell range covered by the pixel span `lo..hi`, clipped to
/// `0..limit`. Any visible span covers at least one cell.
fn cell_span(lo: f32, hi: f32, scale: f32, limit: usize) -> Option<(usize, usize)> {
    let a = (lo * scale).floor();
    let b = (hi * scale).ceil();
    if b <= 0.0 || a >= limit as f32 || hi <= lo {
        return None;
    }
    let a = a.max(0.0) as usize;
    let b = (b as usize).min(limit);
    Some((a, b.max(a + 1).min(limit)))
}

/// Darken a color for faded sprites (invincibility flicker, dying enemies).
fn shade(color: Color, alpha: f32) -> Color {
    if alpha >= 0.75 {
        return color;
    }
    match color {
        Color::Rgb { r, g, b } => {
            let k = alpha.clamp(0.3, 1.0);
            Color::Rgb {
                r: (r as f32 * k) as u8,
                g: (g as f32 * k) as u8,
                b: (b as f32 * k) as u8,
            }
        }
        _ => Color::DarkGrey,
    }
}

/// Ten-segment volume meter.
fn volume_bar(level: f32) -> String {
    let filled = (level.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("{}{} {:>3}%", "█".repeat(filled), "░".repeat(10 - filled), (level * 100.0).round() as u32)
}

fn layer_color(layer: BgLayer) -> Color {
    match layer {
        BgLayer::Hills => Color::Rgb { r: 34, g: 70, b: 44 },
        BgLayer::Sky => Color::Rgb { r: 40, g: 70, b: 120 },
        BgLayer::Dusk => Color::Rgb { r: 60, g: 40, b: 90 },
        BgLayer::Sunset => Color::Rgb { r: 120, g: 60, b: 40 },
    }
}

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const BOX_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, frame: &Frame, pad_connected: bool) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        let map_rows = self.term_h.saturating_sub(RESERVED_ROWS).max(1);
        let vp = Viewport::new(self.term_w, map_rows, frame.view_w, frame.view_h);

        self.front.clear();
        self.compose_hud(&frame.hud);
        for item in &frame.items {
            self.compose_item(frame, item, &vp);
        }
        self.compose_bars(frame, map_rows, pad_connected);
        if let Some(overlay) = &frame.overlay {
            self.compose_overlay(overlay, &vp);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, hud: &Hud) {
        let best = hud.best_time.map(format_time).unwrap_or_else(|| "--:--".to_string());
        let text = format!(
            " Score:{:<6} ♥×{}  Kills:{:<3} Time {}  Best {}   ● +{}  ≡ +{}  ▮ +{}  ▲ +{} ",
            hud.score, hud.lives, hud.kills, format_time(hud.elapsed), best,
            rules::SCORE_COIN, rules::SCORE_SIGN, rules::SCORE_BEER, rules::SCORE_ENEMY,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &text, Color::White, HUD_BG);
    }

    fn compose_item(&mut self, frame: &Frame, item: &DrawItem, vp: &Viewport) {
        if item.alpha <= 0.05 {
            return;
        }
        let r = frame.screen_rect(item);
        let (Some((c0, c1)), Some((r0, r1))) = (
            cell_span(r.left(), r.right(), vp.sx, vp.cols),
            cell_span(r.top(), r.bottom(), vp.sy, vp.rows),
        ) else {
            return;
        };

        match item.sprite {
            Sprite::Background(layer) => {
                let bg = layer_color(layer);
                self.fill(c0..c1, r0..r1, |_, _| Cell::new(' ', Color::White, bg));
            }
            Sprite::River { flow } => {
                let fg = Color::Rgb { r: 150, g: 200, b: 255 };
                let bg = Color::Rgb { r: 30, g: 70, b: 160 };
                let sx = vp.sx;
                self.fill(c0..c1, r0..r1, |col, row| {
                    Cell::new(river_glyph(col, row, flow, sx), fg, bg)
                });
            }
            Sprite::Platform => {
                let fg = shade(Color::Rgb { r: 150, g: 100, b: 60 }, item.alpha);
                let top = Color::Rgb { r: 90, g: 170, b: 70 };
                self.fill(c0..c1, r0..r1, |_, row| {
                    if row == r0 { Cell::new('▀', top, Color::Rgb { r: 150, g: 100, b: 60 }) }
                    else { Cell::new('▓', fg, Cell::BASE_BG) }
                });
            }
            Sprite::Door => {
                let fg = Color::Rgb { r: 170, g: 90, b: 40 };
                for row in r0..r1 {
                    for col in c0..c1 {
                        let edge = col == c0 || col + 1 == c1 || row == r0;
                        self.front.overlay(col, MAP_ROW + row, if edge { '█' } else { '▒' }, fg);
                    }
                }
            }
            Sprite::Sign => self.glyphs(c0..c1, r0..r1, '≡', shade(Color::Rgb { r: 230, g: 210, b: 120 }, item.alpha)),
            Sprite::Coin => self.glyphs(c0..c1, r0..r1, '●', shade(Color::Rgb { r: 255, g: 210, b: 40 }, item.alpha)),
            Sprite::Beer => self.glyphs(c0..c1, r0..r1, '▮', shade(Color::Rgb { r: 230, g: 150, b: 30 }, item.alpha)),
            Sprite::Enemy => self.glyphs(c0..c1, r0..r1, '▲', shade(Color::Rgb { r: 230, g: 60, b: 60 }, item.alpha)),
            Sprite::Player(pose) => self.compose_player(pose, c0..c1, r0..r1, item.alpha),
        }
    }

    fn compose_player(
        &mut self,
        pose: Pose,
        cols: std::ops::Range<usize>,
        rows: std::ops::Range<usize>,
        alpha: f32,
    ) {
        let body = shade(Color::Rgb { r: 80, g: 220, b: 255 }, alpha);
        let (facing, legs) = match pose {
            Pose::Idle(f) => (f, '║'),
            Pose::Run(f, frame) => (f, ['╱', '│', '╲', '│'][frame as usize % 4]),
        };
        let head = match facing {
            Facing::Left => '◄',
            Facing::Right => '►',
        };
        let last_row = rows.end.saturating_sub(1);
        for row in rows.clone() {
            for col in cols.clone() {
                let ch = if row == rows.start { head }
                    else if row == last_row { legs }
                    else { '█' };
                self.front.overlay(col, MAP_ROW + row, ch, body);
            }
        }
    }

    fn fill(
        &mut self,
        cols: std::ops::Range<usize>,
        rows: std::ops::Range<usize>,
        mut cell: impl FnMut(usize, usize) -> Cell,
    ) {
        for row in rows {
            for col in cols.clone() {
                self.front.set(col, MAP_ROW + row, cell(col, row));
            }
        }
    }

    fn glyphs(&mut self, cols: std::ops::Range<usize>, rows: std::ops::Range<usize>, ch: char, fg: Color) {
        for row in rows {
            for col in cols.clone() {
                self.front.overlay(col, MAP_ROW + row, ch, fg);
            }
        }
    }

    fn compose_bars(&mut self, frame: &Frame, map_rows: usize, pad_connected: bool) {
        let msg_row = MAP_ROW + map_rows;
        if let Some(note) = &frame.notification {
            self.front.fill_row(msg_row, MSG_BG);
            // Fade out over the last half second.
            let fg = if note.frames_left < 30 { Color::DarkGrey } else { Color::Black };
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", note.text), fg, MSG_BG);
        }

        let help_row = msg_row + 1;
        let mut help = String::from(" ←/→ A/D:Run  ↑/W/Space:Jump  P:Pause  R:Restart  Q/Esc:Quit");
        if pad_connected {
            help.push_str("  │  Pad: A Jump  Start Pause  Select Quit");
        }
        self.front.put_str(0, help_row, &help, Color::DarkGrey, Color::Reset);
    }

    fn compose_overlay(&mut self, overlay: &Overlay, vp: &Viewport) {
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let key_c = Color::Rgb { r: 100, g: 200, b: 255 };
        let desc_c = Color::Rgb { r: 200, g: 200, b: 200 };

        let lines: Vec<(String, Color)> = match overlay {
            Overlay::Paused { encouragement, music, sfx } => vec![
                ("║  PAUSED  ║".to_string(), hdr),
                (String::new(), desc_c),
                (encouragement.clone(), desc_c),
                (String::new(), desc_c),
                (format!("Music    [ ]  {}", volume_bar(*music)), key_c),
                (format!("Effects  - =  {}", volume_bar(*sfx)), key_c),
                (String::new(), desc_c),
                ("P Resume   Q Quit".to_string(), key_c),
            ],
            Overlay::GameOver { final_score, rank } => vec![
                ("║  GAME OVER  ║".to_string(), Color::Rgb { r: 255, g: 90, b: 90 }),
                (String::new(), desc_c),
                (format!("Final score: {final_score}"), desc_c),
                (rank.to_string(), hdr),
                (String::new(), desc_c),
                ("R Restart   Q Quit".to_string(), key_c),
            ],
            Overlay::Complete { final_score, rank, time } => vec![
                ("║  LEVEL COMPLETE!  ║".to_string(), hdr),
                (String::new(), desc_c),
                (format!("Time: {}", format_time(*time)), desc_c),
                (format!("Final score: {final_score}"), desc_c),
                (rank.to_string(), hdr),
                (String::new(), desc_c),
                ("R Play again   Q Quit".to_string(), key_c),
            ],
        };

        let widest = lines.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let box_w = (widest + 6).min(vp.cols);
        let box_h = (lines.len() + 2).min(vp.rows);
        let box_x = vp.cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + vp.rows.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::Reset, BOX_BG));
            }
        }
        for (i, (line, fg)) in lines.iter().enumerate().take(box_h.saturating_sub(2)) {
            let x = box_x + box_w.saturating_sub(line.chars().count()) / 2;
            self.front.put_str(x, box_y + 1 + i, line, *fg, BOX_BG);
        }
    }
}

/// Wave glyph at a river cell. `flow` is the river's scroll offset in
/// pixels and only ever decreases, so it is negated before wrapping.
fn river_glyph(col: usize, row: usize, flow: f32, sx: f32) -> char {
    const WAVES: [char; 4] = ['~', '≈', '~', ' '];
    let shift = (-flow * sx).rem_euclid(WAVES.len() as f32) as usize;
    WAVES[(col + row + shift) % WAVES.len()]
}
