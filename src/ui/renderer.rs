/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into the `front` buffer
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. Batch everything with `queue!` and flush once
///   5. Swap front/back
///
/// Each tile is two terminal columns wide. Actors are drawn at half-tile
/// horizontal resolution: an actor covers the columns spanned by
/// `[left * 2, right * 2)` and the rows spanned by `[top, bottom)`.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use lavadash::domain::entity::{Actor, ActorType};
use lavadash::domain::tile::Obstacle;
use lavadash::sim::level::Status;
use lavadash::sim::session::{Phase, Session};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 52, g: 166, b: 251 }; // sky

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never equal to a real cell, so every position is diffed.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    const fn new(ch: char, fg: Color, bg: Color) -> Self {
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
            *self = FrameBuffer::new(w, h);
        }
    }

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Palette ──

const WALL: Cell = Cell::new('▓', Color::Rgb { r: 200, g: 200, b: 200 }, Color::Rgb { r: 150, g: 150, b: 150 });
const LAVA: Cell = Cell::new('≈', Color::Rgb { r: 255, g: 200, b: 60 }, Color::Rgb { r: 255, g: 100, b: 100 });
const COIN_FG: Color = Color::Rgb { r: 241, g: 229, b: 89 };
const FIRE_FG: Color = Color::Rgb { r: 255, g: 80, b: 40 };
const PLAYER_FG: Color = Color::Rgb { r: 64, g: 64, b: 64 };
const HUD_FG: Color = Color::White;
const HUD_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

/// Terminal columns per tile.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

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
            SetBackgroundColor(HUD_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Pick up a terminal resize and force a full repaint if there was one.
    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.back.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(HUD_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        self.sync_size()?;

        self.front.fill(Cell::new(' ', HUD_FG, HUD_BG));
        self.compose_hud(session);
        self.compose_level(session);
        self.compose_footer(session);
        match session.phase {
            Phase::Paused => self.compose_banner("PAUSED", "P: resume"),
            Phase::Complete => self.compose_banner("ALL LEVELS CLEARED", "Q: quit"),
            Phase::Playing => {}
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = HUD_FG;
        let mut last_bg = HUD_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
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
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, s: &Session) {
        let level = s.level();
        let status = match level.status() {
            Some(Status::Won) => "  CLEARED",
            Some(Status::Lost) => "  BURNED",
            None => "",
        };
        let hud = format!(
            " LEVEL {}/{}  {}   COINS {}   DEATHS {}   TRY {}{}",
            s.current_index() + 1,
            s.total_levels(),
            s.level_name(),
            s.coins_left(),
            s.deaths,
            s.attempts,
            status,
        );
        self.front.put_str(0, HUD_ROW, &hud, HUD_FG, HUD_BG);
    }

    fn compose_level(&mut self, s: &Session) {
        let level = s.level();
        let map_cols = level.width() * CELL_W;
        let origin_x = self.term_w.saturating_sub(map_cols) / 2;

        for gy in 0..level.height() {
            for gx in 0..level.width() {
                let cell = match level.cell(gx, gy) {
                    Some(Obstacle::Wall) => WALL,
                    Some(Obstacle::Lava) => LAVA,
                    None => Cell::BLANK,
                };
                for dx in 0..CELL_W {
                    self.front.set(origin_x + gx * CELL_W + dx, MAP_ROW + gy, cell);
                }
            }
        }

        // Player last, so it is drawn over whatever it overlaps.
        let (player, others): (Vec<&Actor>, Vec<&Actor>) = level
            .actors()
            .iter()
            .partition(|a| a.actor_type() == ActorType::Player);
        let burned = level.status() == Some(Status::Lost);
        for actor in others.into_iter().chain(player) {
            let glyph = actor_glyph(actor, burned);
            self.compose_actor(actor, glyph, origin_x, level.width(), level.height());
        }
    }

    fn compose_actor(&mut self, actor: &Actor, glyph: (char, Color), origin_x: usize, w: usize, h: usize) {
        let cols = span(actor.left() * CELL_W as f64, actor.right() * CELL_W as f64, w * CELL_W);
        let rows = span(actor.top(), actor.bottom(), h);
        for y in rows {
            for x in cols.clone() {
                let bg = self.front.get(origin_x + x, MAP_ROW + y).bg;
                self.front.set(origin_x + x, MAP_ROW + y, Cell::new(glyph.0, glyph.1, bg));
            }
        }
    }

    fn compose_footer(&mut self, s: &Session) {
        let msg_row = MAP_ROW + s.level().height() + 1;
        if s.message_timer > 0 {
            self.front.put_str(1, msg_row, &s.message, COIN_FG, HUD_BG);
        }
        let help = " ←↑↓→/WASD: move   P: pause   R: restart   Q/ESC: quit";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, HUD_BG);
    }

    fn compose_banner(&mut self, title: &str, hint: &str) {
        let box_w = title.len().max(hint.len()) + 6;
        let box_x = self.term_w.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + 1;
        for y in box_y..box_y + 4 {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', HUD_FG, HUD_BG));
            }
        }
        self.front.put_str(box_x + 3, box_y + 1, title, COIN_FG, HUD_BG);
        self.front.put_str(box_x + 3, box_y + 2, hint, Color::DarkGrey, HUD_BG);
    }
}

fn actor_glyph(actor: &Actor, burned: bool) -> (char, Color) {
    match actor.actor_type() {
        ActorType::Player if burned => ('✱', FIRE_FG),
        ActorType::Player => ('█', PLAYER_FG),
        ActorType::Coin => ('●', COIN_FG),
        ActorType::Fireball => ('◉', FIRE_FG),
        ActorType::Actor => ('■', Color::Grey),
    }
}

/// Whole cells touched by `[lo, hi)`, clipped to `[0, max)`.
fn span(lo: f64, hi: f64, max: usize) -> std::ops::Range<usize> {
    let start = lo.floor().max(0.0) as usize;
    let end = (hi.ceil().max(0.0) as usize).min(max);
    start.min(end)..end
}
