/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Every game cell is two terminal columns wide so the maze looks square.
/// Overlays (ready, quiz, transition, end screens, pause) are drawn on top
/// of the board, which stays visible underneath.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Direction, Ghost, GhostColor, GhostMode, Player};
use crate::domain::tile::Tile;
use crate::sim::quiz::{Difficulty, Feedback};
use crate::sim::world::{Phase, VictoryKind, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell, so the
    /// gaps between rows match the board on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 10, g: 10, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
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

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Write a string centered on column `cx`.
    fn put_centered(&mut self, cx: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        self.put_str(cx.saturating_sub(len / 2), y, s, fg, bg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

// ── Layout and palette ──

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WALL_FG: Color = Color::Rgb { r: 60, g: 90, b: 255 };
const WALL_BG: Color = Color::Rgb { r: 25, g: 35, b: 120 };
const DOT_FG: Color = Color::Rgb { r: 255, g: 200, b: 170 };
const PLAYER_FG: Color = Color::Rgb { r: 255, g: 230, b: 0 };
const FRIGHT_FG: Color = Color::Rgb { r: 60, g: 60, b: 255 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const BOX_BG: Color = Color::Rgb { r: 30, g: 30, b: 45 };
const TITLE_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const GOOD_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const BAD_FG: Color = Color::Rgb { r: 255, g: 70, b: 70 };
const QUIZ_FG: Color = Color::Rgb { r: 200, g: 120, b: 255 };

/// Frightened ghosts flash white during this many final ticks.
const FLASH_TICKS: u32 = 12;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Counts rendered frames; drives blinking while the sim is frozen.
    frame: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            frame: 0,
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
        // Force full repaint on first frame
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

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        self.frame = self.frame.wrapping_add(1);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose_game(world);

        match world.phase {
            Phase::Idle => self.compose_ready(world),
            Phase::Playing if world.paused => self.compose_pause_overlay(),
            Phase::Playing => {}
            Phase::Quiz => self.compose_quiz(world),
            Phase::GeneratingLevel => self.compose_banner(
                world,
                &["GENERATING MAZE", "", "Asking the generator for a new layout..."],
                QUIZ_FG,
            ),
            Phase::LevelTransition => self.compose_banner(
                world,
                &[
                    "LEVEL UP!",
                    "",
                    "Next tier: ecuaciones de segundo grado",
                    "Same maze, harder questions.",
                ],
                GOOD_FG,
            ),
            Phase::GameOver => self.compose_game_over(world),
            Phase::Victory(kind) => self.compose_victory(world, kind),
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

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default background.
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

    // ── Board ──

    /// Left column of the map, centered when the terminal is wide enough.
    fn map_origin(&self, w: &WorldState) -> usize {
        self.front.width.saturating_sub(w.grid.width() * CELL_W) / 2
    }

    fn map_bottom(&self, w: &WorldState) -> usize {
        MAP_ROW + w.grid.height()
    }

    fn compose_game(&mut self, w: &WorldState) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud_line(w), Color::White, HUD_BG);

        let ox = self.map_origin(w);
        for (gy, row) in w.grid.rows().iter().enumerate() {
            for (gx, &tile) in row.iter().enumerate() {
                let (c0, c1, fg, bg) = tile_glyph(tile);
                let col = ox + gx * CELL_W;
                self.front.set(col, MAP_ROW + gy, Cell::new(c0, fg, bg));
                self.front.set(col + 1, MAP_ROW + gy, Cell::new(c1, fg, bg));
            }
        }

        let (ch, fg) = player_glyph(&w.player);
        self.put_entity(ox, w.player.pos.x, w.player.pos.y, ch, fg);

        for g in &w.ghosts {
            let (ch, fg) = ghost_glyph(g, w.frightened_ticks, self.frame);
            self.put_entity(ox, g.pos.x, g.pos.y, ch, fg);
        }

        let bottom = self.map_bottom(w);
        if !w.message.is_empty() {
            let row = bottom + 1;
            self.front.fill_row(row, MSG_BG);
            self.front.put_str(0, row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
        }

        let help = " ←→↑↓/WASD Move  1-4/A-D Answer  G New maze  R Try again  P Pause  Q Quit";
        self.front.put_str(0, bottom + 3, help, Color::DarkGrey, Color::Reset);
    }

    fn put_entity(&mut self, ox: usize, gx: usize, gy: usize, ch: char, fg: Color) {
        let col = ox + gx * CELL_W;
        self.front.set(col, MAP_ROW + gy, Cell::new(ch, fg, Color::Reset));
        self.front.set(col + 1, MAP_ROW + gy, Cell::new(' ', fg, Color::Reset));
    }

    // ── Overlays ──

    /// Centered box over the map; returns (left column, first text row).
    fn overlay_box(&mut self, w: &WorldState, width: usize, height: usize) -> (usize, usize) {
        let map_cols = w.grid.width() * CELL_W;
        let box_w = width.min(self.front.width);
        let x = self.map_origin(w) + map_cols.saturating_sub(box_w) / 2;
        let y = MAP_ROW + w.grid.height().saturating_sub(height) / 2;
        self.front.fill_rect(x, y, box_w, height, BOX_BG);
        (x, y)
    }

    fn compose_banner(&mut self, w: &WorldState, lines: &[&str], title_fg: Color) {
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 6;
        let (x, y) = self.overlay_box(w, width, lines.len() + 2);
        let cx = x + width / 2;
        for (i, line) in lines.iter().enumerate() {
            let fg = if i == 0 { title_fg } else { Color::White };
            self.front.put_centered(cx, y + 1 + i, line, fg, BOX_BG);
        }
    }

    fn compose_ready(&mut self, w: &WorldState) {
        let blink = (self.frame / 8) % 2 == 0;
        let start = if blink { "▶ ENTER / SPACE: Start" } else { "" };
        let title = format!("QUIZ-MAN · {}", w.level_name);
        let tier = format!("Tier: {}", w.quiz.difficulty.label());
        self.compose_banner(
            w,
            &[title.as_str(), "", tier.as_str(), "A quiz every 500 points.", "", start, "G: Generate a new maze"],
            TITLE_FG,
        );
    }

    fn compose_quiz(&mut self, w: &WorldState) {
        let width = 54;
        let (x, y) = self.overlay_box(w, width, 12);
        let cx = x + width / 2;

        let heading = match w.quiz.difficulty {
            Difficulty::Linear => "Desafío: Ecuaciones 1er Grado",
            Difficulty::Quadratic => "Desafío: Ecuaciones 2º Grado",
        };
        self.front.put_centered(cx, y + 1, heading, QUIZ_FG, BOX_BG);

        let Some(q) = &w.quiz.question else {
            let dots = ".".repeat((self.frame / 6 % 4) as usize);
            self.front.put_centered(cx, y + 4, &format!("Generando pregunta{dots:<3}"), Color::White, BOX_BG);
            return;
        };

        self.front.put_centered(cx, y + 3, &q.text, Color::White, BOX_BG);

        for (i, opt) in q.options.iter().enumerate() {
            let label = format!("{}) {}", (b'A' + i as u8) as char, opt);
            let fg = option_color(w.quiz.feedback, w.quiz.selected, q.correct_index, i);
            self.front.put_str(x + 6, y + 5 + i, &label, fg, BOX_BG);
        }

        match w.quiz.feedback {
            Some(Feedback::Correct) => {
                let progress = format!("¡Correcto! {}/{}", w.quiz.streak, w.quiz_cfg.streak_to_advance);
                self.front.put_centered(cx, y + 10, &progress, GOOD_FG, BOX_BG);
            }
            Some(Feedback::Wrong) => {
                self.front.put_centered(cx, y + 10, "Incorrecto. ¡Sigue jugando!", BAD_FG, BOX_BG);
            }
            None => {
                self.front.put_centered(cx, y + 10, "1-4 / A-D para responder", Color::DarkGrey, BOX_BG);
            }
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let score = format!("Final score: {}", w.score);
        self.compose_banner(
            w,
            &["✕ GAME OVER ✕", "", score.as_str(), "", "R: Try again   G: New maze   Q: Quit"],
            BAD_FG,
        );
    }

    fn compose_victory(&mut self, w: &WorldState, kind: VictoryKind) {
        let headline = match kind {
            VictoryKind::MazeCleared => "★ MAZE CLEARED! ★",
            VictoryKind::CurriculumComplete => "★ ¡ERES UN GENIO DE LAS MATEMÁTICAS! ★",
        };
        let score = format!("Final score: {}", w.score);
        self.compose_banner(
            w,
            &[headline, "", score.as_str(), "", "R: Play again   G: New maze   Q: Quit"],
            TITLE_FG,
        );
    }

    fn compose_pause_overlay(&mut self) {
        let blink = (self.frame / 8) % 2 == 0;
        let label = if blink { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        let cx = self.front.width / 2;
        let row = MAP_ROW + 1;
        self.front.put_centered(cx, row, label, TITLE_FG, BOX_BG);
        self.front.put_centered(cx, row + 1, " P / F1: Resume ", Color::White, BOX_BG);
    }
}

// ── Glyphs ──

fn hud_line(w: &WorldState) -> String {
    format!(
        " Score:{:<6}  Next quiz:{:<6}  {}  Progress:{}/{}  Maze:{}",
        w.score,
        w.next_quiz_at(),
        w.quiz.difficulty.label(),
        w.quiz.streak,
        w.quiz_cfg.streak_to_advance,
        w.level_name,
    )
}

fn tile_glyph(tile: Tile) -> (char, char, Color, Color) {
    match tile {
        Tile::Empty => (' ', ' ', Color::Reset, Color::Reset),
        Tile::Wall => ('█', '█', WALL_FG, WALL_BG),
        Tile::Dot => ('·', ' ', DOT_FG, Color::Reset),
        Tile::PowerPellet => ('●', ' ', DOT_FG, Color::Reset),
    }
}

fn player_glyph(p: &Player) -> (char, Color) {
    if !p.mouth_open {
        return ('●', PLAYER_FG);
    }
    let ch = match p.dir {
        Direction::Left => 'ᗤ',
        Direction::Up => 'ᗢ',
        Direction::Down => 'ᗣ',
        Direction::Right | Direction::None => 'ᗧ',
    };
    (ch, PLAYER_FG)
}

fn ghost_glyph(g: &Ghost, frightened_ticks: u32, frame: u64) -> (char, Color) {
    match g.mode {
        GhostMode::Eaten => ('"', Color::White),
        GhostMode::Frightened => {
            let flash = frightened_ticks <= FLASH_TICKS && (frame / 4) % 2 == 0;
            ('ᗝ', if flash { Color::White } else { FRIGHT_FG })
        }
        GhostMode::Scatter | GhostMode::Chase => {
            let fg = match g.color {
                GhostColor::Red => Color::Rgb { r: 255, g: 0, b: 0 },
                GhostColor::Pink => Color::Rgb { r: 255, g: 184, b: 255 },
                GhostColor::Cyan => Color::Rgb { r: 0, g: 255, b: 255 },
                GhostColor::Orange => Color::Rgb { r: 255, g: 184, b: 82 },
            };
            ('ᗝ', fg)
        }
    }
}

/// Options turn green/red once answered: the correct one is always
/// revealed, and a wrong pick is marked.
fn option_color(feedback: Option<Feedback>, selected: Option<usize>, correct: usize, i: usize) -> Color {
    match feedback {
        None => Color::White,
        Some(_) if i == correct => GOOD_FG,
        Some(Feedback::Wrong) if selected == Some(i) => BAD_FG,
        Some(_) => Color::DarkGrey,
    }
}
