//! Terminal plumbing: a cell grid, diffed presentation and the raw-mode guard.

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg,
        }
    }
}

/// One frame worth of terminal cells
#[derive(Debug, Clone)]
pub struct CellBuffer {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(width: usize, height: usize, bg: Color) -> Self {
        CellBuffer {
            width,
            height,
            cells: vec![Cell::blank(bg); width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        (x < self.width && y < self.height).then(|| &self.cells[y * self.width + x])
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// Writes `text` starting at `(x, y)`, clipped to `max_width` columns and
    /// the buffer edge. Returns the number of columns written.
    pub fn put_str(&mut self, x: usize, y: usize, text: &str, fg: Color, bg: Color, max_width: usize) -> usize {
        let mut written = 0;
        for ch in text.chars() {
            if written >= max_width || x + written >= self.width {
                break;
            }
            self.set(x + written, y, Cell { ch, fg, bg });
            written += 1;
        }
        written
    }

    pub fn fill(&mut self, x: usize, y: usize, width: usize, height: usize, cell: Cell) {
        for row in y..(y + height).min(self.height) {
            for col in x..(x + width).min(self.width) {
                self.cells[row * self.width + col] = cell;
            }
        }
    }

    /// Characters of one row, for tests and snapshots
    pub fn row_text(&self, y: usize) -> String {
        if y >= self.height {
            return String::new();
        }
        self.cells[y * self.width..(y + 1) * self.width]
            .iter()
            .map(|c| c.ch)
            .collect()
    }
}

/// Writes the whole buffer as ANSI-colored lines
pub fn write_ansi<W: Write>(out: &mut W, buf: &CellBuffer) -> io::Result<()> {
    for y in 0..buf.height {
        let mut colors: Option<(Color, Color)> = None;
        for x in 0..buf.width {
            let cell = buf.cells[y * buf.width + x];
            if colors != Some((cell.fg, cell.bg)) {
                colors = Some((cell.fg, cell.bg));
                queue!(out, SetForegroundColor(cell.fg), SetBackgroundColor(cell.bg))?;
            }
            queue!(out, Print(cell.ch))?;
        }
        queue!(out, ResetColor, Print("\n"))?;
    }
    out.flush()
}

/// Raw mode, alternate screen and mouse capture for the lifetime of the guard
pub struct TermGuard {
    out: Stdout,
    last_frame: Vec<Cell>,
    size: (usize, usize),
}

impl TermGuard {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            DisableLineWrap,
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        debug!("terminal initialized");
        Ok(Self {
            out,
            last_frame: Vec::new(),
            size: (0, 0),
        })
    }

    /// Current terminal size in columns and rows
    pub fn size(&self) -> io::Result<(usize, usize)> {
        let (cols, rows) = terminal::size()?;
        Ok((cols as usize, rows as usize))
    }

    /// Draws the cells that changed since the last present
    pub fn present(&mut self, buf: &CellBuffer) -> io::Result<()> {
        if self.size != (buf.width, buf.height) {
            self.size = (buf.width, buf.height);
            self.last_frame = Vec::new();
            execute!(self.out, terminal::Clear(terminal::ClearType::All))?;
        }
        let out = &mut self.out;
        queue!(out, BeginSynchronizedUpdate)?;

        let mut colors: Option<(Color, Color)> = None;
        let mut cursor_at: Option<(usize, usize)> = None;
        for y in 0..buf.height {
            for x in 0..buf.width {
                let i = y * buf.width + x;
                let cell = buf.cells[i];
                if self.last_frame.get(i) == Some(&cell) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(out, cursor::MoveTo(x as u16, y as u16))?;
                }
                if colors != Some((cell.fg, cell.bg)) {
                    colors = Some((cell.fg, cell.bg));
                    queue!(out, SetForegroundColor(cell.fg), SetBackgroundColor(cell.bg))?;
                }
                queue!(out, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;
        self.last_frame.clone_from(&buf.cells);
        Ok(())
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        debug!("terminal restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_to_width() {
        let mut buf = CellBuffer::new(6, 2, Color::Black);
        let n = buf.put_str(2, 0, "engine", Color::White, Color::Black, 10);
        assert_eq!(n, 4);
        assert_eq!(buf.row_text(0), "  engi");
        let n = buf.put_str(0, 1, "engine", Color::White, Color::Black, 3);
        assert_eq!(n, 3);
        assert_eq!(buf.row_text(1), "eng   ");
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut buf = CellBuffer::new(2, 2, Color::Black);
        buf.set(5, 5, Cell::blank(Color::Red));
        buf.fill(1, 1, 10, 10, Cell::blank(Color::Red));
        assert_eq!(buf.get(1, 1).map(|c| c.bg), Some(Color::Red));
        assert_eq!(buf.get(0, 0).map(|c| c.bg), Some(Color::Black));
        assert!(buf.get(2, 0).is_none());
        assert_eq!(buf.row_text(9), "");
    }

    #[test]
    fn ansi_output_has_one_line_per_row() {
        let mut buf = CellBuffer::new(3, 2, Color::Black);
        buf.put_str(0, 0, "abc", Color::White, Color::Black, 3);
        let mut out = Vec::new();
        write_ansi(&mut out, &buf).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('\n').count(), 2);
        assert!(text.contains("abc"));
    }
}
