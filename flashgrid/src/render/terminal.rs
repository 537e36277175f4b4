use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::grid::CellRenderer;

const CELL: &str = "■";

/// Draws the grid to stdout whenever the lit cell changes.
pub struct TerminalRenderer {
    len: usize,
    columns: usize,
    lit: Option<usize>,
    stdout: StandardStream,
}

impl TerminalRenderer {
    pub fn new(len: usize, columns: usize) -> Self {
        Self {
            len,
            columns: columns.max(1),
            lit: None,
            stdout: StandardStream::stdout(ColorChoice::Auto),
        }
    }

    fn draw(&mut self) {
        // Drawing is best effort; a closed stdout must not stop a session.
        let _ = self.try_draw();
    }

    fn try_draw(&mut self) -> std::io::Result<()> {
        let mut idle = ColorSpec::new();
        idle.set_fg(Some(Color::Blue));
        let mut active = ColorSpec::new();
        active.set_fg(Some(Color::Red)).set_bold(true);

        for row in rows(self.len, self.columns) {
            for index in row {
                let spec =
                    if self.lit == Some(index) { &active } else { &idle };
                self.stdout.set_color(spec)?;
                write!(self.stdout, "{} ", CELL)?;
            }
            self.stdout.reset()?;
            writeln!(self.stdout)?;
        }
        writeln!(self.stdout)?;
        self.stdout.flush()
    }
}

impl CellRenderer for TerminalRenderer {
    fn set_active(&mut self, index: usize) {
        self.lit = Some(index);
        self.draw();
    }

    fn set_idle(&mut self, index: usize) {
        if self.lit == Some(index) {
            self.lit = None;
            self.draw();
        }
    }
}

fn rows(
    len: usize,
    columns: usize,
) -> impl Iterator<Item = std::ops::Range<usize>> {
    (0..len)
        .step_by(columns)
        .map(move |start| start..(start + columns).min(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_wrap_at_column_count() {
        let square: Vec<_> = rows(9, 3).collect();
        assert_eq!(square, vec![0..3, 3..6, 6..9]);

        let ragged: Vec<_> = rows(5, 2).collect();
        assert_eq!(ragged, vec![0..2, 2..4, 4..5]);
    }
}
