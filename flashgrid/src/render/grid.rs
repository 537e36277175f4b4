#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CellState {
    #[default]
    Idle,
    Active,
}

/// Receives visual commands for individual cells. Commands are
/// fire-and-forget; repeating `set_idle` on an idle cell must be harmless.
pub trait CellRenderer {
    fn set_active(&mut self, index: usize);
    fn set_idle(&mut self, index: usize);
}

/// Fixed set of cells of which at most one is active at any time.
#[derive(Debug)]
pub struct Grid<R> {
    cells: Vec<CellState>,
    renderer: R,
}

impl<R: CellRenderer> Grid<R> {
    pub fn new(len: usize, renderer: R) -> Self {
        Self {
            cells: vec![CellState::Idle; len],
            renderer,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<CellState> {
        self.cells.get(index).copied()
    }

    pub fn active(&self) -> Option<usize> {
        self.cells.iter().position(|c| *c == CellState::Active)
    }

    pub fn reset_all(&mut self) {
        for (index, cell) in self.cells.iter_mut().enumerate() {
            *cell = CellState::Idle;
            self.renderer.set_idle(index);
        }
    }

    /// Idle every cell, then light `index`. Returns `false` for an index
    /// outside the grid, in which case nothing changes.
    pub fn flash(&mut self, index: usize) -> bool {
        if index >= self.cells.len() {
            return false;
        }
        self.reset_all();
        self.cells[index] = CellState::Active;
        self.renderer.set_active(index);
        true
    }

    pub fn release(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            if *cell == CellState::Active {
                *cell = CellState::Idle;
                self.renderer.set_idle(index);
            }
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CellCommand {
    Active(usize),
    Idle(usize),
}

/// Renderer that keeps every command it receives, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub commands: Vec<CellCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices passed to `set_active`, in order.
    pub fn activations(&self) -> Vec<usize> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                CellCommand::Active(index) => Some(*index),
                CellCommand::Idle(_) => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl CellRenderer for RecordingRenderer {
    fn set_active(&mut self, index: usize) {
        self.commands.push(CellCommand::Active(index));
    }

    fn set_idle(&mut self, index: usize) {
        self.commands.push(CellCommand::Idle(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_keeps_a_single_active_cell() {
        let mut grid = Grid::new(9, RecordingRenderer::new());

        assert!(grid.flash(2));
        assert!(grid.flash(5));

        assert_eq!(grid.active(), Some(5));
        assert_eq!(grid.state(2), Some(CellState::Idle));
        let active = (0..grid.len())
            .filter(|i| grid.state(*i) == Some(CellState::Active))
            .count();
        assert_eq!(active, 1);
        assert_eq!(grid.renderer().activations(), vec![2, 5]);
    }

    #[test]
    fn flash_resets_every_cell_first() {
        let mut grid = Grid::new(3, RecordingRenderer::new());
        grid.flash(1);

        assert_eq!(
            grid.renderer().commands,
            vec![
                CellCommand::Idle(0),
                CellCommand::Idle(1),
                CellCommand::Idle(2),
                CellCommand::Active(1),
            ]
        );
    }

    #[test]
    fn out_of_range_flash_is_ignored() {
        let mut grid = Grid::new(4, RecordingRenderer::new());
        assert!(!grid.flash(4));
        assert_eq!(grid.active(), None);
        assert!(grid.renderer().commands.is_empty());
    }

    #[test]
    fn release_only_touches_the_lit_cell() {
        let mut grid = Grid::new(4, RecordingRenderer::new());
        grid.flash(3);
        grid.renderer_mut().clear();

        grid.release(1);
        assert!(grid.renderer().commands.is_empty());

        grid.release(3);
        grid.release(3);
        assert_eq!(grid.renderer().commands, vec![CellCommand::Idle(3)]);
        assert_eq!(grid.active(), None);
    }
}
