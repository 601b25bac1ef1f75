use crate::Position;

/// Content of a grid cell. `Outside` is only ever returned by lookups that
/// fall off the board; it is never stored.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Snake,
    Food,
    Outside,
}

/// Fixed-size board stored row-major in a flat vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Grid { rows, cols, cells: vec![Cell::Empty; rows * cols] }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.rows && (pos.col as usize) < self.cols
    }

    pub fn get(&self, pos: Position) -> Cell {
        match self.index(pos) {
            Some(i) => self.cells[i],
            None => Cell::Outside,
        }
    }

    /// Writes off the board, and writes of `Cell::Outside`, are dropped.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if cell == Cell::Outside {
            return;
        }

        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// Every empty cell, in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.positions().filter(|pos| self.get(*pos) == Cell::Empty).collect()
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// All positions on the board, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| Position::new(r as i32, c as i32)))
    }

    /// The board one row at a time, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols.max(1))
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row as usize * self.cols + pos.col as usize)
        } else {
            None
        }
    }
}
