use crate::Direction;

/// A cell coordinate. Signed so a step off the edge is still representable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    pub fn translate(self, dir: Direction) -> Self {
        let (dr, dc) = dir.delta();
        Position { row: self.row + dr, col: self.col + dc }
    }
}
