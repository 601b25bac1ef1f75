use Direction::*;

/// Heading of the snake. Each variant moves one cell along exactly one axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Up, Down, Left, Right];

    /// Returns `(row_offset, col_offset)`. Rows grow downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }

    pub fn row_offset(self) -> i32 {
        self.delta().0
    }

    pub fn col_offset(self) -> i32 {
        self.delta().1
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}
