//! Grid snake game engine.
//!
//! The [`Engine`] owns the board, the snake and the score, and advances one
//! cell per [`Engine::move_snake`] call. It does no I/O; rendering, input and
//! timing are left to the caller.

pub mod direction;
pub mod engine;
pub mod grid;
pub mod position;

pub use direction::Direction;
pub use engine::{Engine, MoveResult, MAX_PENDING_TURNS};
pub use grid::{Cell, Grid};
pub use position::Position;
