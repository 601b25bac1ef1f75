use std::collections::VecDeque;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use ringbuffer::{ConstGenericRingBuffer, RingBuffer};

use crate::{Cell, Direction, Grid, Position};

/// How many direction changes may wait for the next ticks.
pub const MAX_PENDING_TURNS: usize = 2;

const INITIAL_SNAKE_COLS: [i32; 3] = [1, 2, 3];

/// What a single call to [`Engine::move_snake`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// Head advanced into an empty cell, tail followed.
    Moved { new_head: Position, old_tail: Position },
    /// Head advanced onto food, the body grew by one.
    Ate { new_head: Position },
    /// Head hit a wall or the body. The game is now over.
    Crashed { at: Position },
    /// The game was already over, nothing changed.
    Halted,
}

/// Snake game state over a fixed grid.
///
/// The engine is a plain state machine: callers feed it direction changes
/// through [`change_direction`](Engine::change_direction) and advance it one
/// cell at a time with [`move_snake`](Engine::move_snake). Once
/// [`is_game_over`](Engine::is_game_over) turns true every mutating call is
/// ignored.
///
/// Food placement draws from `R`, so a seeded generator gives a fully
/// reproducible game.
pub struct Engine<R: Rng = StdRng> {
    grid: Grid,
    body: VecDeque<Position>,
    turns: ConstGenericRingBuffer<Direction, MAX_PENDING_TURNS>,
    direction: Direction,
    score: u32,
    game_over: bool,
    rng: R,
}

impl Engine<StdRng> {
    /// Builds an engine whose food placement is seeded from the OS.
    ///
    /// Expects `rows >= 1` and `cols >= 4`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Engine::with_rng(rows, cols, StdRng::from_entropy())
    }

    /// Builds an engine that places food in the same cells every run.
    pub fn seeded(rows: usize, cols: usize, seed: u64) -> Self {
        Engine::with_rng(rows, cols, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(rows: usize, cols: usize, rng: R) -> Self {
        let mut engine = Engine {
            grid: Grid::new(rows, cols),
            body: VecDeque::with_capacity(rows * cols),
            turns: ConstGenericRingBuffer::default(),
            direction: Direction::Right,
            score: 0,
            game_over: false,
            rng,
        };

        engine.add_snake();
        engine.add_food();
        debug!("new {}x{} game, head at {:?}", rows, cols, engine.head_position());
        engine
    }

    /// Queues a turn for an upcoming tick.
    ///
    /// The request is dropped when two turns are already waiting, when it
    /// repeats the last queued heading, or when it would reverse it.
    pub fn change_direction(&mut self, dir: Direction) {
        if self.game_over {
            return;
        }

        if self.can_change_direction(dir) {
            trace!("queued turn {:?}", dir);
            self.turns.push(dir);
        } else {
            trace!("dropped turn {:?}", dir);
        }
    }

    /// Advances the snake one cell, applying at most one queued turn.
    pub fn move_snake(&mut self) -> MoveResult {
        if self.game_over {
            return MoveResult::Halted;
        }

        if let Some(dir) = self.turns.dequeue() {
            self.direction = dir;
        }

        let new_head = self.head_position().translate(self.direction);

        match self.will_hit(new_head) {
            Cell::Outside | Cell::Snake => {
                self.game_over = true;
                info!("game over at {:?}, score {}", new_head, self.score);
                MoveResult::Crashed { at: new_head }
            }
            Cell::Empty => {
                let old_tail = self.remove_tail();
                self.add_head(new_head);
                MoveResult::Moved { new_head, old_tail }
            }
            Cell::Food => {
                self.add_head(new_head);
                self.score += 1;
                debug!("ate food at {:?}, score {}", new_head, self.score);
                self.add_food();
                MoveResult::Ate { new_head }
            }
        }
    }

    /// What the head would run into at `pos`.
    ///
    /// The current tail cell reads as empty because the tail leaves it on the
    /// same tick the head arrives.
    pub fn will_hit(&self, pos: Position) -> Cell {
        if !self.grid.contains(pos) {
            return Cell::Outside;
        }

        if pos == self.tail_position() {
            return Cell::Empty;
        }

        self.grid.get(pos)
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.grid.get(pos)
    }

    pub fn head_position(&self) -> Position {
        self.body[0]
    }

    pub fn tail_position(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Body cells from head to tail.
    pub fn snake_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn snake_len(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Turns waiting to be applied, oldest first.
    pub fn pending_directions(&self) -> Vec<Direction> {
        self.turns.iter().copied().collect()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// True once the snake covers the whole board: no empty cell is left and
    /// no food is waiting to be eaten.
    pub fn is_full(&self) -> bool {
        self.grid.count(Cell::Empty) == 0 && self.grid.count(Cell::Food) == 0
    }

    ///////////////////////////////////////////////////////////////////////////

    fn add_snake(&mut self) {
        let row = (self.grid.rows() / 2) as i32;

        for col in INITIAL_SNAKE_COLS.iter() {
            self.add_head(Position::new(row, *col));
        }
    }

    fn add_food(&mut self) {
        let empty = self.grid.empty_positions();

        match empty.choose(&mut self.rng) {
            Some(pos) => {
                self.grid.set(*pos, Cell::Food);
                debug!("food placed at {:?}", pos);
            }
            None => debug!("no empty cell left for food"),
        }
    }

    fn add_head(&mut self, pos: Position) {
        self.body.push_front(pos);
        self.grid.set(pos, Cell::Snake);
    }

    fn remove_tail(&mut self) -> Position {
        let tail = self.tail_position();
        self.grid.set(tail, Cell::Empty);
        self.body.pop_back();
        tail
    }

    fn last_direction(&self) -> Direction {
        self.turns.back().copied().unwrap_or(self.direction)
    }

    fn can_change_direction(&self, dir: Direction) -> bool {
        if self.turns.len() >= MAX_PENDING_TURNS {
            return false;
        }

        let last = self.last_direction();
        dir != last && !dir.is_opposite(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    fn food_cells<R: Rng>(engine: &Engine<R>) -> Vec<Position> {
        engine.grid().positions().filter(|p| engine.cell(*p) == Cell::Food).collect()
    }

    /// Moves the only food item to `pos`.
    fn put_food(engine: &mut Engine, pos: Position) {
        clear_food(engine);
        engine.grid.set(pos, Cell::Food);
    }

    fn clear_food(engine: &mut Engine) {
        for old in food_cells(&*engine) {
            engine.grid.set(old, Cell::Empty);
        }
    }

    fn assert_body_matches_grid(engine: &Engine) {
        let body: Vec<Position> = engine.snake_positions().collect();
        for pos in &body {
            assert_eq!(engine.cell(*pos), Cell::Snake, "{:?} should be snake", pos);
        }
        let snake_cells = engine.grid().count(Cell::Snake);
        assert_eq!(snake_cells, body.len());
    }

    #[test]
    fn initial_state_on_15x15() {
        let engine = Engine::seeded(15, 15, 1);

        let body: Vec<Position> = engine.snake_positions().collect();
        assert_eq!(body, vec![Position::new(7, 3), Position::new(7, 2), Position::new(7, 1)]);
        assert_eq!(engine.head_position(), Position::new(7, 3));
        assert_eq!(engine.tail_position(), Position::new(7, 1));
        assert_eq!(engine.direction(), Right);
        assert_eq!(engine.score(), 0);
        assert!(!engine.is_game_over());

        let food = food_cells(&engine);
        assert_eq!(food.len(), 1);
        assert!(!body.contains(&food[0]));
        assert_body_matches_grid(&engine);
    }

    #[test]
    fn single_row_grid_is_valid() {
        let engine = Engine::seeded(1, 4, 9);
        assert_eq!(engine.head_position(), Position::new(0, 3));
        assert_eq!(food_cells(&engine), vec![Position::new(0, 0)]);
    }

    #[test]
    fn move_into_empty_cell_keeps_length() {
        let mut engine = Engine::seeded(5, 5, 3);
        clear_food(&mut engine);
        assert_eq!(engine.head_position(), Position::new(2, 3));

        let result = engine.move_snake();

        assert_eq!(
            result,
            MoveResult::Moved { new_head: Position::new(2, 4), old_tail: Position::new(2, 1) }
        );
        assert_eq!(engine.head_position(), Position::new(2, 4));
        assert_eq!(engine.cell(Position::new(2, 1)), Cell::Empty);
        assert_eq!(engine.snake_len(), 3);
        assert_eq!(engine.score(), 0);
        assert!(!engine.is_game_over());
        assert_body_matches_grid(&engine);
    }

    #[test]
    fn wall_hit_ends_game_and_freezes_state() {
        let mut engine = Engine::seeded(5, 5, 3);
        clear_food(&mut engine);

        assert!(matches!(engine.move_snake(), MoveResult::Moved { .. }));
        assert_eq!(engine.move_snake(), MoveResult::Crashed { at: Position::new(2, 5) });
        assert!(engine.is_game_over());

        let grid = engine.grid().clone();
        let body: Vec<Position> = engine.snake_positions().collect();

        assert_eq!(engine.move_snake(), MoveResult::Halted);
        engine.change_direction(Up);
        assert_eq!(engine.move_snake(), MoveResult::Halted);

        assert_eq!(engine.grid(), &grid);
        assert_eq!(engine.snake_positions().collect::<Vec<_>>(), body);
        assert_eq!(engine.direction(), Right);
        assert!(engine.pending_directions().is_empty());
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut engine = Engine::seeded(10, 10, 5);
        put_food(&mut engine, Position::new(5, 4));

        let result = engine.move_snake();

        assert_eq!(result, MoveResult::Ate { new_head: Position::new(5, 4) });
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.snake_len(), 4);
        assert_eq!(engine.tail_position(), Position::new(5, 1));

        let food = food_cells(&engine);
        assert_eq!(food.len(), 1);
        assert_ne!(food[0], Position::new(5, 4));
        assert_body_matches_grid(&engine);
    }

    #[test]
    fn eating_last_free_cell_places_no_food() {
        let mut engine = Engine::seeded(1, 5, 0);
        put_food(&mut engine, Position::new(0, 4));

        assert_eq!(engine.move_snake(), MoveResult::Ate { new_head: Position::new(0, 4) });
        assert_eq!(engine.snake_len(), 4);
        assert_eq!(food_cells(&engine), vec![Position::new(0, 0)]);
        assert!(!engine.is_full());

        // Turn the body around by hand so the head faces the last free cell.
        engine.body.clear();
        for col in [4, 3, 2, 1] {
            engine.body.push_front(Position::new(0, col));
        }
        engine.direction = Left;

        assert_eq!(engine.move_snake(), MoveResult::Ate { new_head: Position::new(0, 0) });
        assert!(engine.is_full());
        assert!(food_cells(&engine).is_empty());
        assert!(!engine.is_game_over());
        assert_eq!(engine.score(), 2);
        assert_body_matches_grid(&engine);
    }

    #[test]
    fn food_on_last_free_cell_is_not_full() {
        let mut engine = Engine::seeded(1, 5, 0);
        put_food(&mut engine, Position::new(0, 4));

        engine.move_snake();

        assert_eq!(engine.grid().count(Cell::Empty), 0);
        assert_eq!(food_cells(&engine).len(), 1);
        assert!(!engine.is_full());
    }

    #[test]
    fn head_may_follow_its_tail() {
        // A 2x2 loop: the head steps into the cell the tail leaves.
        let mut engine = Engine::seeded(4, 4, 2);
        clear_food(&mut engine);

        for pos in engine.body.drain(..).collect::<Vec<_>>() {
            engine.grid.set(pos, Cell::Empty);
        }
        // head (1,1), then (0,1), (0,0), tail (1,0)
        for pos in [Position::new(1, 0), Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)] {
            engine.add_head(pos);
        }
        engine.direction = Left;

        assert_eq!(engine.will_hit(Position::new(1, 0)), Cell::Empty);
        assert_eq!(
            engine.move_snake(),
            MoveResult::Moved { new_head: Position::new(1, 0), old_tail: Position::new(1, 0) }
        );
        assert!(!engine.is_game_over());
        assert_body_matches_grid(&engine);
    }

    #[test]
    fn running_into_body_ends_game() {
        let mut engine = Engine::seeded(10, 10, 4);
        clear_food(&mut engine);
        // Grow to length 5 so a tight loop bites the body, not the tail.
        put_food(&mut engine, Position::new(5, 4));
        engine.move_snake();
        put_food(&mut engine, Position::new(5, 5));
        engine.move_snake();
        clear_food(&mut engine);
        assert_eq!(engine.snake_len(), 5);

        engine.change_direction(Down);
        engine.move_snake();
        engine.change_direction(Left);
        engine.move_snake();
        engine.change_direction(Up);

        assert_eq!(engine.will_hit(Position::new(5, 4)), Cell::Snake);
        assert_eq!(engine.move_snake(), MoveResult::Crashed { at: Position::new(5, 4) });
        assert!(engine.is_game_over());
    }

    #[test]
    fn reversal_right_after_start_is_ignored() {
        let mut engine = Engine::seeded(15, 15, 7);
        clear_food(&mut engine);

        engine.change_direction(Left);
        assert!(engine.pending_directions().is_empty());

        engine.move_snake();
        assert_eq!(engine.direction(), Right);
        assert_eq!(engine.head_position(), Position::new(7, 4));
    }

    #[test]
    fn same_direction_is_ignored() {
        let mut engine = Engine::seeded(15, 15, 7);
        engine.change_direction(Right);
        assert!(engine.pending_directions().is_empty());
    }

    #[test]
    fn queue_holds_at_most_two_turns() {
        let mut engine = Engine::seeded(15, 15, 7);
        clear_food(&mut engine);

        engine.change_direction(Up);
        engine.change_direction(Left);
        engine.change_direction(Down);

        assert_eq!(engine.pending_directions(), vec![Up, Left]);

        engine.move_snake();
        assert_eq!(engine.direction(), Up);
        assert_eq!(engine.head_position(), Position::new(6, 3));

        engine.move_snake();
        assert_eq!(engine.direction(), Left);
        assert_eq!(engine.head_position(), Position::new(6, 2));
        assert!(engine.pending_directions().is_empty());
    }

    #[test]
    fn validation_uses_last_queued_turn() {
        let mut engine = Engine::seeded(15, 15, 7);

        engine.change_direction(Up);
        // Down reverses the queued Up, Up repeats it.
        engine.change_direction(Down);
        engine.change_direction(Up);
        assert_eq!(engine.pending_directions(), vec![Up]);

        // Left is fine after Up even though it reverses the current Right.
        engine.change_direction(Left);
        assert_eq!(engine.pending_directions(), vec![Up, Left]);
    }

    #[test]
    fn seeded_engines_agree() {
        let a = Engine::seeded(12, 9, 42);
        let b = Engine::seeded(12, 9, 42);
        assert_eq!(a.grid(), b.grid());
    }
}
