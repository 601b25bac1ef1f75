use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use snake::{Cell, Direction::{self, *}, Engine, MoveResult, Position};

use crate::config::Config;
use crate::term::TermManager;
use crate::{Coords, TermInt};

const COUNTDOWN_FROM: u32 = 3;
const COUNTDOWN_STEP_MS: u64 = 500;
const DEAD_SEGMENT_MS: u64 = 50;
const GAME_OVER_PAUSE_MS: u64 = 1000;

const EMPTY_CELL: [char; 2] = [' ', ' '];
const SNAKE_BODY_CELL: [char; 2] = ['█', '█'];
const FOOD_CELL: [char; 2] = ['O', ' '];
const DEAD_HEAD_CELL: [char; 2] = ['X', 'X'];
const DEAD_BODY_CELL: [char; 2] = ['x', 'x'];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum KeyAction {
    Turn(Direction),
    Pause,
    Quit,
    Other,
}

pub struct SnakeGame {
    config: Config,
    term: TermManager,
    origin: Coords,
    paused: bool,
    seeds: Option<StdRng>,
    round: u32,
}

impl SnakeGame {
    pub fn new(config: Config) -> Result<Self> {
        let term = TermManager::new()?;
        let terminal_size = term.get_terminal_size();
        config.validate(terminal_size)?;

        // validate() guarantees the board fits, so both sizes fit a TermInt
        let (board_w, board_h) = config.board_size();
        let origin = (
            (terminal_size.0 - board_w as TermInt) / 2,
            (terminal_size.1 - board_h as TermInt) / 2,
        );
        let seeds = config.seed.map(StdRng::seed_from_u64);

        Ok(SnakeGame { config, term, origin, paused: false, seeds, round: 0 })
    }

    /// Plays rounds until the player quits.
    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;

        if self.show_intro()? {
            while self.play()? {}
        }

        info!("quitting after {} round(s)", self.round);
        self.term.restore()
    }

    fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc to pause",
            "CTRL+C to quit",
            "",
            "Press any key to begin"
        ];

        self.term.show_message(lines)?;
        let key = self.term.read_key_blocking()?;
        self.term.hide_message()?;

        Ok(!is_ctrl_c(&key))
    }

    /// One round from countdown to game over. Returns false when the player
    /// asked to quit.
    fn play(&mut self) -> Result<bool> {
        let mut engine = self.new_engine();
        self.paused = false;

        self.term.clear()?;
        let (board_w, board_h) = self.config.board_size();
        // The status line sits below the border
        self.term.draw_borders(self.origin, (board_w as TermInt, board_h as TermInt - 1))?;
        self.draw_board(&engine)?;

        if !self.countdown()? {
            return Ok(false);
        }

        let tick = Duration::from_millis(self.config.tick_ms);
        let mut next_tick = Instant::now() + tick;

        while !engine.is_game_over() && !engine.is_full() {
            let now = Instant::now();
            if now < next_tick {
                if let Some(key) = self.term.wait_key(next_tick - now)? {
                    match key_action(&key) {
                        KeyAction::Quit => return Ok(false),
                        KeyAction::Pause => self.toggle_pause()?,
                        KeyAction::Turn(dir) if !self.paused => engine.change_direction(dir),
                        _ => {}
                    }
                }
                continue;
            }

            next_tick = now + tick;
            if self.paused { continue; }

            let result = engine.move_snake();
            self.draw_update(&engine, &result)?;
        }

        let won = !engine.is_game_over();
        info!("round {} over, score {}, won: {}", self.round, engine.score(), won);
        self.game_over(&engine, won)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn new_engine(&mut self) -> Engine {
        self.round += 1;
        let (rows, cols) = (self.config.rows as usize, self.config.cols as usize);

        match self.seeds.as_mut() {
            Some(seeds) => {
                let seed = seeds.gen();
                debug!("round {} seed {}", self.round, seed);
                Engine::seeded(rows, cols, seed)
            }
            None => Engine::new(rows, cols),
        }
    }

    fn countdown(&mut self) -> Result<bool> {
        for i in (1..=COUNTDOWN_FROM).rev() {
            self.term.show_message(&[i.to_string().as_str()])?;
            if !self.idle(Duration::from_millis(COUNTDOWN_STEP_MS))? {
                return Ok(false);
            }
        }

        self.term.hide_message()?;
        // Keys hit during the countdown are not turns
        self.term.read_key_events_queue()?;
        Ok(true)
    }

    fn game_over(&mut self, engine: &Engine, win: bool) -> Result<bool> {
        if !win {
            for (i, pos) in engine.snake_positions().enumerate() {
                let glyph = if i == 0 {DEAD_HEAD_CELL} else {DEAD_BODY_CELL};
                self.draw_cell(pos, glyph)?;
                self.term.flush()?;
                if !self.idle(Duration::from_millis(DEAD_SEGMENT_MS))? {
                    return Ok(false);
                }
            }
        }

        if !self.idle(Duration::from_millis(GAME_OVER_PAUSE_MS))? {
            return Ok(false);
        }

        let s = if win {"You won!"} else {"Game over!"};
        self.term.show_message(&[
            s,
            &*format!("Score: {}", engine.score()),
            "",
            "PRESS ANY KEY TO TRY AGAIN",
            "or CTRL+C to quit."
        ])?;

        let key = self.term.read_key_blocking()?;
        self.term.hide_message()?;
        Ok(!is_ctrl_c(&key))
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }

    /// Sleeps for `dur`, swallowing keys. Returns false on Ctrl+C.
    fn idle(&mut self, dur: Duration) -> Result<bool> {
        let deadline = Instant::now() + dur;

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(true);
            }
            if let Some(key) = self.term.wait_key(deadline - now)? {
                if is_ctrl_c(&key) {
                    return Ok(false);
                }
            }
        }
    }

    fn draw_board(&mut self, engine: &Engine) -> Result<()> {
        for pos in engine.grid().positions() {
            let glyph = match engine.cell(pos) {
                Cell::Snake => SNAKE_BODY_CELL,
                Cell::Food => FOOD_CELL,
                Cell::Empty | Cell::Outside => EMPTY_CELL,
            };
            self.draw_cell(pos, glyph)?;
        }

        self.draw_cell(engine.head_position(), head_cell(engine.direction()))?;
        self.draw_score(engine.score())?;
        self.term.flush()
    }

    fn draw_update(&mut self, engine: &Engine, result: &MoveResult) -> Result<()> {
        match result {
            MoveResult::Moved { new_head, old_tail } => {
                self.draw_cell(*old_tail, EMPTY_CELL)?;
                if let Some(neck) = engine.snake_positions().nth(1) {
                    self.draw_cell(neck, SNAKE_BODY_CELL)?;
                }
                self.draw_cell(*new_head, head_cell(engine.direction()))?;
                self.term.flush()
            }
            // New food shows up somewhere, repaint everything
            MoveResult::Ate { .. } => self.draw_board(engine),
            MoveResult::Crashed { .. } | MoveResult::Halted => Ok(()),
        }
    }

    fn draw_cell(&mut self, pos: Position, glyph: [char; 2]) -> Result<()> {
        let x = self.origin.0 + 1 + pos.col as TermInt * 2;
        let y = self.origin.1 + 1 + pos.row as TermInt;
        self.term.print_at((x, y), glyph[0])?;
        self.term.print_at((x + 1, y), glyph[1])
    }

    fn draw_score(&mut self, score: u32) -> Result<()> {
        let y = self.origin.1 + self.config.board_size().1 as TermInt - 1;
        self.term.print_str_at((self.origin.0, y), &format!("SCORE {}", score))
    }
}

fn head_cell(dir: Direction) -> [char; 2] {
    match dir {
        Up => ['^', '^'],
        Down => ['v', 'v'],
        Left => ['<', '<'],
        Right => ['>', '>'],
    }
}

fn key_action(ev: &KeyEvent) -> KeyAction {
    match ev {
        ev if is_ctrl_c(ev) => KeyAction::Quit,
        KeyEvent { code, modifiers: _ } => match code {
            KeyCode::Char('w') | KeyCode::Up => KeyAction::Turn(Up),
            KeyCode::Char('a') | KeyCode::Left => KeyAction::Turn(Left),
            KeyCode::Char('s') | KeyCode::Down => KeyAction::Turn(Down),
            KeyCode::Char('d') | KeyCode::Right => KeyAction::Turn(Right),
            KeyCode::Esc => KeyAction::Pause,
            _ => KeyAction::Other,
        }
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
