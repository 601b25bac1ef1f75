use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;

use crate::Coords;

/// Snake on a grid, in the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "snake", version, about)]
pub struct Config {
    /// Grid height in cells
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u16).range(1..))]
    pub rows: u16,

    /// Grid width in cells (the starting snake needs at least 4)
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u16).range(4..))]
    pub cols: u16,

    /// Milliseconds between snake moves
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Terminal columns and lines the board needs: two characters per cell,
    /// a border all around and a status line under it.
    ///
    /// Widened to `u32` so oversized grids are rejected rather than wrapped.
    pub fn board_size(&self) -> (u32, u32) {
        (u32::from(self.cols) * 2 + 2, u32::from(self.rows) + 3)
    }

    pub fn validate(&self, terminal_size: Coords) -> Result<()> {
        ensure!(self.rows >= 1 && self.cols >= 4, "grid must be at least 1x4, got {}x{}", self.rows, self.cols);

        let (need_w, need_h) = self.board_size();
        let (have_w, have_h) = (u32::from(terminal_size.0), u32::from(terminal_size.1));
        ensure!(
            need_w <= have_w && need_h <= have_h,
            "a {}x{} grid needs a {}x{} terminal, this one is {}x{}",
            self.rows, self.cols, need_w, need_h, have_w, have_h
        );

        Ok(())
    }
}
