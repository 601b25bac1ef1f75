mod config;
mod game;
mod logger;
mod term;

use anyhow::Result;
use clap::Parser;

use config::Config;

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> Result<()> {
    let config = Config::parse();
    logger::init(config.log_file.as_deref())?;

    let mut game = game::SnakeGame::new(config)?;

    // The terminal is restored on every exit path, TermManager's Drop covers errors
    game.run()
}
