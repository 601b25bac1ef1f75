use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

use crate::{Coords, TermInt};

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    active: bool,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None, active: false })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        self.active = true;
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
            .context("Error hiding cursor")?;
        Ok(())
    }

    /// Undoes `setup`. Safe to call more than once.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        terminal::disable_raw_mode().context("Error disabling raw mode")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read().context("Error reading key")? {
                return Ok(ev);
            }
        }
    }

    /// Drains every key event that is already waiting, without blocking.
    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0)).context("Error polling events")? {
            if let Event::Key(ev) = read().context("Error reading key")? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Waits up to `timeout` for the next key press.
    pub fn wait_key(&self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if poll(timeout).context("Error polling events")? {
            if let Event::Key(ev) = read().context("Error reading key")? {
                return Ok(Some(ev));
            }
        }
        Ok(None)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Draws a box whose outer corners are `top_left` and `top_left + size - 1`.
    pub fn draw_borders(&mut self, top_left: Coords, size: Coords) -> Result<()> {
        let (x0, y0) = top_left;
        let (width, height) = size;
        let end_x = x0 + width - 1;
        let end_y = y0 + height - 1;

        for x in x0..=end_x {
            let ch = if x == x0 || x == end_x {'+'} else {'-'};
            self.print_at((x, y0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in y0 + 1..end_y {
            self.print_at((x0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.len()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let (x, y) = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(ch) = self.saved(x, y) {
                    self.print_at_no_save((x, y), ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) -> Result<()> {
        self.print_at_no_save(pos, ch)?;
        if let Some(i) = self.screen_index(pos.0, pos.1) {
            self.screen[i] = ch;
        }
        Ok(())
    }

    pub fn print_str_at(&mut self, pos: Coords, s: &str) -> Result<()> {
        for (i, ch) in s.chars().enumerate() {
            self.print_at((pos.0 + i as TermInt, pos.1), ch)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
            .context("Error writing to terminal")?;
        Ok(())
    }

    fn screen_index(&self, x: TermInt, y: TermInt) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(self.width as usize * y as usize + x as usize)
        } else {
            None
        }
    }

    fn saved(&self, x: TermInt, y: TermInt) -> Option<char> {
        self.screen_index(x, y).map(|i| self.screen[i])
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        // Last resort if an error unwound past the game loop
        let _ = self.restore();
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: Coords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> Coords {
        self.top_left
    }
}
