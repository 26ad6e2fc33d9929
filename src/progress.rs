//! Terminal view for the interactive variant.
//!
//! The bar is cosmetic: it fills on a timer and says nothing about work done.
//! The only link to the pool is the [`StopSignal`] it cancels on quit.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveDown, MoveToColumn, MoveUp, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, PrintStyledContent, Stylize},
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use log::{debug, warn};

use crate::stop_signal::StopSignal;

pub const TICK: Duration = Duration::from_millis(100);
pub const PADDING: usize = 2;
pub const MAX_WIDTH: usize = 80;

const STEP: f64 = 0.25;
const TEXT: Color = Color::Rgb { r: 0x5a, g: 0x56, b: 0xe0 };
const HELP: Color = Color::Rgb { r: 0x62, g: 0x62, b: 0x62 };
const GRADIENT: [(u8, u8, u8); 2] = [(0x5a, 0x56, 0xe0), (0xee, 0x6f, 0xf8)];

/// Bar width for a terminal `columns` wide, capped at [`MAX_WIDTH`].
pub fn bar_width(columns: u16) -> usize {
    (columns as usize)
        .saturating_sub(PADDING * 2 + 4)
        .min(MAX_WIDTH)
}

/// `q` or ctrl+c. Raw mode swallows SIGINT, so ctrl+c arrives as a key.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn gradient(i: usize, width: usize) -> Color {
    let t = if width > 1 {
        i as f64 / (width - 1) as f64
    } else {
        0.0
    };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    let ((r0, g0, b0), (r1, g1, b1)) = (GRADIENT[0], GRADIENT[1]);
    Color::Rgb {
        r: mix(r0, r1),
        g: mix(g0, g1),
        b: mix(b0, b1),
    }
}

pub struct ProgressView {
    workers: usize,
    percent: f64,
    width: usize,
}

impl ProgressView {
    pub fn new(workers: usize, columns: u16) -> Self {
        Self {
            workers,
            percent: 0.0,
            width: bar_width(columns),
        }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn resize(&mut self, columns: u16) {
        self.width = bar_width(columns);
    }

    pub fn tick(&mut self) {
        self.percent = (self.percent + STEP).min(1.0);
    }

    fn filled(&self) -> usize {
        (self.percent * self.width as f64).round() as usize
    }

    pub fn bar(&self) -> String {
        let filled = self.filled();
        format!("{}{}", "█".repeat(filled), "░".repeat(self.width - filled))
    }

    pub fn help(&self) -> String {
        format!("Using {} workers. Press q or ctrl+c to quit", self.workers)
    }

    /// Apply one terminal event. Quit keys cancel `stop`.
    pub fn handle(&mut self, event: &Event, stop: &StopSignal) {
        match event {
            Event::Key(key) if is_quit_key(key) => {
                debug!("Quit key pressed");
                stop.cancel();
            }
            Event::Resize(columns, _) => self.resize(*columns),
            _ => {}
        }
    }

    fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let filled = self.filled();
        queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::UntilNewLine),
            PrintStyledContent("Stressing CPUs".with(TEXT)),
            Print(" ".repeat(PADDING))
        )?;
        for i in 0..self.width {
            let cell = if i < filled { "█" } else { "░" };
            queue!(out, PrintStyledContent(cell.with(gradient(i, self.width))))?;
        }
        out.flush()
    }
}

/// Wait up to `timeout` for the next terminal event.
pub fn terminal_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Width of the controlling terminal, or room for a full bar if unknown.
pub fn terminal_columns() -> u16 {
    match terminal::size() {
        Ok((columns, _)) => columns,
        Err(e) => {
            debug!("Terminal size unavailable: {}", e);
            (MAX_WIDTH + PADDING * 2 + 4) as u16
        }
    }
}

/// Redraw every `tick` until `stop` is cancelled, feeding events from
/// `next_event` into the view between frames.
pub fn run<W, E>(
    view: &mut ProgressView,
    stop: &StopSignal,
    tick: Duration,
    out: &mut W,
    mut next_event: E,
) -> io::Result<()>
where
    W: Write,
    E: FnMut(Duration) -> io::Result<Option<Event>>,
{
    let pad = " ".repeat(PADDING);
    queue!(
        out,
        Print("\r\n\r\n\r\n"),
        Print(&pad),
        PrintStyledContent(view.help().with(HELP)),
        MoveUp(2)
    )?;

    let mut last_tick = Instant::now();
    loop {
        view.draw(out)?;
        if stop.is_cancelled() {
            break;
        }

        let remaining = tick.saturating_sub(last_tick.elapsed());
        if let Some(event) = next_event(remaining)? {
            view.handle(&event, stop);
        }
        if last_tick.elapsed() >= tick {
            view.tick();
            last_tick = Instant::now();
        }
    }

    execute!(out, MoveDown(2), Print("\r\n"))
}

/// Raw mode with a hidden cursor for as long as this lives.
pub struct RawTerminal(());

impl RawTerminal {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = Self(());
        execute!(io::stdout(), Hide).context("Failed to hide cursor")?;
        Ok(guard)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show);
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to disable raw mode: {}", e);
        }
    }
}
