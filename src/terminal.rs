use anyhow::{bail, Context};
use crossterm::{
    cursor, event,
    terminal::{self, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Stdout, Write};

/// Smallest surface the viewer draws on: one visual row plus the HUD row.
pub const MIN_COLS: u16 = 4;
pub const MIN_ROWS: u16 = 2;

const TITLE: &str = "dot_grid";

/// Owns the viewer's terminal modes: raw input, the alternate screen, a
/// hidden cursor, the window title and focus reporting (the viewer pauses
/// its clock while unfocused). Everything is undone on drop, including the
/// render-time modes a frame may have left on.
pub struct TerminalGuard {
    focus_reporting: bool,
}

impl TerminalGuard {
    pub fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        let mut guard = Self {
            focus_reporting: false,
        };

        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)
            .context("enter alternate screen")?;
        out.execute(terminal::Clear(ClearType::All))
            .context("clear screen")?;
        out.execute(cursor::Hide).context("hide cursor")?;
        out.execute(terminal::SetTitle(TITLE)).context("set title")?;

        // Terminals without focus events just never send them.
        match out.execute(event::EnableFocusChange) {
            Ok(_) => guard.focus_reporting = true,
            Err(err) => log::warn!("focus reporting unavailable: {err}"),
        }

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }

    /// Current size, rejected when too small to hold a frame and the HUD.
    pub fn usable_size() -> anyhow::Result<(u16, u16)> {
        let size = terminal::size().context("get terminal size")?;
        check_min_size(size)
    }
}

pub fn check_min_size((cols, rows): (u16, u16)) -> anyhow::Result<(u16, u16)> {
    if cols < MIN_COLS || rows < MIN_ROWS {
        bail!("terminal too small (need at least {MIN_COLS}x{MIN_ROWS}, got {cols}x{rows})");
    }
    Ok((cols, rows))
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut out = stdout();
        // End synchronized output, re-enable autowrap, reset colors.
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        let _ = out.flush();
        if self.focus_reporting {
            let _ = out.execute(event::DisableFocusChange);
        }
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
    }
}
