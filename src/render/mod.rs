mod halfblock;
mod kitty;

pub use halfblock::HalfBlockRenderer;
pub use kitty::KittyRenderer;

use std::io::Write;

pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    /// Pixels per terminal cell (columns, rows) this renderer expects.
    fn cell_pixels(&self) -> (usize, usize);
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

pub(crate) fn begin_sync(out: &mut dyn Write, frame: &Frame<'_>) -> std::io::Result<()> {
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    Ok(())
}

pub(crate) fn end_sync(out: &mut dyn Write, frame: &Frame<'_>) -> std::io::Result<()> {
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    Ok(())
}

/// Writes the HUD text into the rows below the visual area, clearing rows
/// that have no text. Lines are cut to `cols` characters.
pub(crate) fn write_hud(out: &mut dyn Write, frame: &Frame<'_>) -> anyhow::Result<()> {
    let cols = frame.term_cols as usize;
    let mut lines = frame.hud.lines();
    for i in 0..(frame.hud_rows as usize) {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", frame.visual_rows as usize + i + 1)?;
        if let Some(line) = lines.next() {
            let cut: String = line.chars().take(cols).collect();
            out.write_all(cut.as_bytes())?;
        }
    }
    Ok(())
}

/// Centered box over a dimmed backdrop. The first text line is drawn as a title.
pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if cols < 8 || rows < 4 {
        return Ok(());
    }

    let max_inner_w = cols.saturating_sub(6).max(1);
    let lines = wrap_lines(text, max_inner_w);
    if lines.is_empty() {
        return Ok(());
    }

    let inner_w = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(1, max_inner_w);
    let box_w = (inner_w + 4).min(cols.saturating_sub(2)).max(4);
    let inner_w = box_w.saturating_sub(4);
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = (body_h + 2).min(rows.saturating_sub(1)).max(3);

    let start_col = cols.saturating_sub(box_w) / 2 + 1;
    let start_row = rows.saturating_sub(box_h) / 2 + 1;

    let horiz = "-".repeat(box_w.saturating_sub(2));
    let blank = " ".repeat(inner_w);

    // EL2 per row instead of a row of spaces avoids edge-wrap artifacts.
    out.write_all(b"\x1b[0m\x1b[38;2;210;220;235m\x1b[48;2;2;3;8m")?;
    for row in 1..=rows {
        write!(out, "\x1b[{};1H\x1b[2K", row)?;
    }

    out.write_all(b"\x1b[0m\x1b[38;2;232;240;255m\x1b[48;2;8;12;22m")?;
    write!(out, "\x1b[{};{}H+{}+", start_row, start_col, horiz)?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = start_row + 1 + i;
        write!(out, "\x1b[{};{}H| {} |", row, start_col, blank)?;
        if i == 0 {
            write!(
                out,
                "\x1b[{};{}H\x1b[1m\x1b[38;2;150;230;255m{}\x1b[22m\x1b[38;2;232;240;255m",
                row,
                start_col + 2,
                line
            )?;
        } else {
            write!(out, "\x1b[{};{}H{}", row, start_col + 2, line)?;
        }
    }
    write!(out, "\x1b[{};{}H+{}+", start_row + box_h - 1, start_col, horiz)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}

/// Hard-wraps each line at `width` characters; empty lines are kept.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
    }
    lines
}
