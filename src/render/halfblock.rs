use crate::render::{begin_sync, draw_overlay_popup, end_sync, write_hud, Frame, Renderer};
use std::io::Write;

/// Truecolor `▀` cells: foreground is the upper pixel, background the lower.
pub struct HalfBlockRenderer {
    last_fg: Option<[u8; 3]>,
    last_bg: Option<[u8; 3]>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "half-block"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (1, 2)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        let need = w.saturating_mul(h).saturating_mul(4);
        if w != cols || h != visual_rows * 2 || frame.pixels_rgba.len() < need {
            log::warn!(
                "half-block frame mismatch: {}x{} px for {}x{} cells, {} bytes",
                w,
                h,
                cols,
                visual_rows,
                frame.pixels_rgba.len()
            );
            return Ok(());
        }

        begin_sync(out, frame)?;
        // Home, reset, autowrap off while painting full-width rows.
        out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        let px = |x: usize, y: usize| -> [u8; 3] {
            let i = (y * w + x) * 4;
            [frame.pixels_rgba[i], frame.pixels_rgba[i + 1], frame.pixels_rgba[i + 2]]
        };

        for row in 0..visual_rows {
            // Absolute positioning: a trailing newline on the last row would scroll.
            write!(out, "\x1b[{};1H", row + 1)?;
            for x in 0..cols {
                let top = px(x, row * 2);
                let bot = px(x, row * 2 + 1);
                if self.last_fg != Some(top) {
                    write!(out, "\x1b[38;2;{};{};{}m", top[0], top[1], top[2])?;
                    self.last_fg = Some(top);
                }
                if self.last_bg != Some(bot) {
                    write!(out, "\x1b[48;2;{};{};{}m", bot[0], bot[1], bot[2])?;
                    self.last_bg = Some(bot);
                }
                out.write_all("\u{2580}".as_bytes())?;
            }
        }

        write_hud(out, frame)?;
        if let Some(text) = frame.overlay {
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
        }

        out.write_all(b"\x1b[?7h")?;
        end_sync(out, frame)?;
        out.flush()?;
        Ok(())
    }
}
