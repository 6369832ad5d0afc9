use crate::render::{begin_sync, draw_overlay_popup, end_sync, write_hud, Frame, Renderer};
use anyhow::Context;
use base64::Engine;
use std::io::Write;

/// Raw RGBA bytes per APC chunk; 3072 encodes to exactly 4096 base64 bytes.
const RAW_CHUNK: usize = 3 * 1024;

/// Kitty graphics protocol with direct (in-band base64) transmission. One
/// image id is reused for every frame so long sessions don't pile up images.
pub struct KittyRenderer {
    image_id: u32,
    placement_id: u32,
    b64_buf: Vec<u8>,
    overlay_visible_last: bool,
    last_hud_rows: u16,
}

impl KittyRenderer {
    pub fn new() -> Self {
        Self {
            image_id: 1,
            placement_id: 1,
            b64_buf: Vec::new(),
            overlay_visible_last: false,
            last_hud_rows: 0,
        }
    }

    fn delete_image(&self, out: &mut dyn Write) -> std::io::Result<()> {
        write!(out, "\x1b_Ga=d,d=I,i={}\x1b\\", self.image_id)
    }
}

impl Default for KittyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for KittyRenderer {
    fn name(&self) -> &'static str {
        "kitty"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (2, 4)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if frame.pixels_rgba.len() < w.saturating_mul(h).saturating_mul(4) {
            log::warn!(
                "kitty frame buffer too small for {}x{}: {} bytes",
                w,
                h,
                frame.pixels_rgba.len()
            );
            return Ok(());
        }

        begin_sync(out, frame)?;

        if let Some(text) = frame.overlay {
            // The image is placed under text (z=-1) and shows through the
            // popup's blank cells, so it is removed while the popup is up.
            self.delete_image(out)?;
            clear_text_rows(out, frame.term_rows as usize)?;
            write_hud(out, frame)?;
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
            self.overlay_visible_last = true;
            self.last_hud_rows = frame.hud_rows;
            end_sync(out, frame)?;
            out.flush()?;
            return Ok(());
        }

        out.write_all(b"\x1b[H")?;
        write_direct_rgba(
            out,
            &frame.pixels_rgba[..w * h * 4],
            (w, h),
            (cols, visual_rows),
            (self.image_id, self.placement_id),
            &mut self.b64_buf,
        )?;

        if frame.hud_rows != self.last_hud_rows {
            clear_text_rows(out, frame.term_rows as usize)?;
        } else if self.overlay_visible_last {
            clear_text_rows(out, visual_rows)?;
        }
        write_hud(out, frame)?;

        self.overlay_visible_last = false;
        self.last_hud_rows = frame.hud_rows;

        end_sync(out, frame)?;
        out.flush()?;
        Ok(())
    }
}

/// Transmits and places `rgba` in one `a=T` command split into `m=1` chunks.
pub fn write_direct_rgba(
    out: &mut dyn Write,
    rgba: &[u8],
    (w, h): (usize, usize),
    (cols, rows): (usize, usize),
    (image_id, placement_id): (u32, u32),
    b64_buf: &mut Vec<u8>,
) -> anyhow::Result<()> {
    if rgba.is_empty() {
        return Ok(());
    }

    let total = rgba.len().div_ceil(RAW_CHUNK);
    for (i, chunk) in rgba.chunks(RAW_CHUNK).enumerate() {
        let b64_len = chunk.len().div_ceil(3) * 4;
        if b64_buf.len() < b64_len {
            b64_buf.resize(b64_len, 0);
        }
        let written = base64::engine::general_purpose::STANDARD
            .encode_slice(chunk, &mut b64_buf[..b64_len])
            .context("base64 encode pixels")?;

        let more = u8::from(i + 1 < total);
        if i == 0 {
            write!(
                out,
                "\x1b_Ga=T,f=32,s={},v={},t=d,i={},p={},c={},r={},C=1,q=2,z=-1,m={};",
                w, h, image_id, placement_id, cols, rows, more
            )?;
        } else {
            write!(out, "\x1b_Gm={};", more)?;
        }
        out.write_all(&b64_buf[..written])?;
        out.write_all(b"\x1b\\")?;
    }
    Ok(())
}

fn clear_text_rows(out: &mut dyn Write, rows: usize) -> anyhow::Result<()> {
    for row in 1..=rows {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", row)?;
    }
    Ok(())
}
