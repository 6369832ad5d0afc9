use dot_grid::render::{draw_overlay_popup, wrap_lines, Frame, HalfBlockRenderer, KittyRenderer, Renderer};

/// Build a solid-color RGBA pixel buffer.
fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px.copy_from_slice(&[r, g, b, 255]);
    }
    buf
}

fn make_frame<'a>(
    cols: u16,
    rows: u16,
    visual_rows: u16,
    pw: usize,
    ph: usize,
    pixels: &'a [u8],
    hud: &'a str,
    overlay: Option<&'a str>,
) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: rows,
        visual_rows,
        pixel_width: pw,
        pixel_height: ph,
        pixels_rgba: pixels,
        hud,
        hud_rows: rows - visual_rows,
        overlay,
        sync_updates: true,
    }
}

fn render_to_string(r: &mut dyn Renderer, frame: &Frame<'_>) -> String {
    let mut out = Vec::new();
    r.render(frame, &mut out).expect("render");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn halfblock_paints_every_cell() {
    let px = solid_pixels(6, 8, 255, 0, 0);
    let frame = make_frame(6, 5, 4, 6, 8, &px, "hud", None);
    let mut r = HalfBlockRenderer::new();
    assert_eq!(r.cell_pixels(), (1, 2));
    let s = render_to_string(&mut r, &frame);
    assert_eq!(s.matches('\u{2580}').count(), 6 * 4);
    // Colors are only re-emitted on change.
    assert_eq!(s.matches("\x1b[38;2;255;0;0m").count(), 1);
    assert!(s.contains("hud"));
    assert!(s.starts_with("\x1b[?2026h"));
    assert!(s.ends_with("\x1b[?2026l"));
    assert!(s.contains("\x1b[?7l") && s.contains("\x1b[?7h"));
}

#[test]
fn halfblock_splits_upper_and_lower_pixels() {
    let mut px = solid_pixels(1, 2, 10, 20, 30);
    px[4..8].copy_from_slice(&[40, 50, 60, 255]);
    let frame = make_frame(1, 1, 1, 1, 2, &px, "", None);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("\x1b[38;2;10;20;30m"));
    assert!(s.contains("\x1b[48;2;40;50;60m"));
}

#[test]
fn halfblock_ignores_mismatched_frames() {
    let px = solid_pixels(4, 4, 1, 2, 3);
    let frame = make_frame(6, 3, 2, 4, 4, &px, "", None);
    assert!(render_to_string(&mut HalfBlockRenderer::new(), &frame).is_empty());

    let frame = make_frame(0, 0, 0, 0, 0, &[], "", None);
    assert!(render_to_string(&mut HalfBlockRenderer::new(), &frame).is_empty());
}

#[test]
fn halfblock_hud_is_cut_to_width() {
    let px = solid_pixels(4, 2, 0, 0, 0);
    let frame = make_frame(4, 2, 1, 4, 2, &px, "abcdefgh\nzz", None);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("abcd"));
    assert!(!s.contains("abcde"));
    assert!(!s.contains("zz"));
}

#[test]
fn kitty_small_frame_is_one_command() {
    let px = solid_pixels(8, 8, 0, 255, 0);
    let frame = make_frame(4, 3, 2, 8, 8, &px, "", None);
    let mut r = KittyRenderer::new();
    assert_eq!(r.cell_pixels(), (2, 4));
    let s = render_to_string(&mut r, &frame);
    assert!(s.contains("\x1b_Ga=T,f=32,s=8,v=8,t=d,i=1,p=1,c=4,r=2,C=1,q=2,z=-1,m=0;"));
    assert_eq!(s.matches("\x1b_G").count(), 1);
    // Alternating 0x00/0xFF bytes encode as a repeating "AP8A/wD/".
    assert!(s.contains("AP8A/wD/AP8A/wD/"));
}

#[test]
fn kitty_large_frame_is_chunked() {
    let px = solid_pixels(64, 64, 9, 9, 9);
    let frame = make_frame(32, 17, 16, 64, 64, &px, "", None);
    let s = render_to_string(&mut KittyRenderer::new(), &frame);
    // 16384 bytes in 3072-byte chunks.
    assert!(s.contains(",m=1;"));
    assert_eq!(s.matches("\x1b_Gm=1;").count(), 4);
    assert_eq!(s.matches("\x1b_Gm=0;").count(), 1);
    for body in s.split("\x1b_G").skip(1).take(5) {
        let payload = body.split(';').nth(1).unwrap_or("");
        let payload = payload.split("\x1b\\").next().unwrap_or("");
        assert_eq!(payload.len(), 4096);
    }
}

#[test]
fn kitty_overlay_hides_image() {
    let px = solid_pixels(8, 8, 1, 1, 1);
    let frame = make_frame(20, 8, 6, 8, 8, &px, "hud", Some("Settings\n> Density"));
    let mut r = KittyRenderer::new();
    let s = render_to_string(&mut r, &frame);
    assert!(s.contains("\x1b_Ga=d,d=I,i=1\x1b\\"));
    assert!(!s.contains("a=T"));
    assert!(s.contains("Settings"));

    let frame = make_frame(20, 8, 6, 8, 8, &px, "hud", None);
    let s = render_to_string(&mut r, &frame);
    assert!(s.contains("a=T"));
}

#[test]
fn overlay_popup_draws_box_and_title() {
    let mut out = Vec::new();
    draw_overlay_popup(&mut out, 40, 10, "Title\nline one").expect("popup");
    let s = String::from_utf8(out).expect("utf8");
    assert!(s.contains("Title"));
    assert!(s.contains("line one"));
    assert!(s.contains("+--"));
}

#[test]
fn overlay_popup_skips_tiny_terminals_and_blank_text() {
    let mut out = Vec::new();
    draw_overlay_popup(&mut out, 6, 3, "Title").expect("popup");
    draw_overlay_popup(&mut out, 40, 10, "  \n ").expect("popup");
    assert!(out.is_empty());
}

#[test]
fn wrap_lines_counts_characters() {
    assert_eq!(wrap_lines("abcdef", 4), vec!["abcd", "ef"]);
    assert_eq!(wrap_lines("←→←→←", 2), vec!["←→", "←→", "←"]);
    assert_eq!(wrap_lines("a\n\nb", 10), vec!["a", "", "b"]);
}
