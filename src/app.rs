use crate::config::{Config, RendererMode};
use crate::params::{ParameterModel, SharedParams};
use crate::render::{wrap_lines, Frame, HalfBlockRenderer, KittyRenderer, Renderer};
use crate::settings::SettingsPanel;
use crate::terminal::TerminalGuard;
use crate::visual::DotGridEngine;
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, Instant};

/// Overlay and HUD toggles owned by the viewer loop.
#[derive(Clone, Debug)]
pub struct UiState {
    pub show_hud: bool,
    pub show_help: bool,
    pub settings: SettingsPanel,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            show_hud: true,
            show_help: false,
            settings: SettingsPanel::new(),
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    init_logging(cfg.log_file.as_deref())?;

    let mut model = cfg.initial_model();
    let shared = SharedParams::new(model.snapshot());
    log::info!(
        "starting: renderer={:?} fps={} pattern={}",
        cfg.renderer,
        cfg.fps,
        model.pattern().label()
    );

    let _term = TerminalGuard::enter()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Kitty => Box::new(KittyRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = renderer.cell_pixels();

    let mut last_size = TerminalGuard::usable_size()?;

    let mut ui = UiState::new();
    let mut hud_rows = hud_rows_for_size(last_size, ui.show_hud);
    let mut engine = DotGridEngine::new();
    resize_engine(&mut engine, last_size, px_w_mul, px_h_mul, hud_rows);

    let mut fps = FpsCounter::new();
    let mut last_engine_ms = 0.0f32;
    let mut last_render_ms = 0.0f32;

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    if handle_key(k.code, k.modifiers, &mut model, &mut ui) {
                        log::info!("quit requested");
                        return Ok(());
                    }
                    shared.store(model.snapshot());
                }
                Event::FocusLost => engine.pause(),
                Event::FocusGained => engine.resume(),
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    hud_rows = hud_rows_for_size(last_size, ui.show_hud);
                    resize_engine(&mut engine, last_size, px_w_mul, px_h_mul, hud_rows);
                }
                _ => {}
            }
        }

        // Resize events can be missed by some terminals.
        let sz = crossterm::terminal::size().context("get terminal size")?;
        if sz != last_size {
            last_size = sz;
            hud_rows = hud_rows_for_size(last_size, ui.show_hud);
            resize_engine(&mut engine, last_size, px_w_mul, px_h_mul, hud_rows);
        }

        let params = shared.load();
        let (term_cols, term_rows) = last_size;

        let hud = if ui.show_hud {
            build_hud(
                term_cols as usize,
                &model,
                engine.is_paused(),
                fps.fps(),
                last_engine_ms,
                last_render_ms,
                renderer.name(),
            )
        } else {
            String::new()
        };
        let target_hud_rows = hud_rows_for_text(term_rows, ui.show_hud, &hud);
        if target_hud_rows != hud_rows {
            hud_rows = target_hud_rows;
            resize_engine(&mut engine, last_size, px_w_mul, px_h_mul, hud_rows);
        }
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let (w, h) = engine.size();

        let engine_start = Instant::now();
        let pixels = engine.render(now, params);
        last_engine_ms = engine_start.elapsed().as_secs_f32() * 1000.0;

        let settings_text = ui.settings.is_open().then(|| ui.settings.text(&model));
        let overlay = match settings_text.as_deref() {
            Some(text) => Some(text),
            None if ui.show_help => Some(help_popup_text()),
            None => None,
        };

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: pixels,
            hud: &hud,
            hud_rows,
            overlay,
            sync_updates: cfg.sync_updates,
        };

        let render_start = Instant::now();
        renderer.render(&frame, &mut out)?;
        last_render_ms = render_start.elapsed().as_secs_f32() * 1000.0;
        fps.tick();

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

/// Applies one key press. Returns true when the viewer should quit.
pub fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    model: &mut ParameterModel,
    ui: &mut UiState,
) -> bool {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return true;
    }

    if ui.settings.is_open() {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('s') | KeyCode::Char('S') => {
                ui.settings.close()
            }
            KeyCode::Up => ui.settings.cursor_up(),
            KeyCode::Down => ui.settings.cursor_down(),
            KeyCode::Left => ui.settings.adjust(model, -1),
            KeyCode::Right => ui.settings.adjust(model, 1),
            KeyCode::Char(' ') => model.toggle_color(),
            _ => {}
        }
        return false;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        KeyCode::Left => model.prev_pattern(),
        KeyCode::Right => model.next_pattern(),
        KeyCode::Char('c') | KeyCode::Char('C') => model.toggle_color(),
        KeyCode::Char('i') | KeyCode::Char('I') => ui.show_hud = !ui.show_hud,
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            ui.show_help = !ui.show_help
        }
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Tab => {
            ui.settings.toggle();
            ui.show_help = false;
        }
        _ => {}
    }
    false
}

fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("install logger")?;
    Ok(())
}

fn resize_engine(
    engine: &mut DotGridEngine,
    size: (u16, u16),
    px_w_mul: usize,
    px_h_mul: usize,
    hud_rows: u16,
) {
    let (cols, rows) = size;
    let visual_rows = rows.saturating_sub(hud_rows).max(1);
    let w = (cols as usize).saturating_mul(px_w_mul);
    let h = (visual_rows as usize).saturating_mul(px_h_mul);
    engine.resize(w, h);
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud || size.1 <= 1 {
        return 0;
    }
    (size.1 - 1).min(2)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let wanted = hud.lines().count() as u16;
    wanted.min(term_rows.saturating_sub(1))
}

pub fn build_hud(
    cols: usize,
    model: &ParameterModel,
    paused: bool,
    fps: f32,
    engine_ms: f32,
    render_ms: f32,
    renderer_name: &str,
) -> String {
    let status = format!(
        "Pattern: {} | Speed: {:.2} | Density: {:.2} | Dot: {:.2} | Color: {} | FPS: {:>4.1}{} | ms(E/R): {:>4.1}/{:>4.1} | {}",
        model.pattern().label(),
        model.speed(),
        model.density(),
        model.dot_size(),
        if model.color_enabled() {
            format!("{:.2}", model.color_hue())
        } else {
            "off".to_string()
        },
        fps,
        if paused { " (paused)" } else { "" },
        engine_ms,
        render_ms,
        renderer_name,
    );
    let keys = "Keys: ←/→ pattern | s/tab settings | c color | i HUD | ? help | q quit";
    wrap_lines(&format!("{status}\n{keys}"), cols).join("\n")
}

fn help_popup_text() -> &'static str {
    "Dot Grid Hotkeys\n\
←/→  previous/next pattern (speed resets to the pattern default)\n\
c  toggle color / grayscale\n\
s or tab  open/close settings\n\
Settings keys:\n\
  up/down  select row\n\
  left/right  adjust value (pattern row cycles patterns)\n\
  space  toggle color\n\
  esc, s or tab  close settings\n\
i  show/hide HUD\n\
? or h or F1  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
