use crate::params::{ParameterModel, DENSITY_RANGE, DOT_SIZE_RANGE, SPEED_RANGE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingField {
    Pattern,
    Density,
    DotSize,
    Speed,
    Color,
    BloomIntensity,
    BloomRadius,
    Brightness,
}

impl SettingField {
    pub const fn all() -> [Self; 8] {
        [
            Self::Pattern,
            Self::Density,
            Self::DotSize,
            Self::Speed,
            Self::Color,
            Self::BloomIntensity,
            Self::BloomRadius,
            Self::Brightness,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pattern => "Pattern",
            Self::Density => "Density",
            Self::DotSize => "Dot Size",
            Self::Speed => "Speed",
            Self::Color => "Color",
            Self::BloomIntensity => "Bloom",
            Self::BloomRadius => "Bloom Radius",
            Self::Brightness => "Brightness",
        }
    }

    /// Increment for one Left/Right press. Pattern steps through the list.
    pub fn step(self) -> f32 {
        match self {
            Self::Pattern => 1.0,
            Self::Density | Self::DotSize | Self::Speed => 0.05,
            Self::Color => 0.02,
            Self::BloomIntensity | Self::BloomRadius | Self::Brightness => 0.1,
        }
    }
}

/// Cursor state of the settings overlay. Edits go straight to the model so
/// the panel never holds a second copy of any value.
#[derive(Clone, Debug, Default)]
pub struct SettingsPanel {
    open: bool,
    cursor: usize,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn field(&self) -> SettingField {
        let all = SettingField::all();
        all[self.cursor.min(all.len() - 1)]
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        self.cursor = (self.cursor + 1).min(SettingField::all().len() - 1);
    }

    /// Nudges the focused field by `dir` steps (negative means left).
    pub fn adjust(&self, model: &mut ParameterModel, dir: i32) {
        if dir == 0 {
            return;
        }
        let field = self.field();
        let delta = field.step() * dir as f32;
        match field {
            SettingField::Pattern => {
                if dir > 0 {
                    model.next_pattern();
                } else {
                    model.prev_pattern();
                }
            }
            SettingField::Density => model.set_density(model.density() + delta),
            SettingField::DotSize => model.set_dot_size(model.dot_size() + delta),
            SettingField::Speed => model.set_speed(model.speed() + delta),
            SettingField::Color => model.set_color_hue(model.color_hue() + delta),
            SettingField::BloomIntensity => model.set_bloom_intensity(model.bloom_intensity() + delta),
            SettingField::BloomRadius => model.set_bloom_radius(model.bloom_radius() + delta),
            SettingField::Brightness => model.set_brightness(model.brightness() + delta),
        }
    }

    /// Overlay text. The first line is the title.
    pub fn text(&self, model: &ParameterModel) -> String {
        let focused = self.field();
        let mut lines = vec!["Settings".to_string()];
        for field in SettingField::all() {
            let value = match field {
                SettingField::Pattern => model.pattern().label().to_string(),
                SettingField::Density => slider(model.density(), DENSITY_RANGE),
                SettingField::DotSize => slider(model.dot_size(), DOT_SIZE_RANGE),
                SettingField::Speed => slider(model.speed(), SPEED_RANGE),
                SettingField::Color => format!(
                    "{} hue {:.2}",
                    if model.color_enabled() { "on " } else { "off" },
                    model.color_hue()
                ),
                SettingField::BloomIntensity => format!("{:.2}", model.bloom_intensity()),
                SettingField::BloomRadius => format!("{:.2}", model.bloom_radius()),
                SettingField::Brightness => format!("{:.2}", model.brightness()),
            };
            let cursor = if field == focused { '>' } else { ' ' };
            lines.push(format!("{cursor} {:<13}{value}", field.label()));
        }
        lines.push(String::new());
        lines.push("up/down select | left/right adjust | space color on/off | s/tab/esc close".to_string());
        lines.join("\n")
    }
}

fn slider(v: f32, (lo, hi): (f32, f32)) -> String {
    const WIDTH: usize = 12;
    let frac = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    let filled = (frac * WIDTH as f32).round() as usize;
    format!(
        "[{}{}] {:.2}",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        v
    )
}
