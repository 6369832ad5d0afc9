use clap::ValueEnum;
use std::sync::atomic::{fence, AtomicU32, AtomicU64, Ordering};

pub const DENSITY_RANGE: (f32, f32) = (0.2, 1.0);
pub const DOT_SIZE_RANGE: (f32, f32) = (0.1, 1.0);
pub const SPEED_RANGE: (f32, f32) = (0.1, 2.0);
/// Shared by bloom intensity, bloom radius and brightness.
pub const GAIN_RANGE: (f32, f32) = (0.0, 8.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
#[repr(u32)]
pub enum Pattern {
    Wave = 0,
    Pulse = 1,
    #[value(alias = "spiral")]
    Ripple = 2,
    Noise = 3,
    Cellular = 4,
    #[value(alias = "flow")]
    FlowField = 5,
    Gravity = 6,
    Fractal = 7,
    #[value(alias = "kaleido")]
    Kaleidoscope = 8,
    Magnetic = 9,
    Growth = 10,
    Tunnel = 11,
    Interference = 12,
}

impl Pattern {
    pub const COUNT: usize = 13;

    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Wave,
            Self::Pulse,
            Self::Ripple,
            Self::Noise,
            Self::Cellular,
            Self::FlowField,
            Self::Gravity,
            Self::Fractal,
            Self::Kaleidoscope,
            Self::Magnetic,
            Self::Growth,
            Self::Tunnel,
            Self::Interference,
        ]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::all().get(idx).copied()
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wave => "Wave",
            Self::Pulse => "Pulse",
            Self::Ripple => "Spiral",
            Self::Noise => "Noise",
            Self::Cellular => "Cellular",
            Self::FlowField => "Flow Field",
            Self::Gravity => "Gravity",
            Self::Fractal => "Fractal",
            Self::Kaleidoscope => "Kaleidoscope",
            Self::Magnetic => "Magnetic",
            Self::Growth => "Growth",
            Self::Tunnel => "Tunnel",
            Self::Interference => "Interference",
        }
    }

    /// Speed the model switches to when this pattern is selected.
    pub fn default_speed(self) -> f32 {
        match self {
            Self::Wave => 1.0,
            Self::Pulse => 0.9,
            Self::Ripple => 1.3,
            Self::Noise => 1.1,
            Self::Cellular => 0.8,
            Self::FlowField => 0.7,
            Self::Gravity => 1.0,
            Self::Fractal => 0.6,
            Self::Kaleidoscope => 0.9,
            Self::Magnetic => 0.8,
            Self::Growth => 0.5,
            Self::Tunnel => 1.2,
            Self::Interference => 1.0,
        }
    }
}

/// Every tunable value one frame needs. Copied into the renderer, never shared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterSnapshot {
    pub density: f32,
    pub dot_size: f32,
    pub speed: f32,
    pub color_hue: f32,
    pub color_enabled: bool,
    pub pattern: Pattern,
    pub bloom_intensity: f32,
    pub bloom_radius: f32,
    pub brightness: f32,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            density: 0.6,
            dot_size: 0.7,
            speed: 1.0,
            color_hue: 0.5,
            color_enabled: true,
            pattern: Pattern::Wave,
            bloom_intensity: 1.0,
            bloom_radius: 1.0,
            brightness: 2.0,
        }
    }
}

/// Owner of the live parameter values. Setters clamp silently so the model is
/// always in a renderable state.
#[derive(Clone, Debug, Default)]
pub struct ParameterModel {
    current: ParameterSnapshot,
}

impl ParameterModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        self.current
    }

    pub fn density(&self) -> f32 {
        self.current.density
    }

    pub fn dot_size(&self) -> f32 {
        self.current.dot_size
    }

    pub fn speed(&self) -> f32 {
        self.current.speed
    }

    pub fn color_hue(&self) -> f32 {
        self.current.color_hue
    }

    pub fn color_enabled(&self) -> bool {
        self.current.color_enabled
    }

    pub fn pattern(&self) -> Pattern {
        self.current.pattern
    }

    pub fn bloom_intensity(&self) -> f32 {
        self.current.bloom_intensity
    }

    pub fn bloom_radius(&self) -> f32 {
        self.current.bloom_radius
    }

    pub fn brightness(&self) -> f32 {
        self.current.brightness
    }

    pub fn set_density(&mut self, v: f32) {
        self.current.density = clamp_or_keep(v, DENSITY_RANGE, self.current.density);
    }

    pub fn set_dot_size(&mut self, v: f32) {
        self.current.dot_size = clamp_or_keep(v, DOT_SIZE_RANGE, self.current.dot_size);
    }

    pub fn set_speed(&mut self, v: f32) {
        self.current.speed = clamp_or_keep(v, SPEED_RANGE, self.current.speed);
    }

    pub fn set_color_hue(&mut self, v: f32) {
        if v.is_finite() {
            self.current.color_hue = wrap_hue(v);
        }
    }

    pub fn set_color_enabled(&mut self, on: bool) {
        self.current.color_enabled = on;
    }

    pub fn toggle_color(&mut self) {
        self.current.color_enabled = !self.current.color_enabled;
    }

    pub fn set_bloom_intensity(&mut self, v: f32) {
        self.current.bloom_intensity = clamp_or_keep(v, GAIN_RANGE, self.current.bloom_intensity);
    }

    pub fn set_bloom_radius(&mut self, v: f32) {
        self.current.bloom_radius = clamp_or_keep(v, GAIN_RANGE, self.current.bloom_radius);
    }

    pub fn set_brightness(&mut self, v: f32) {
        self.current.brightness = clamp_or_keep(v, GAIN_RANGE, self.current.brightness);
    }

    /// Switches pattern and overwrites speed with the pattern default, even if
    /// the user had adjusted it. Nothing else changes.
    pub fn select_pattern(&mut self, pattern: Pattern) {
        self.current.pattern = pattern;
        self.current.speed = pattern.default_speed();
        log::debug!(
            "pattern -> {} (speed reset to {:.2})",
            pattern.label(),
            self.current.speed
        );
    }

    pub fn next_pattern(&mut self) {
        self.select_pattern(self.current.pattern.next());
    }

    pub fn prev_pattern(&mut self) {
        self.select_pattern(self.current.pattern.prev());
    }
}

fn clamp_or_keep(v: f32, (lo, hi): (f32, f32), keep: f32) -> f32 {
    if v.is_nan() { keep } else { v.clamp(lo, hi) }
}

fn wrap_hue(v: f32) -> f32 {
    let h = v.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if h >= 1.0 { 0.0 } else { h }
}

/// Lock-free snapshot store for handing parameters from a UI writer to a
/// frame driver. Single writer; readers retry instead of ever seeing a
/// half-written snapshot.
///
/// The bundled viewer writes and reads on one thread, where this is a plain
/// hand-off. The retry only matters for hosts that render on a different
/// thread from the one applying input.
pub struct SharedParams {
    seq: AtomicU64,
    density: AtomicU32,
    dot_size: AtomicU32,
    speed: AtomicU32,
    color_hue: AtomicU32,
    color_enabled: AtomicU32,
    pattern: AtomicU32,
    bloom_intensity: AtomicU32,
    bloom_radius: AtomicU32,
    brightness: AtomicU32,
}

impl SharedParams {
    pub fn new(initial: ParameterSnapshot) -> Self {
        Self {
            seq: AtomicU64::new(0),
            density: AtomicU32::new(initial.density.to_bits()),
            dot_size: AtomicU32::new(initial.dot_size.to_bits()),
            speed: AtomicU32::new(initial.speed.to_bits()),
            color_hue: AtomicU32::new(initial.color_hue.to_bits()),
            color_enabled: AtomicU32::new(initial.color_enabled as u32),
            pattern: AtomicU32::new(initial.pattern as u32),
            bloom_intensity: AtomicU32::new(initial.bloom_intensity.to_bits()),
            bloom_radius: AtomicU32::new(initial.bloom_radius.to_bits()),
            brightness: AtomicU32::new(initial.brightness.to_bits()),
        }
    }

    pub fn store(&self, p: ParameterSnapshot) {
        self.seq.fetch_add(1, Ordering::AcqRel); // odd => write in progress
        fence(Ordering::Release);
        self.density.store(p.density.to_bits(), Ordering::Relaxed);
        self.dot_size.store(p.dot_size.to_bits(), Ordering::Relaxed);
        self.speed.store(p.speed.to_bits(), Ordering::Relaxed);
        self.color_hue.store(p.color_hue.to_bits(), Ordering::Relaxed);
        self.color_enabled
            .store(p.color_enabled as u32, Ordering::Relaxed);
        self.pattern.store(p.pattern as u32, Ordering::Relaxed);
        self.bloom_intensity
            .store(p.bloom_intensity.to_bits(), Ordering::Relaxed);
        self.bloom_radius
            .store(p.bloom_radius.to_bits(), Ordering::Relaxed);
        self.brightness.store(p.brightness.to_bits(), Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release); // even => stable
    }

    pub fn load(&self) -> ParameterSnapshot {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }

            let density = f32::from_bits(self.density.load(Ordering::Relaxed));
            let dot_size = f32::from_bits(self.dot_size.load(Ordering::Relaxed));
            let speed = f32::from_bits(self.speed.load(Ordering::Relaxed));
            let color_hue = f32::from_bits(self.color_hue.load(Ordering::Relaxed));
            let color_enabled = self.color_enabled.load(Ordering::Relaxed) != 0;
            let pattern_idx = self.pattern.load(Ordering::Relaxed) as usize;
            let bloom_intensity = f32::from_bits(self.bloom_intensity.load(Ordering::Relaxed));
            let bloom_radius = f32::from_bits(self.bloom_radius.load(Ordering::Relaxed));
            let brightness = f32::from_bits(self.brightness.load(Ordering::Relaxed));

            fence(Ordering::Acquire);
            let v2 = self.seq.load(Ordering::Relaxed);
            if v1 == v2 {
                return ParameterSnapshot {
                    density,
                    dot_size,
                    speed,
                    color_hue,
                    color_enabled,
                    pattern: Pattern::from_index(pattern_idx).unwrap_or(Pattern::Wave),
                    bloom_intensity,
                    bloom_radius,
                    brightness,
                };
            }
        }
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(ParameterSnapshot::default())
    }
}
