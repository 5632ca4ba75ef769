//! Starfield landing game: fly a small craft around the viewport and
//! collect the five portfolio stars.
//!
//! Positions are CSS pixels. The page owns the DOM; it calls `tick` from its
//! own 16 ms loop and reads back positions to draw.
use wasm_bindgen::prelude::*;

pub const TICK_MS: u32 = 16;
pub const SPEED: f64 = 6.0;
pub const COLLECT_RADIUS: f64 = 45.0;
pub const NEARBY_RADIUS: f64 = 70.0;
/// Fraction of the remaining distance covered per pointer move.
pub const POINTER_EASE: f64 = 0.3;
const EDGE: f64 = 50.0;
const BOTTOM_EDGE: f64 = 100.0;

/// (id, label, x fraction, y fraction)
pub const STARS: &[(&str, &str, f64, f64)] = &[
    ("uiux", "UI/UX", 0.15, 0.2),
    ("frontend", "Frontend", 0.85, 0.15),
    ("backend", "Backend & Systems", 0.15, 0.8),
    ("projects", "Projects Galaxy", 0.85, 0.8),
    ("beyond", "Beyond Code", 0.5, 0.5),
];

#[derive(Clone, Debug, PartialEq)]
pub struct Collectible {
    pub id: &'static str,
    pub name: &'static str,
    pub x: f64,
    pub y: f64,
    pub collected: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Thrust {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Thrust {
    /// Arrow keys and WASD. Returns false for keys the game ignores.
    pub fn set_key(&mut self, key: &str, pressed: bool) -> bool {
        let slot = match key {
            "ArrowUp" | "w" | "W" => &mut self.up,
            "ArrowDown" | "s" | "S" => &mut self.down,
            "ArrowLeft" | "a" | "A" => &mut self.left,
            "ArrowRight" | "d" | "D" => &mut self.right,
            _ => return false,
        };
        *slot = pressed;
        true
    }
}

#[derive(Clone, Debug)]
pub struct Starfield {
    width: f64,
    height: f64,
    pub craft: (f64, f64),
    pub thrust: Thrust,
    pub stars: Vec<Collectible>,
    started: bool,
}

impl Starfield {
    pub fn new(width: f64, height: f64) -> Self {
        let stars = STARS
            .iter()
            .map(|&(id, name, fx, fy)| Collectible {
                id,
                name,
                x: width * fx,
                y: height * fy,
                collected: false,
            })
            .collect();
        Self {
            width,
            height,
            craft: (width / 2.0, height / 2.0 + 150.0),
            thrust: Thrust::default(),
            stars,
            started: false,
        }
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn collected_count(&self) -> usize {
        self.stars.iter().filter(|s| s.collected).count()
    }

    /// Every star collected: show the call to action.
    pub fn show_cta(&self) -> bool {
        self.collected_count() == self.stars.len()
    }

    /// One 16 ms step. Returns the ids collected during this step.
    pub fn tick(&mut self) -> Vec<&'static str> {
        if !self.started {
            return Vec::new();
        }
        let (mut x, mut y) = self.craft;
        if self.thrust.up {
            y = (y - SPEED).max(EDGE);
        }
        if self.thrust.down {
            y = (y + SPEED).min(self.height - BOTTOM_EDGE);
        }
        if self.thrust.left {
            x = (x - SPEED).max(EDGE);
        }
        if self.thrust.right {
            x = (x + SPEED).min(self.width - EDGE);
        }
        self.craft = (x, y);
        self.collect_near()
    }

    /// Ease the craft toward the pointer.
    pub fn pointer(&mut self, px: f64, py: f64) -> Vec<&'static str> {
        if !self.started {
            return Vec::new();
        }
        let (x, y) = self.craft;
        self.craft = (x + (px - x) * POINTER_EASE, y + (py - y) * POINTER_EASE);
        self.collect_near()
    }

    pub fn is_nearby(&self, id: &str) -> bool {
        self.stars
            .iter()
            .find(|s| s.id == id)
            .is_some_and(|s| !s.collected && self.distance_to(s) < NEARBY_RADIUS)
    }

    fn distance_to(&self, star: &Collectible) -> f64 {
        (self.craft.0 - star.x).hypot(self.craft.1 - star.y)
    }

    fn collect_near(&mut self) -> Vec<&'static str> {
        let (cx, cy) = self.craft;
        let mut got = Vec::new();
        for star in self.stars.iter_mut().filter(|s| !s.collected) {
            if (cx - star.x).hypot(cy - star.y) < COLLECT_RADIUS {
                star.collected = true;
                log::info!("collected {}", star.name);
                got.push(star.id);
            }
        }
        got
    }
}

/// JS handle for the landing page.
#[wasm_bindgen]
pub struct StarfieldGame {
    inner: Starfield,
}

#[wasm_bindgen]
impl StarfieldGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> StarfieldGame {
        StarfieldGame {
            inner: Starfield::new(width, height),
        }
    }

    pub fn start(&mut self) {
        self.inner.start();
    }

    pub fn key(&mut self, key: &str, pressed: bool) -> bool {
        self.inner.is_started() && self.inner.thrust.set_key(key, pressed)
    }

    /// Comma-separated ids collected this tick (empty when none).
    pub fn tick(&mut self) -> String {
        self.inner.tick().join(",")
    }

    pub fn pointer(&mut self, x: f64, y: f64) -> String {
        self.inner.pointer(x, y).join(",")
    }

    pub fn craft_x(&self) -> f64 {
        self.inner.craft.0
    }

    pub fn craft_y(&self) -> f64 {
        self.inner.craft.1
    }

    pub fn collected(&self) -> usize {
        self.inner.collected_count()
    }

    pub fn total(&self) -> usize {
        self.inner.stars.len()
    }

    pub fn show_cta(&self) -> bool {
        self.inner.show_cta()
    }

    pub fn is_nearby(&self, id: &str) -> bool {
        self.inner.is_nearby(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn craft_starts_below_center_and_waits_for_start() {
        let mut f = Starfield::new(1920.0, 1080.0);
        assert_eq!(f.craft, (960.0, 690.0));
        f.thrust.up = true;
        f.tick();
        assert_eq!(f.craft, (960.0, 690.0));
        f.start();
        f.tick();
        assert_eq!(f.craft, (960.0, 684.0));
    }

    #[test]
    fn movement_is_clamped_to_the_viewport() {
        let mut f = Starfield::new(800.0, 600.0);
        f.start();
        f.thrust.set_key("a", true);
        f.thrust.set_key("ArrowDown", true);
        for _ in 0..500 {
            f.tick();
        }
        assert_eq!(f.craft, (50.0, 500.0));
        assert!(!f.thrust.set_key("q", true));
    }

    #[test]
    fn flying_over_a_star_collects_it_once() {
        let mut f = Starfield::new(1000.0, 1000.0);
        f.start();
        // craft (500, 650) -> center star at (500, 500)
        f.thrust.up = true;
        let mut got = Vec::new();
        for _ in 0..40 {
            got.extend(f.tick());
        }
        assert_eq!(got, vec!["beyond"]);
        assert_eq!(f.collected_count(), 1);
        assert!(!f.is_nearby("beyond"));
    }

    #[test]
    fn pointer_eases_and_collecting_all_shows_cta() {
        let mut f = Starfield::new(1000.0, 1000.0);
        f.start();
        f.pointer(500.0, 150.0);
        assert!((f.craft.1 - (650.0 - 0.3 * 500.0)).abs() < 1e-9);
        for &(_, _, fx, fy) in STARS {
            for _ in 0..30 {
                f.pointer(1000.0 * fx, 1000.0 * fy);
            }
        }
        assert!(f.show_cta());
    }

    #[test]
    fn nearby_radius_is_wider_than_collect() {
        let mut f = Starfield::new(1000.0, 1000.0);
        f.craft = (500.0, 560.0);
        assert!(f.is_nearby("beyond"));
        f.craft = (500.0, 580.0);
        assert!(!f.is_nearby("beyond"));
    }
}
