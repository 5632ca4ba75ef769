//! "My design process" platformer: the runner scrolls forward on its own,
//! jumps over obstacles and stops at each of five doors to reveal a step
//! card. Hitting an obstacle ends the run.
//!
//! World units are canvas pixels on a 500 px tall stage. The runner is drawn
//! at a fixed screen x of `START_X`; everything else scrolls by
//! `world_x - runner.x + START_X`. The page calls `tick` once per animation
//! frame.
use wasm_bindgen::prelude::*;

pub const START_X: f64 = 100.0;
pub const GROUND_Y: f64 = 400.0;
pub const FLOOR_Y: f64 = 500.0;
pub const JUMP_VELOCITY: f64 = -22.0;
pub const GRAVITY: f64 = 0.9;
pub const BASE_SPEED: f64 = 3.0;
pub const MAX_SPEED: f64 = 6.0;
/// Speed gained per frame while running.
pub const SPEED_GAIN: f64 = 0.0005;
pub const RIGHT_BOOST: f64 = 1.5;
pub const BACKSTEP: f64 = 3.0;

pub const DOOR_START: f64 = 1200.0;
pub const DOOR_SPACING: f64 = 1000.0;
const DOOR_REACH: f64 = 50.0;
const DOOR_TOP: f64 = 350.0;
const DOOR_BOTTOM: f64 = 450.0;

const OBSTACLE_SLOTS: u32 = 30;
const OBSTACLE_START: f64 = 600.0;
const OBSTACLE_SPACING: f64 = 300.0;
const OBSTACLE_JITTER: f64 = 150.0;
const DOOR_CLEARANCE: f64 = 200.0;
pub const OBSTACLE_MIN_HEIGHT: f64 = 40.0;
const OBSTACLE_HEIGHT_RANGE: f64 = 30.0;
pub const OBSTACLE_WIDTH: f64 = 30.0;
// Hit box; the top 10 px of an obstacle is what trips the runner.
const RUNNER_HIT_WIDTH: f64 = 35.0;
const RUNNER_HEIGHT: f64 = 60.0;
const OBSTACLE_LIP: f64 = 10.0;

/// (title, description)
pub const STEPS: &[(&str, &str)] = &[
    (
        "Research",
        "Deep dive into user needs, market analysis, and competitive research to understand the problem space.",
    ),
    (
        "Wireframe",
        "Create low-fidelity wireframes and user flows to map out the core functionality and structure.",
    ),
    (
        "Design",
        "Craft beautiful, pixel-perfect designs with attention to typography, color, and visual hierarchy.",
    ),
    (
        "Develop",
        "Build responsive, performant applications using modern technologies and best practices.",
    ),
    (
        "Deliver",
        "Deploy, test, and iterate based on user feedback to ensure the best possible experience.",
    ),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Ready,
    Running,
    /// Paused on the card of the door just opened.
    Card(usize),
    GameOver,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickEvent {
    DoorUnlocked(usize),
    Crashed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Runner {
    pub x: f64,
    pub y: f64,
    pub velocity_y: f64,
    pub on_ground: bool,
}

impl Runner {
    fn at_start() -> Self {
        Self {
            x: START_X,
            y: GROUND_Y,
            velocity_y: 0.0,
            on_ground: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Door {
    pub x: f64,
    pub unlocked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub height: f64,
}

impl Obstacle {
    pub fn top(&self) -> f64 {
        FLOOR_Y - self.height
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Small LCG for obstacle layout; layout only needs to look irregular.
#[derive(Clone, Copy, Debug)]
struct Lcg(u32);

impl Lcg {
    fn unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        f64::from(self.0) / 4_294_967_296.0
    }
}

/// Obstacles for one run, skipping slots that would crowd a door.
pub fn generate_obstacles(seed: u32, doors: &[Door]) -> Vec<Obstacle> {
    let mut rng = Lcg(seed);
    (0..OBSTACLE_SLOTS)
        .filter_map(|i| {
            let x = OBSTACLE_START + f64::from(i) * OBSTACLE_SPACING + rng.unit() * OBSTACLE_JITTER;
            let height = OBSTACLE_MIN_HEIGHT + rng.unit() * OBSTACLE_HEIGHT_RANGE;
            let near_door = doors.iter().any(|d| (x - d.x).abs() < DOOR_CLEARANCE);
            (!near_door).then_some(Obstacle { x, height })
        })
        .collect()
}

fn fresh_doors() -> Vec<Door> {
    (0..STEPS.len())
        .map(|i| Door {
            x: DOOR_START + i as f64 * DOOR_SPACING,
            unlocked: false,
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct ProcessGame {
    phase: RunPhase,
    pub runner: Runner,
    pub controls: Controls,
    pub doors: Vec<Door>,
    pub obstacles: Vec<Obstacle>,
    speed: f64,
}

impl Default for ProcessGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessGame {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Ready,
            runner: Runner::at_start(),
            controls: Controls::default(),
            doors: fresh_doors(),
            obstacles: Vec::new(),
            speed: BASE_SPEED,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn unlocked_count(&self) -> usize {
        self.doors.iter().filter(|d| d.unlocked).count()
    }

    /// Begin a run. After a crash or a finished run everything starts over;
    /// while running or paused on a card this is ignored.
    pub fn start(&mut self, seed: u32) -> bool {
        match self.phase {
            RunPhase::Running | RunPhase::Card(_) => return false,
            RunPhase::GameOver | RunPhase::Complete => self.reset(),
            RunPhase::Ready => {}
        }
        self.runner = Runner::at_start();
        self.speed = BASE_SPEED;
        self.controls = Controls::default();
        self.obstacles = generate_obstacles(seed, &self.doors);
        self.phase = RunPhase::Running;
        log::info!("process run started ({} obstacles)", self.obstacles.len());
        true
    }

    /// Back to the start screen with every door locked.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Close the step card and keep running. The last card ends the run.
    pub fn continue_journey(&mut self) -> bool {
        let RunPhase::Card(_) = self.phase else {
            return false;
        };
        self.phase = if self.unlocked_count() == self.doors.len() {
            log::info!("process complete");
            RunPhase::Complete
        } else {
            RunPhase::Running
        };
        true
    }

    /// Arrow keys, WASD and space. Returns whether the key belongs to the
    /// game, so the page can keep it from scrolling. Presses only count
    /// while running; releases always do.
    pub fn key(&mut self, key: &str, pressed: bool) -> bool {
        let running = self.phase == RunPhase::Running;
        match key {
            "ArrowLeft" | "a" | "A" => {
                if running || !pressed {
                    self.controls.left = pressed;
                }
            }
            "ArrowRight" | "d" | "D" => {
                if running || !pressed {
                    self.controls.right = pressed;
                }
            }
            "ArrowUp" | "w" | "W" | " " => {
                if pressed && running && self.runner.on_ground {
                    self.runner.velocity_y = JUMP_VELOCITY;
                    self.runner.on_ground = false;
                }
                if running || !pressed {
                    self.controls.jump = pressed;
                }
            }
            "ArrowDown" | "s" | "S" => {}
            _ => return false,
        }
        true
    }

    /// One animation frame.
    pub fn tick(&mut self) -> Option<TickEvent> {
        if self.phase != RunPhase::Running {
            return None;
        }
        let prev_x = self.runner.x;
        let mut r = self.runner;
        r.x += if self.controls.right {
            self.speed * RIGHT_BOOST
        } else {
            self.speed
        };
        if self.controls.left {
            r.x = (prev_x - BACKSTEP).max(START_X);
        }
        if !r.on_ground {
            r.velocity_y += GRAVITY;
            r.y += r.velocity_y;
            if r.y >= GROUND_Y {
                r.y = GROUND_Y;
                r.velocity_y = 0.0;
                r.on_ground = true;
            }
        }
        self.runner = r;
        self.speed = (self.speed + SPEED_GAIN).min(MAX_SPEED);

        let reached = self.doors.iter().position(|d| {
            !d.unlocked && (r.x - d.x).abs() < DOOR_REACH && (DOOR_TOP..=DOOR_BOTTOM).contains(&r.y)
        });
        if let Some(i) = reached {
            self.doors[i].unlocked = true;
            self.phase = RunPhase::Card(i);
            log::info!("door {} opened: {}", i + 1, STEPS[i].0);
            return Some(TickEvent::DoorUnlocked(i));
        }

        let hit = self.obstacles.iter().any(|o| {
            let top = o.top();
            r.x + RUNNER_HIT_WIDTH > o.x
                && r.x < o.x + OBSTACLE_WIDTH
                && r.y + RUNNER_HEIGHT > top
                && r.y < top + OBSTACLE_LIP
        });
        if hit {
            self.phase = RunPhase::GameOver;
            log::info!("process run crashed at x={:.0}", r.x);
            return Some(TickEvent::Crashed);
        }
        None
    }

    /// Canvas x of a world position.
    pub fn screen_x(&self, world_x: f64) -> f64 {
        world_x - self.runner.x + START_X
    }
}

/// JS handle for the process page.
#[wasm_bindgen(js_name = ProcessGame)]
pub struct ProcessGameHandle {
    inner: ProcessGame,
}

impl Default for ProcessGameHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_class = ProcessGame)]
impl ProcessGameHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ProcessGameHandle {
        ProcessGameHandle {
            inner: ProcessGame::new(),
        }
    }

    /// Obstacle layout is seeded from `performance.now()`.
    pub fn start(&mut self) -> bool {
        self.inner.start(crate::performance_now() as u32)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn continue_journey(&mut self) -> bool {
        self.inner.continue_journey()
    }

    pub fn key(&mut self, key: &str, pressed: bool) -> bool {
        self.inner.key(key, pressed)
    }

    /// "" when nothing happened, "door" or "crash" otherwise.
    pub fn tick(&mut self) -> String {
        match self.inner.tick() {
            Some(TickEvent::DoorUnlocked(_)) => "door".to_string(),
            Some(TickEvent::Crashed) => "crash".to_string(),
            None => String::new(),
        }
    }

    /// One of "ready", "running", "card", "over", "complete".
    pub fn phase(&self) -> String {
        match self.inner.phase() {
            RunPhase::Ready => "ready",
            RunPhase::Running => "running",
            RunPhase::Card(_) => "card",
            RunPhase::GameOver => "over",
            RunPhase::Complete => "complete",
        }
        .to_string()
    }

    /// Index of the step whose card is showing.
    pub fn card_step(&self) -> Option<usize> {
        match self.inner.phase() {
            RunPhase::Card(i) => Some(i),
            _ => None,
        }
    }

    pub fn step_count(&self) -> usize {
        STEPS.len()
    }

    pub fn step_title(&self, index: usize) -> Option<String> {
        STEPS.get(index).map(|s| s.0.to_string())
    }

    pub fn step_description(&self, index: usize) -> Option<String> {
        STEPS.get(index).map(|s| s.1.to_string())
    }

    pub fn door_unlocked(&self, index: usize) -> bool {
        self.inner.doors.get(index).is_some_and(|d| d.unlocked)
    }

    pub fn door_screen_x(&self, index: usize) -> Option<f64> {
        self.inner.doors.get(index).map(|d| self.inner.screen_x(d.x))
    }

    pub fn obstacle_count(&self) -> usize {
        self.inner.obstacles.len()
    }

    pub fn obstacle_screen_x(&self, index: usize) -> Option<f64> {
        self.inner.obstacles.get(index).map(|o| self.inner.screen_x(o.x))
    }

    pub fn obstacle_height(&self, index: usize) -> Option<f64> {
        self.inner.obstacles.get(index).map(|o| o.height)
    }

    pub fn runner_y(&self) -> f64 {
        self.inner.runner.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> ProcessGame {
        let mut g = ProcessGame::new();
        assert!(g.start(7));
        g.obstacles.clear();
        g
    }

    #[test]
    fn waits_for_start_then_scrolls_forward() {
        let mut g = ProcessGame::new();
        assert_eq!(g.tick(), None);
        assert_eq!(g.runner.x, START_X);
        let mut g = running();
        g.tick();
        assert_eq!(g.runner.x, START_X + BASE_SPEED);
        assert!(!g.start(7));
    }

    #[test]
    fn right_speeds_up_and_left_backs_off_to_the_start() {
        let mut g = running();
        g.key("d", true);
        g.tick();
        assert!((g.runner.x - (START_X + BASE_SPEED * RIGHT_BOOST)).abs() < 1e-9);
        g.key("d", false);
        g.key("ArrowLeft", true);
        for _ in 0..10 {
            g.tick();
        }
        assert_eq!(g.runner.x, START_X);
    }

    #[test]
    fn jump_arcs_back_to_the_ground() {
        let mut g = running();
        assert!(g.key(" ", true));
        assert!(!g.runner.on_ground);
        let mut peak = GROUND_Y;
        let mut frames = 0;
        while !g.runner.on_ground {
            g.tick();
            peak = peak.min(g.runner.y);
            frames += 1;
            assert!(frames < 100);
        }
        assert_eq!(g.runner.y, GROUND_Y);
        assert_eq!(g.runner.velocity_y, 0.0);
        assert!(peak < GROUND_Y - 250.0);
    }

    #[test]
    fn no_double_jump_and_presses_ignored_when_not_running() {
        let mut g = running();
        g.key("w", true);
        g.tick();
        let vy = g.runner.velocity_y;
        g.key("w", true);
        assert_eq!(g.runner.velocity_y, vy);

        let mut idle = ProcessGame::new();
        assert!(idle.key("ArrowUp", true));
        assert!(idle.runner.on_ground);
        assert!(idle.key("s", true));
        assert!(!idle.key("q", true));
    }

    #[test]
    fn speed_creeps_up_to_the_cap() {
        let mut g = running();
        g.doors.clear();
        for _ in 0..10_000 {
            g.tick();
        }
        assert_eq!(g.speed(), MAX_SPEED);
    }

    #[test]
    fn obstacles_keep_clear_of_doors_and_depend_only_on_the_seed() {
        let doors = fresh_doors();
        let a = generate_obstacles(42, &doors);
        assert_eq!(a, generate_obstacles(42, &doors));
        assert_ne!(a, generate_obstacles(43, &doors));
        assert!(!a.is_empty() && a.len() < OBSTACLE_SLOTS as usize);
        for o in &a {
            assert!(doors.iter().all(|d| (o.x - d.x).abs() >= DOOR_CLEARANCE));
            assert!((OBSTACLE_MIN_HEIGHT..OBSTACLE_MIN_HEIGHT + OBSTACLE_HEIGHT_RANGE).contains(&o.height));
        }
    }

    #[test]
    fn reaching_a_door_pauses_on_its_card() {
        let mut g = running();
        let event = (0..1_000).find_map(|_| g.tick());
        assert_eq!(event, Some(TickEvent::DoorUnlocked(0)));
        assert_eq!(g.phase(), RunPhase::Card(0));
        let x = g.runner.x;
        assert_eq!(g.tick(), None);
        assert_eq!(g.runner.x, x);
        assert!(g.continue_journey());
        assert_eq!(g.phase(), RunPhase::Running);
        // the opened door does not fire again
        assert_eq!(g.tick(), None);
    }

    #[test]
    fn running_into_an_obstacle_ends_the_run() {
        let mut g = running();
        g.obstacles.push(Obstacle { x: 140.0, height: 50.0 });
        let event = (0..50).find_map(|_| g.tick());
        assert_eq!(event, Some(TickEvent::Crashed));
        assert_eq!(g.phase(), RunPhase::GameOver);
        assert_eq!(g.tick(), None);
    }

    #[test]
    fn jumping_clears_an_obstacle() {
        let mut g = running();
        g.obstacles.push(Obstacle { x: 160.0, height: 70.0 });
        // take off with the obstacle just ahead
        for _ in 0..5 {
            g.tick();
        }
        g.key(" ", true);
        for _ in 0..80 {
            assert_ne!(g.tick(), Some(TickEvent::Crashed));
        }
        assert!(g.runner.x > 200.0);
    }

    #[test]
    fn all_doors_complete_the_run_and_start_begins_again() {
        let mut g = running();
        let mut frames = 0;
        while g.phase() != RunPhase::Complete {
            if let Some(TickEvent::DoorUnlocked(_)) = g.tick() {
                assert!(g.continue_journey());
            }
            frames += 1;
            assert!(frames < 20_000);
        }
        assert_eq!(g.unlocked_count(), STEPS.len());
        assert!(g.start(1));
        assert_eq!(g.unlocked_count(), 0);
        assert_eq!(g.runner.x, START_X);
    }
}
