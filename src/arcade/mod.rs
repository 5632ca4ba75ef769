//! Hoops arcade: the timed free-throw game offered on the contact page while
//! the visitor waits for a reply.
//!
//! Gameplay lives in plain Rust (`session`, `shot`, `power`, `controller`) and
//! is driven by a millisecond clock, so it runs natively under `cargo test`.
//! This file is the browser front end: canvas court, DOM overlays, input
//! bindings and the requestAnimationFrame loop that feeds `performance.now()`
//! into the controller.
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, EventTarget, HtmlCanvasElement, window};

mod clock;
pub mod controller;
pub mod power;
pub mod session;
pub mod shot;

pub use controller::ArcadeController;
pub use power::PowerOscillator;
pub use session::{FinishReason, GameSession, Phase, SessionSummary};
pub use shot::{BallPosition, ShotInFlight, ShotOutcome, ShotResolution, ShotStage, resolve_shot};

use crate::config::ArcadeConfig;
use crate::rankings::RankingStore;
use crate::storage::AnyStorage;

const CANVAS_ID: &str = "arcade-canvas";
const HUD_ID: &str = "arcade-hud";
const STATUS_ID: &str = "arcade-status";
const BOARD_ID: &str = "arcade-leaderboard";

// --- DOM listener handle ----------------------------------------------------

/// An event listener that unregisters itself when dropped.
pub(crate) struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    pub(crate) fn bind(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

// --- Runtime view -----------------------------------------------------------

struct ArcadeView {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    controller: ArcadeController<AnyStorage>,
    listeners: Vec<Listener>,
    overlays: Vec<Element>,
    frame: Option<i32>,
    frame_cb: Option<FrameCallback>,
    exit_requested: bool,
    leaderboard_dirty: bool,
}

thread_local! {
    static ARCADE: RefCell<Option<ArcadeView>> = const { RefCell::new(None) };
}

/// Open the arcade (or restart it if it is already on screen).
#[wasm_bindgen]
pub fn start_arcade(player_name: Option<String>, config_json: Option<String>) -> Result<(), JsValue> {
    let now = crate::performance_now();
    let restarted = ARCADE.with(|cell| match cell.borrow_mut().as_mut() {
        Some(view) => {
            if config_json.is_some() {
                log::warn!("arcade already open; config ignored until it is closed");
            }
            if let Some(name) = &player_name {
                view.controller.set_player_name(name);
            }
            view.controller.start(now);
            true
        }
        None => false,
    });
    if restarted {
        return Ok(());
    }

    let cfg = config_json
        .as_deref()
        .map(ArcadeConfig::from_json)
        .unwrap_or_default();
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_width(420);
        c.set_height(560);
        c.set_attribute("style", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); border-radius:18px; border:2px solid #222; background:#1b1410; box-shadow:0 0 32px 0 rgba(0,0,0,0.25); z-index:40; touch-action:none;").ok();
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    ctx.set_font("16px 'Fira Code', monospace");
    ctx.set_text_align("center");

    let overlays = vec![
        ensure_overlay(&doc, "div", HUD_ID, "position:fixed; top:calc(50% - 310px); left:50%; transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:15px; padding:4px 10px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45;")?,
        ensure_overlay(&doc, "div", STATUS_ID, "position:fixed; top:calc(50% + 290px); left:50%; transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:15px; padding:4px 10px; background:rgba(0,0,0,0.35); border:1px solid #333; border-radius:6px; color:#f1faee; z-index:45;")?,
        ensure_overlay(&doc, "ol", BOARD_ID, "position:fixed; top:50%; left:calc(50% + 230px); transform:translateY(-50%); font-family:'Fira Code', monospace; font-size:13px; padding:8px 8px 8px 28px; margin:0; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45; min-width:160px;")?,
    ];

    let mut controller = ArcadeController::new(cfg, AnyStorage::browser_or_memory());
    if let Some(name) = &player_name {
        controller.set_player_name(name);
    }
    controller.start(now);

    let listeners = bind_inputs(&doc, &canvas)?;
    ARCADE.with(|cell| {
        cell.replace(Some(ArcadeView {
            canvas,
            ctx,
            controller,
            listeners,
            overlays,
            frame: None,
            frame_cb: None,
            exit_requested: false,
            leaderboard_dirty: true,
        }))
    });
    start_frame_loop();
    Ok(())
}

/// Shoot (or replay once the session has ended). For on-page buttons.
#[wasm_bindgen]
pub fn arcade_shoot() -> bool {
    with_view(|view| view.on_action(crate::performance_now())).unwrap_or(false)
}

#[wasm_bindgen]
pub fn arcade_replay() -> bool {
    with_view(|view| view.controller.start(crate::performance_now())).unwrap_or(false)
}

/// Close the arcade and hand the page back. Returns whether the session's
/// score was recorded before leaving.
#[wasm_bindgen]
pub fn exit_arcade() -> bool {
    match ARCADE.with(|cell| cell.borrow_mut().take()) {
        Some(view) => view.teardown(),
        None => false,
    }
}

/// This week's leaderboard as a JSON array, for pages that render it
/// themselves.
#[wasm_bindgen]
pub fn weekly_rankings_json() -> Result<String, JsValue> {
    let rankings = with_view(|view| view.controller.current_week_rankings()).unwrap_or_else(|| {
        let cfg = ArcadeConfig::default();
        let mut store = RankingStore::new(
            AnyStorage::browser_or_memory(),
            cfg.rankings_key,
            cfg.leaderboard_size,
        );
        store.reset_if_legacy();
        store.current_week_rankings()
    });
    serde_json::to_string(&rankings).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn with_view<R>(f: impl FnOnce(&mut ArcadeView) -> R) -> Option<R> {
    ARCADE.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn ensure_overlay(doc: &Document, tag: &str, id: &str, style: &str) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let el = doc.create_element(tag)?;
    el.set_id(id);
    el.set_attribute("style", style).ok();
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&el)?;
    Ok(el)
}

fn bind_inputs(doc: &Document, canvas: &HtmlCanvasElement) -> Result<Vec<Listener>, JsValue> {
    let keys = Listener::bind(doc.as_ref(), "keydown", |evt: web_sys::Event| {
        let Some(key_evt) = evt.dyn_ref::<web_sys::KeyboardEvent>() else {
            return;
        };
        let now = crate::performance_now();
        match key_evt.key().as_str() {
            " " | "Spacebar" => {
                evt.prevent_default();
                with_view(|view| view.on_action(now));
            }
            "Enter" | "r" | "R" => {
                with_view(|view| view.controller.start(now));
            }
            // Teardown would drop this very closure; let the frame loop do it.
            "Escape" => {
                with_view(|view| view.exit_requested = true);
            }
            _ => {}
        }
    })?;
    let taps = Listener::bind(canvas.as_ref(), "pointerdown", |evt: web_sys::Event| {
        evt.prevent_default();
        with_view(|view| view.on_action(crate::performance_now()));
    })?;
    Ok(vec![keys, taps])
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let leaving = ARCADE.with(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.as_ref().is_some_and(|view| view.exit_requested) {
                return slot.take();
            }
            if let Some(view) = slot.as_mut() {
                view.frame(ts);
            }
            None
        });
        if let Some(view) = leaving {
            view.teardown();
            return;
        }
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    // The view holds the loop so teardown can break the closure's self-reference.
    with_view(|view| view.frame_cb = Some(g.clone()));
    request_frame(&g);
}

fn request_frame(f: &FrameCallback) {
    let Some(w) = window() else {
        return;
    };
    let handle = match f.borrow().as_ref() {
        Some(cb) => w.request_animation_frame(cb.as_ref().unchecked_ref()).ok(),
        None => None,
    };
    // No view means the arcade closed: stop scheduling.
    let open = with_view(|view| view.frame = handle).is_some();
    if !open {
        if let Some(h) = handle {
            let _ = w.cancel_animation_frame(h);
        }
    }
}

impl ArcadeView {
    fn on_action(&mut self, now: f64) -> bool {
        let acted = match self.controller.session().phase() {
            Phase::Playing => self.controller.shoot(now).is_some(),
            Phase::Idle | Phase::Finished => self.controller.start(now),
        };
        self.note_recorded();
        acted
    }

    fn note_recorded(&mut self) {
        if self.controller.take_recorded() {
            self.leaderboard_dirty = true;
        }
    }

    fn frame(&mut self, now: f64) {
        self.controller.advance(now);
        self.note_recorded();
        self.draw(now);
        self.update_overlays();
    }

    /// Stop the loop, release the session and remove everything we added to
    /// the page.
    fn teardown(mut self) -> bool {
        if let (Some(handle), Some(w)) = (self.frame.take(), window()) {
            let _ = w.cancel_animation_frame(handle);
        }
        // When called from inside the frame callback, wasm-bindgen defers the
        // actual drop until the callback returns.
        if let Some(cb) = self.frame_cb.take() {
            cb.borrow_mut().take();
        }
        let recorded = self.controller.exit();
        self.listeners.clear();
        for el in self.overlays.drain(..) {
            el.remove();
        }
        self.canvas.remove();
        log::info!("arcade closed (score recorded: {recorded})");
        recorded
    }

    fn update_overlays(&mut self) {
        let Some(doc) = window().and_then(|w| w.document()) else {
            return;
        };
        let session = self.controller.session();
        if let Some(hud) = doc.get_element_by_id(HUD_ID) {
            hud.set_text_content(Some(&format!(
                "Time {}s | Balls {} | Score {}",
                session.time_left(),
                session.shots_remaining(),
                session.score()
            )));
        }
        if let Some(status) = doc.get_element_by_id(STATUS_ID) {
            let text = match session.phase() {
                Phase::Finished => format!(
                    "{} Final score {}. Enter or tap to play again",
                    session.status(),
                    session.score()
                ),
                _ => session.status().to_string(),
            };
            status.set_text_content(Some(&text));
        }
        if self.leaderboard_dirty {
            if let Err(err) = self.render_leaderboard(&doc) {
                log::warn!("leaderboard render failed: {err:?}");
            }
            self.leaderboard_dirty = false;
        }
    }

    fn render_leaderboard(&self, doc: &Document) -> Result<(), JsValue> {
        let Some(list) = doc.get_element_by_id(BOARD_ID) else {
            return Ok(());
        };
        list.set_inner_html("");
        // Names are visitor input: text nodes only.
        for entry in self.controller.current_week_rankings() {
            let li = doc.create_element("li")?;
            li.set_text_content(Some(&format!("{}  {}", entry.name, entry.score)));
            list.append_child(&li)?;
        }
        Ok(())
    }

    fn draw(&self, now: f64) {
        let ctx = &self.ctx;
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;
        let session = self.controller.session();
        let cfg = session.config();

        ctx.set_fill_style_str("#1b1410");
        ctx.fill_rect(0.0, 0.0, w, h);
        // Floor
        ctx.set_fill_style_str("#8a5a2b");
        ctx.fill_rect(0.0, h * 0.9, w, h * 0.1);

        // Backboard + square
        ctx.set_fill_style_str("#f4f4f4");
        ctx.fill_rect(w * 0.36, h * 0.1, w * 0.28, h * 0.13);
        ctx.set_stroke_style_str("#e63946");
        ctx.set_line_width(3.0);
        ctx.stroke_rect(w * 0.45, h * 0.15, w * 0.10, h * 0.06);

        // Net
        ctx.set_stroke_style_str("#dddddd");
        ctx.set_line_width(1.5);
        for i in 0..5 {
            let top = w * (0.42 + 0.04 * i as f64);
            let bottom = w * (0.45 + 0.025 * i as f64);
            line(ctx, top, h * 0.28, bottom, h * 0.37);
        }
        // Rim
        ctx.set_stroke_style_str("#e76f51");
        ctx.set_line_width(4.0);
        line(ctx, w * 0.42, h * 0.28, w * 0.58, h * 0.28);

        // Ball
        let ball = session
            .shot()
            .map(|s| s.ball_at(now, cfg))
            .unwrap_or(shot::BALL_REST);
        ctx.set_fill_style_str("#f77f00");
        ctx.begin_path();
        let _ = ctx.arc(
            ball.x / 100.0 * w,
            ball.y / 100.0 * h,
            w * 0.035,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        // Power meter (right edge), sweet spot marked
        let bar_x = w * 0.88;
        let bar_w = w * 0.05;
        let top = h * 0.2;
        let height = h * 0.6;
        ctx.set_stroke_style_str("#444");
        ctx.set_line_width(2.0);
        ctx.stroke_rect(bar_x, top, bar_w, height);
        let grad = ctx.create_linear_gradient(0.0, top + height, 0.0, top);
        let _ = grad.add_color_stop(0.0, "#2a9d8f");
        let _ = grad.add_color_stop(0.72, "#e9c46a");
        let _ = grad.add_color_stop(1.0, "#e63946");
        ctx.set_fill_style_canvas_gradient(&grad);
        let fill = f64::from(session.power()) / f64::from(power::POWER_MAX);
        ctx.fill_rect(bar_x, top + height * (1.0 - fill), bar_w, height * fill);
        let sweet_y = top + height * (1.0 - f64::from(cfg.sweet_spot) / 100.0);
        ctx.set_stroke_style_str("#ffd166");
        line(ctx, bar_x - 6.0, sweet_y, bar_x + bar_w + 6.0, sweet_y);

        if session.phase() != Phase::Playing {
            ctx.set_fill_style_str("rgba(0,0,0,0.55)");
            ctx.fill_rect(0.0, h * 0.45, w, h * 0.12);
            ctx.set_fill_style_str("#ffd166");
            let _ = ctx.fill_text("Tap or press Enter to play", w / 2.0, h * 0.52);
        }
    }
}

fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}

#[cfg(all(test, target_arch = "wasm32"))]
mod web_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn closing_releases_the_frame_loop() {
        start_arcade(Some("Tester".into()), None).unwrap();
        let cb = with_view(|view| view.frame_cb.clone())
            .flatten()
            .expect("loop running");
        assert!(cb.borrow().is_some());
        exit_arcade();
        assert!(cb.borrow().is_none());
        assert_eq!(Rc::strong_count(&cb), 1);
    }

    #[wasm_bindgen_test]
    fn reopening_keeps_the_first_config() {
        start_arcade(None, Some(r#"{"sessionSeconds":45}"#.into())).unwrap();
        start_arcade(None, Some(r#"{"sessionSeconds":10}"#.into())).unwrap();
        let seconds = with_view(|view| view.controller.session().config().session_seconds);
        assert_eq!(seconds, Some(45));
        exit_arcade();
    }
}
