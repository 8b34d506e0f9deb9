/// flat3d Web - 2D canvas front end compiled to WASM
///
/// `WebEngine::start` schedules a `setInterval` timer at the configured tick
/// rate and `stop` cancels it. A host that prefers its own loop (for example
/// `requestAnimationFrame`) skips `start` and calls `WebEngine::tick` with the
/// seconds since the previous call.
use flat3d_core::{obj, EngineConfig, FrameState, FrameStats, Mesh, Pipeline, Renderer};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

pub mod canvas;

pub use canvas::CanvasRenderer;

/// Everything that survives between ticks, independent of the canvas
pub struct EngineState {
    mesh: Mesh,
    pipeline: Pipeline,
    frame: FrameState,
    tick_rate: u32,
    /// Timestamp of the previous timed tick, in milliseconds
    last_tick_ms: Option<f64>,
}

impl EngineState {
    pub fn new(mesh: Mesh, config: &EngineConfig) -> flat3d_core::Result<Self> {
        Ok(Self {
            mesh,
            pipeline: Pipeline::new(config)?,
            frame: FrameState::default(),
            tick_rate: config.tick_rate,
            last_tick_ms: None,
        })
    }

    pub fn tick<R: Renderer + ?Sized>(&mut self, elapsed_seconds: f32, renderer: &mut R) -> FrameStats {
        self.pipeline
            .update(&mut self.frame, &self.mesh, elapsed_seconds, renderer)
    }

    /// Tick at timestamp `now_ms`; the first tick after a pause has zero elapsed time
    pub fn tick_at<R: Renderer + ?Sized>(&mut self, now_ms: f64, renderer: &mut R) -> FrameStats {
        let elapsed = self
            .last_tick_ms
            .map_or(0.0, |last| ((now_ms - last) / 1000.0) as f32);
        self.last_tick_ms = Some(now_ms);
        self.tick(elapsed, renderer)
    }

    /// Forget the previous timestamp so time spent stopped is not replayed
    pub fn pause(&mut self) {
        self.last_tick_ms = None;
    }

    /// Timer period for the configured tick rate, at least 1 ms
    pub fn tick_interval_ms(&self) -> i32 {
        (1000.0 / f64::from(self.tick_rate)).round().max(1.0) as i32
    }

    /// Replace the mesh with a parsed OBJ; the old mesh stays on error
    pub fn load_obj(&mut self, text: &str) -> flat3d_core::Result<usize> {
        let mesh = obj::parse_obj(text)?;
        let count = mesh.len();
        self.mesh = mesh;
        log::info!("[WEB] mesh replaced: {} triangles", count);
        Ok(count)
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame
    }

    pub fn restart(&mut self) {
        self.frame.reset();
    }
}

fn to_js(err: flat3d_core::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))
}

struct Shared {
    state: EngineState,
    renderer: CanvasRenderer,
}

/// A running `setInterval` timer; the closure must outlive the handle
struct Interval {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
pub struct WebEngine {
    shared: Rc<RefCell<Shared>>,
    interval: Option<Interval>,
}

#[wasm_bindgen]
impl WebEngine {
    /// Attach to the canvas with id `canvas_id` and size it
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, width: u32, height: u32) -> Result<WebEngine, JsValue> {
        let document = window()?
            .document()
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id `{}`", canvas_id)))?
            .dyn_into()?;
        canvas.set_width(width);
        canvas.set_height(height);

        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let config = EngineConfig {
            screen_width: width,
            screen_height: height,
            ..EngineConfig::default()
        };
        let state = EngineState::new(Mesh::unit_cube(), &config).map_err(to_js)?;

        Ok(WebEngine {
            shared: Rc::new(RefCell::new(Shared {
                state,
                renderer: CanvasRenderer::new(context, width, height),
            })),
            interval: None,
        })
    }

    /// Run one frame; returns the number of triangles drawn
    pub fn tick(&mut self, elapsed_seconds: f32) -> usize {
        let mut shared = self.shared.borrow_mut();
        let Shared { state, renderer } = &mut *shared;
        state.tick(elapsed_seconds, renderer).emitted
    }

    /// Start ticking on a browser timer at the configured rate
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.interval.is_some() {
            return Ok(());
        }
        let window = window()?;
        let performance = window
            .performance()
            .ok_or_else(|| JsValue::from_str("performance timer unavailable"))?;
        let period = self.shared.borrow().state.tick_interval_ms();

        let shared = Rc::clone(&self.shared);
        let callback = Closure::<dyn FnMut()>::new(move || {
            let mut shared = shared.borrow_mut();
            let Shared { state, renderer } = &mut *shared;
            state.tick_at(performance.now(), renderer);
        });
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            period,
        )?;
        log::info!("[WEB] started, {} ms per tick", period);

        self.interval = Some(Interval {
            handle,
            _callback: callback,
        });
        Ok(())
    }

    /// Cancel the timer started by `start`
    pub fn stop(&mut self) {
        if let Some(interval) = self.interval.take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(interval.handle);
            }
            self.shared.borrow_mut().state.pause();
            log::info!("[WEB] stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    pub fn zoom_in(&mut self) {
        self.shared.borrow_mut().state.pipeline_mut().camera.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.shared.borrow_mut().state.pipeline_mut().camera.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.shared.borrow_mut().state.pipeline_mut().camera.reset_zoom();
    }

    pub fn toggle_faces(&mut self) {
        self.shared.borrow_mut().state.pipeline_mut().display.toggle_faces();
    }

    pub fn toggle_lines(&mut self) {
        self.shared.borrow_mut().state.pipeline_mut().display.toggle_lines();
    }

    pub fn restart(&mut self) {
        self.shared.borrow_mut().state.restart();
    }

    /// Replace the mesh with the contents of an OBJ file
    pub fn load_obj(&mut self, text: &str) -> Result<usize, JsValue> {
        self.shared.borrow_mut().state.load_obj(text).map_err(to_js)
    }
}

impl Drop for WebEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
