/// Terminal front end: ASCII renderer plus the fixed-tick frame scheduler
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use flat3d_core::{EngineConfig, FrameState, Mesh, Pipeline, Viewport};
use std::fs::OpenOptions;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 2.0;

/// Environment variable naming a file that receives log output
pub const LOG_FILE_ENV: &str = "FLAT3D_LOG";

/// Install `env_logger`, honoring `RUST_LOG` for filtering.
///
/// The renderer owns the terminal while it runs, so records written to
/// stderr would land on top of the frame. When `FLAT3D_LOG` names a file
/// the records are appended there instead.
pub fn init_logging() -> io::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = std::env::var_os(LOG_FILE_ENV) {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    config: EngineConfig,
    mesh: Mesh,
    pipeline: Pipeline,
    state: FrameState,
    renderer: AsciiRenderer,
    running: bool,
    last_tick: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Size the screen to the terminal and build the pipeline
    pub fn new(mesh: Mesh, mut config: EngineConfig) -> flat3d_core::Result<Self> {
        let (width, height) = terminal::size()?;
        config.screen_width = u32::from(width.max(1));
        config.screen_height = u32::from(height.max(1));
        config.pixel_aspect = CELL_ASPECT;
        Self::with_config(mesh, config)
    }

    /// Build against the given config as is
    pub fn with_config(mesh: Mesh, config: EngineConfig) -> flat3d_core::Result<Self> {
        let pipeline = Pipeline::new(&config)?;
        let renderer = AsciiRenderer::new(
            config.screen_width as usize,
            config.screen_height as usize,
        );
        log::info!(
            "[APP] {} | {} triangles | {}x{} @ {} Hz",
            config.app_name,
            mesh.len(),
            config.screen_width,
            config.screen_height,
            config.tick_rate
        );

        let now = Instant::now();
        Ok(Self {
            config,
            mesh,
            pipeline,
            state: FrameState::default(),
            renderer,
            running: true,
            last_tick: now,
            last_fps_sample: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn frame_state(&self) -> FrameState {
        self.state
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Swap in a new mesh wholesale
    pub fn load_mesh(&mut self, mesh: Mesh) {
        log::info!("[APP] mesh replaced: {} triangles", mesh.len());
        self.mesh = mesh;
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let tick = Duration::from_secs_f64(1.0 / f64::from(self.config.tick_rate));
        self.last_tick = Instant::now();

        while self.running {
            let tick_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }
            if !self.running {
                break;
            }

            // A late tick just means a larger elapsed time
            let elapsed = tick_start.duration_since(self.last_tick).as_secs_f32();
            self.last_tick = tick_start;
            self.tick(elapsed);

            self.present()?;

            let spent = tick_start.elapsed();
            if spent < tick {
                std::thread::sleep(tick - spent);
            }

            // Update FPS counter
            self.frame_count += 1;
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    /// One full pipeline pass for `elapsed_seconds` of wall-clock time
    pub fn tick(&mut self, elapsed_seconds: f32) {
        self.pipeline
            .update(&mut self.state, &self.mesh, elapsed_seconds, &mut self.renderer);
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => self.handle_key(code),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
                self.pipeline.camera.zoom_in();
                log::debug!("[APP] zoom {:.3}", self.pipeline.camera.zoom);
            }
            KeyCode::Char('-') | KeyCode::Down => {
                self.pipeline.camera.zoom_out();
                log::debug!("[APP] zoom {:.3}", self.pipeline.camera.zoom);
            }
            KeyCode::Char('0') => {
                self.pipeline.camera.reset_zoom();
            }
            KeyCode::Char('f') => {
                self.pipeline.display.toggle_faces();
                log::debug!("[APP] faces {}", self.pipeline.display.show_faces);
            }
            KeyCode::Char('l') => {
                self.pipeline.display.toggle_lines();
                log::debug!("[APP] lines {}", self.pipeline.display.show_lines);
            }
            KeyCode::Char('r') => {
                self.state.reset();
            }
            _ => {}
        }
    }

    /// Follow a terminal resize with both the cell buffer and the projection
    fn resize(&mut self, width: u16, height: u16) {
        let (width, height) = (width.max(1), height.max(1));
        if let Err(err) = self
            .pipeline
            .set_viewport(Viewport::new(u32::from(width), u32::from(height)))
        {
            log::warn!("[APP] ignoring resize to {}x{}: {}", width, height, err);
            return;
        }
        self.renderer.resize(width as usize, height as usize);
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} | FPS: {:.1} | zoom {:.2} | +/-/0=Zoom F=Faces L=Lines R=Restart Q=Quit",
                self.config.app_name, self.fps, self.pipeline.camera.zoom
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
