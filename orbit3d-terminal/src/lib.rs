/// Terminal host for the orbit viewer
///
/// Runs a `Viewer` against the ASCII rasterizer, translating crossterm mouse
/// and key events into viewer input.
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use log::{debug, info, warn};
use orbit3d_core::{InputEvent, Viewer, Viewport};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;

pub use config::{AppConfig, ShadingOptions, TerminalOptions};
pub use renderer::AsciiRenderer;

/// What a terminal event asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Input(InputEvent),
    Orbit { d_yaw: f32, d_pitch: f32 },
    Reset,
    Quit,
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    viewer: Viewer,
    renderer: AsciiRenderer,
    options: TerminalOptions,
    running: bool,
    started: Instant,
    last_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: AppConfig) -> Result<Self> {
        let (width, height) = terminal::size().context("reading terminal size")?;
        Self::with_size(config, width, height)
    }

    /// Build the app for a terminal of `columns` x `rows` cells.
    pub fn with_size(config: AppConfig, columns: u16, rows: u16) -> Result<Self> {
        let AppConfig { viewer, terminal } = config;
        terminal.validate()?;

        let mut renderer = AsciiRenderer::new(columns as usize, rows as usize, terminal.shading());
        renderer.set_cull_back_faces(viewer.render.cull_back_faces);
        let viewport = Viewport::new(columns.into(), rows.into()).with_pixel_aspect(terminal.cell_aspect);
        let viewer = Viewer::new(&mut renderer, viewer, viewport).context("setting up the viewer")?;

        let now = Instant::now();
        Ok(Self {
            viewer,
            renderer,
            options: terminal,
            running: true,
            started: now,
            last_sample: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;

        let result = self.main_loop();

        // Cleanup runs even when the loop failed
        let restored = execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)
            .and_then(|()| terminal::disable_raw_mode());
        self.viewer.shutdown(&mut self.renderer);

        result?;
        restored.context("restoring the terminal")?;
        Ok(())
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_secs_f64(1.0 / f64::from(self.options.fps));
        info!("render loop started at {} fps target", self.options.fps);

        while self.running {
            let frame_start = Instant::now();

            self.render()?;

            // Handle input until the next frame is due
            let deadline = frame_start + target_frame_time;
            while self.running {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() || !event::poll(remaining)? {
                    break;
                }
                let event = event::read()?;
                self.handle_event(event);
            }

            // Update FPS counter
            self.frame_count += 1;
            let now = Instant::now();
            if (now - self.last_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_sample = now;
            }
        }

        Ok(())
    }

    /// Apply one terminal event.
    pub fn handle_event(&mut self, event: Event) {
        let Some(action) = translate_event(&event, &self.options) else {
            return;
        };
        match action {
            Action::Input(input) => self.viewer.handle_event(&mut self.renderer, input),
            Action::Orbit { d_yaw, d_pitch } => self.viewer.camera_mut().orbit(d_yaw, d_pitch),
            Action::Reset => self.viewer.camera_mut().reset(),
            Action::Quit => {
                debug!("quit requested");
                self.running = false;
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        let time = self.started.elapsed().as_secs_f32();
        if let Err(err) = self.viewer.render_frame(&mut self.renderer, time) {
            warn!("frame failed: {err}");
            return Err(err.into());
        }

        let mut stdout = stdout();
        self.renderer.present(&mut stdout)?;

        // Draw UI overlay
        let state = self.viewer.camera().state();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "orbit3d | FPS: {:.1} | dist {:.1} pitch {:.2} yaw {:.2} | Drag=Orbit Wheel=Zoom WASD/Arrows R=Reset Q=Quit",
                self.fps, state.distance, state.pitch, state.yaw
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Map a crossterm event onto viewer input or an app action.
pub fn translate_event(event: &Event, options: &TerminalOptions) -> Option<Action> {
    match *event {
        Event::Mouse(MouseEvent { kind, column, row, .. }) => {
            let x = f32::from(column) * options.cell_width_px;
            let y = f32::from(row) * options.cell_height_px;
            let input = match kind {
                MouseEventKind::Down(MouseButton::Left) => InputEvent::PointerDown { x, y },
                MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => InputEvent::PointerMove { x, y },
                MouseEventKind::Up(MouseButton::Left) => InputEvent::PointerUp,
                MouseEventKind::ScrollDown => InputEvent::Wheel { delta_y: options.wheel_step },
                MouseEventKind::ScrollUp => InputEvent::Wheel { delta_y: -options.wheel_step },
                _ => return None,
            };
            Some(Action::Input(input))
        }
        Event::Resize(width, height) => Some(Action::Input(InputEvent::Resize {
            width: width.into(),
            height: height.into(),
        })),
        Event::Key(KeyEvent { code, modifiers, kind, .. }) => {
            if kind == KeyEventKind::Release {
                return None;
            }
            let step = options.key_step;
            let action = match code {
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Char('w') | KeyCode::Up => Action::Orbit { d_yaw: 0.0, d_pitch: step },
                KeyCode::Char('s') | KeyCode::Down => Action::Orbit { d_yaw: 0.0, d_pitch: -step },
                KeyCode::Char('a') | KeyCode::Left => Action::Orbit { d_yaw: -step, d_pitch: 0.0 },
                KeyCode::Char('d') | KeyCode::Right => Action::Orbit { d_yaw: step, d_pitch: 0.0 },
                KeyCode::Char('r') => Action::Reset,
                _ => return None,
            };
            Some(action)
        }
        _ => None,
    }
}
