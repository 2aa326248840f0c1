use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::backend::{WgpuBackend, WgpuConfig};
use crate::core::{Engine, EngineConfig};
use crate::input::platform::PointerTracker;
use crate::lifecycle::LifecycleState;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kinesis".to_string(),
            initial_size: LogicalSize::new(1000.0, 1000.0),
        }
    }
}

/// Entry point for the winit host loop.
pub struct Runtime;

impl Runtime {
    /// Runs until the window is closed.
    pub fn run(config: RuntimeConfig, wgpu: WgpuConfig, engine: EngineConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let engine = Engine::new(WgpuBackend::new(wgpu), engine);
        let mut state = AppState::new(config, engine);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

struct AppState {
    config: RuntimeConfig,
    engine: Engine<WgpuBackend>,

    /// Dropped on suspend; some platforms hand out a new native window on resume.
    window: Option<Arc<Window>>,
    pointers: PointerTracker,
    exit_requested: bool,
}

impl AppState {
    fn new(config: RuntimeConfig, engine: Engine<WgpuBackend>) -> Self {
        Self {
            config,
            engine,
            window: None,
            pointers: PointerTracker::new(),
            exit_requested: false,
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        Ok(Arc::new(window))
    }

    fn lose_window(&mut self) {
        self.pointers.clear();
        self.engine.on_window_lost();
        self.window = None;
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match self.create_window(event_loop) {
            Ok(w) => w,
            Err(e) => {
                log::error!("{e:#}");
                self.request_exit(event_loop);
                return;
            }
        };

        // Acquisition failure is logged by the engine; the next resume retries.
        if self.engine.on_window_available(Arc::clone(&window)).is_ok() {
            window.request_redraw();
        }
        self.window = Some(window);
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.lose_window();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw while a surface exists.
        if self.engine.state() == LifecycleState::SurfaceReady {
            if let Some(w) = &self.window {
                w.request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match &event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.lose_window();
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(size) => {
                self.engine.on_resize(size.width, size.height);
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(w) = &self.window {
                    let size = w.inner_size();
                    self.engine.on_resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                let was_ready = self.engine.state() == LifecycleState::SurfaceReady;
                self.engine.render_frame();
                if was_ready && self.engine.state() == LifecycleState::Idle {
                    log::error!("surface lost for good; exiting");
                    self.lose_window();
                    self.request_exit(event_loop);
                }
            }

            other => {
                if let Some(pointer) = self.pointers.translate(other, Instant::now()) {
                    self.engine.on_input_event(&pointer);
                }
            }
        }
    }
}
