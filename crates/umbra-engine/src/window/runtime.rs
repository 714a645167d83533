use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{Canvas, Umbra};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::render::{BackendState, FramePlan, MeshRenderer, RenderTarget};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: format!("umbra {}", crate::VERSION),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

impl RuntimeConfig {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window and runs `umbra` until the window closes.
    ///
    /// Each redraw updates the canvas client size, runs the frame step and
    /// renders whatever the behaviors queued. Between frames the fixed timer
    /// is polled and the loop sleeps until its next deadline.
    pub fn run(initial: RuntimeConfig, gpu_init: GpuInit, umbra: Umbra) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(initial, gpu_init, umbra);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState {
    initial: RuntimeConfig,
    gpu_init: GpuInit,

    umbra: Umbra,
    backend: BackendState,
    renderer: MeshRenderer,

    window: Option<WindowEntry>,
    exit_requested: bool,
}

impl AppState {
    fn new(initial: RuntimeConfig, gpu_init: GpuInit, umbra: Umbra) -> Self {
        Self {
            initial,
            gpu_init,
            umbra,
            backend: BackendState::default(),
            renderer: MeshRenderer::new(),
            window: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowId> {
        let attrs = Window::default_attributes()
            .with_title(self.initial.title.clone())
            .with_inner_size(self.initial.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        self.window = Some(entry);
        Ok(id)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };

        sync_client_size(&mut self.umbra.canvas, entry.with_window(|w| w.inner_size()));
        self.umbra.frame_at(Instant::now());

        let plan = self.backend.apply(self.umbra.gfx.drain());
        if plan.is_empty() {
            return;
        }

        entry.with_window(|w| w.pre_present_notify());

        let renderer = &mut self.renderer;
        let action = entry.with_gpu_mut(|gpu| render_frame(gpu, renderer, &plan));

        if action == Some(SurfaceErrorAction::Fatal) {
            log::error!("fatal surface error; exiting");
            self.request_exit(event_loop);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create initial window: {e:#}");
            self.request_exit(event_loop);
            return;
        }

        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        self.umbra.fixed_at(Instant::now());
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.umbra.next_fixed_deadline()));

        // Frames are paced by presentation.
        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

/// Copies the window's inner size into the canvas's displayed size.
fn sync_client_size(canvas: &mut Canvas, size: PhysicalSize<u32>) {
    canvas.client_width = size.width;
    canvas.client_height = size.height;
}

/// Records and presents one frame. Returns the surface error action if the
/// frame could not be acquired.
fn render_frame(gpu: &mut Gpu<'_>, renderer: &mut MeshRenderer, plan: &FramePlan) -> Option<SurfaceErrorAction> {
    let mut frame = match gpu.begin_frame() {
        Ok(f) => f,
        Err(err) => {
            log::debug!("surface error: {err}");
            return Some(gpu.handle_surface_error(err));
        }
    };

    {
        let ctx = gpu.render_ctx();
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, gpu.depth_view());
        renderer.render(&ctx, &mut target, plan);
    }

    gpu.submit(frame);
    None
}
