use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Size;
use crate::device::{GpuInit, SurfaceErrorAction, WgpuDevice};
use crate::render::{RenderSurface, SurfaceConfig};
use crate::time::FrameClock;

use super::app::{App, AppControl, FrameCtx, WindowSurface};
use super::keys::KeyboardState;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "blitter".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Entry point: opens one window with a render surface and drives an [`App`].
pub struct Runtime;

impl Runtime {
    /// Blocks until the window closes or the app asks to exit.
    ///
    /// `surface.size` is replaced by the window's actual inner size.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, surface: SurfaceConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, gpu_init, surface, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    keys: KeyboardState,

    window: Window,

    #[borrows(window)]
    #[covariant]
    surface: WindowSurface<'this>,
}

struct RuntimeState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    surface_config: SurfaceConfig,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A> RuntimeState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, surface_config: SurfaceConfig, app: A) -> Self {
        Self {
            config,
            gpu_init,
            surface_config,
            app,
            entry: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn create_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let surface_config = self.surface_config.clone();

        let mut entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            keys: KeyboardState::default(),
            window,
            surface_builder: |window: &Window| {
                let device = WgpuDevice::new_blocking(window, gpu_init)
                    .context("GPU initialization failed")?;
                let config = SurfaceConfig {
                    size: Size::from(window.inner_size()),
                    ..surface_config
                };
                RenderSurface::new(device, config).context("failed to create render surface")
            },
        }
        .try_build()?;

        let app = &mut self.app;
        entry
            .with_surface_mut(|surface| app.on_start(surface))
            .context("application start-up failed")?;

        Ok(entry)
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        if !self.exit_requested {
            self.exit_requested = true;
            if let Some(entry) = self.entry.as_mut() {
                let app = &mut self.app;
                entry.with_surface_mut(|surface| app.on_exit(surface));
            }
            // Surface goes before the window it borrows.
            self.entry = None;
        }
        event_loop.exit();
    }

    fn fail(&mut self, err: anyhow::Error, event_loop: &ActiveEventLoop) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.request_exit(event_loop);
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if size.width == 0 || size.height == 0 {
            log::debug!("ignoring resize to {}x{}", size.width, size.height);
            return;
        }

        if let Err(e) = entry.with_surface_mut(|surface| surface.resize(size.width, size.height)) {
            log::error!("resize to {}x{} failed: {e}", size.width, size.height);
        }
        entry.with_window(|w| w.request_redraw());
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let app = &mut self.app;

        let outcome = entry.with_mut(|fields| {
            // Only failures from this frame decide whether it is skipped.
            fields.surface.device_mut().take_surface_error();
            let time = fields.clock.tick();
            let fps = fields.clock.fps();

            let result = {
                let mut ctx = FrameCtx {
                    window: fields.window,
                    surface: &mut *fields.surface,
                    keys: &*fields.keys,
                    time,
                    fps,
                };
                app.on_frame(&mut ctx)
            };

            fields.keys.end_frame();

            frame_outcome(result, || fields.surface.device_mut().take_surface_error())
        });

        match outcome {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => self.request_exit(event_loop),
            Err(err) => self.fail(err, event_loop),
        }
    }
}

/// A frame that failed because the screen image was unavailable is skipped;
/// any other failure ends the run.
fn frame_outcome(
    result: anyhow::Result<AppControl>,
    surface_error: impl FnOnce() -> Option<SurfaceErrorAction>,
) -> anyhow::Result<AppControl> {
    let err = match result {
        Ok(control) => return Ok(control),
        Err(err) => err,
    };
    match surface_error() {
        Some(SurfaceErrorAction::Fatal) | None => Err(err),
        Some(action) => {
            log::debug!("frame skipped ({action:?}): {err}");
            Ok(AppControl::Continue)
        }
    }
}

impl<A> ApplicationHandler for RuntimeState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        match self.create_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(err) => self.fail(err, event_loop),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::KeyboardInput { event: key, .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_keys_mut(|keys| keys.apply(key));
                }
            }

            WindowEvent::Focused(false) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_keys_mut(|keys| keys.reset());
                }
            }

            WindowEvent::Resized(size) => self.resize(*size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_frame_ignores_surface_state() {
        let outcome = frame_outcome(Ok(AppControl::Exit), || Some(SurfaceErrorAction::Fatal));
        assert!(matches!(outcome, Ok(AppControl::Exit)));
    }

    #[test]
    fn unavailable_screen_skips_the_frame() {
        for action in [SurfaceErrorAction::SkipFrame, SurfaceErrorAction::Reconfigured] {
            let outcome = frame_outcome(Err(anyhow::anyhow!("no frame")), || Some(action));
            assert!(matches!(outcome, Ok(AppControl::Continue)));
        }
    }

    #[test]
    fn other_failures_end_the_run() {
        assert!(frame_outcome(Err(anyhow::anyhow!("app bug")), || None).is_err());
        let fatal = frame_outcome(Err(anyhow::anyhow!("oom")), || Some(SurfaceErrorAction::Fatal));
        assert!(fatal.is_err());
    }
}
