use std::path::PathBuf;

use anyhow::{Context, Result};
use blitter_engine::coords::{Rect, Size};
use blitter_engine::device::GpuInit;
use blitter_engine::logging::{init_logging, LoggingConfig};
use blitter_engine::paint::Color;
use blitter_engine::render::{DrawParams, SurfaceConfig, Texture};
use blitter_engine::window::{
    App, AppControl, FrameCtx, KeyCode, Runtime, RuntimeConfig, WindowSurface,
};
use winit::dpi::LogicalSize;

/// Region of the sprite that is drawn, and where it lands on the canvas.
const SPRITE_RECT: Rect = Rect::new(0.0, 0.0, 800.0, 400.0);

const CHECKER_SIZE: Size = Size::new(800, 400);
const CHECKER_CELL: u32 = 40;

struct Demo {
    sprite_path: Option<PathBuf>,
    sprite: Option<Texture>,
    background: Color,
    highlight: Color,
}

impl App for Demo {
    fn on_start(&mut self, surface: &mut WindowSurface<'_>) -> Result<()> {
        let sprite = match &self.sprite_path {
            Some(path) => surface
                .load_texture(path)
                .with_context(|| format!("failed to load sprite {}", path.display()))?,
            None => {
                let pixels = checkerboard(CHECKER_SIZE, CHECKER_CELL);
                surface.create_texture(CHECKER_SIZE, Some(&pixels))?
            }
        };
        log::info!("sprite ready: {}x{}", sprite.size().width, sprite.size().height);
        self.sprite = Some(sprite);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        if ctx.keys.was_pressed(KeyCode::Escape) {
            return Ok(AppControl::Exit);
        }
        let Some(sprite) = self.sprite.as_ref() else {
            return Ok(AppControl::Continue);
        };

        let clear = if ctx.keys.is_held(KeyCode::KeyP) {
            self.highlight
        } else {
            self.background
        };

        {
            let mut frame = ctx.surface.new_frame()?;
            frame.clear(Some(clear))?;
            frame.draw(sprite, DrawParams::new().src(SPRITE_RECT).dst(SPRITE_RECT))?;
            frame.present()?;
        }

        ctx.window.set_title(&format!("{}", ctx.fps as u32));
        Ok(AppControl::Continue)
    }

    fn on_exit(&mut self, surface: &mut WindowSurface<'_>) {
        if let Some(sprite) = self.sprite.take() {
            surface.release_texture(sprite);
        }
    }
}

/// Opaque RGBA8 checkerboard.
fn checkerboard(size: Size, cell: u32) -> Vec<u8> {
    let light = [230, 230, 230, 255];
    let dark = [40, 40, 40, 255];
    let mut pixels = Vec::with_capacity(size.rgba8_len());
    for y in 0..size.height {
        for x in 0..size.width {
            let texel = if (x / cell + y / cell) % 2 == 0 { light } else { dark };
            pixels.extend_from_slice(&texel);
        }
    }
    pixels
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let demo = Demo {
        sprite_path: std::env::args_os().nth(1).map(PathBuf::from),
        sprite: None,
        background: "red".parse()?,
        highlight: "blue".parse()?,
    };

    let runtime = RuntimeConfig {
        title: "blitter".to_string(),
        initial_size: LogicalSize::new(1000.0, 800.0),
    };

    Runtime::run(runtime, GpuInit::default(), SurfaceConfig::default(), demo)
}
