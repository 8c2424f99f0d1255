use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use dewarp_engine::{RenderError, wgpu};
use dewarp_engine::core::{App, AppControl, FrameCtx};
use dewarp_engine::device::{GpuContext, GpuInit};
use dewarp_engine::logging::{LoggingConfig, init_logging};
use dewarp_engine::projection::ViewSettings;
use dewarp_engine::render::FrameRenderer;
use dewarp_engine::source::{OwnedFrame, StillImage};
use dewarp_engine::window::{RedrawMode, Runtime, RuntimeConfig};

/// HFoV change per arrow key press, in degrees.
const HFOV_STEP: f32 = 5.0;

struct Viewer {
    renderer: FrameRenderer,
    image: StillImage,
}

impl Viewer {
    fn step_hfov(&mut self, delta: f32) {
        let settings = self.renderer.settings();
        let next = settings.hfov_degrees() + delta;
        match self.renderer.set_parameters(next, settings.resolution()) {
            Ok(()) => log::info!("hfov {next} deg"),
            Err(err) => log::warn!("{err}; keeping {} deg", settings.hfov_degrees()),
        }
    }
}

impl App for Viewer {
    fn on_device_ready(
        &mut self,
        gpu: &GpuContext,
        format: wgpu::TextureFormat,
    ) -> Result<(), RenderError> {
        self.renderer.initialize(gpu, format)
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } = event
        else {
            return AppControl::Continue;
        };

        match code {
            KeyCode::Escape => return AppControl::Exit,
            KeyCode::ArrowUp => self.step_hfov(HFOV_STEP),
            KeyCode::ArrowDown => self.step_hfov(-HFOV_STEP),
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let frame = self.image.frame();
        ctx.render(&mut self.renderer, &frame)
    }
}

fn load_image(path: &Path) -> Result<OwnedFrame> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let rgba = image::load_from_memory(&bytes)
        .with_context(|| format!("decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(OwnedFrame::from_rgba8(width, height, rgba.into_raw())?)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args_os().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: dewarp-viewer <image> [hfov-degrees]");
    };
    let settings = match args.next() {
        Some(hfov) => ViewSettings::parse(&hfov.to_string_lossy(), None)?,
        None => ViewSettings::default(),
    };

    let frame = load_image(&path)?;
    log::info!(
        "{}: {}x{}, hfov {} deg",
        path.display(),
        frame.width(),
        frame.height(),
        settings.hfov_degrees()
    );

    let mut renderer = FrameRenderer::default();
    renderer.apply_settings(settings)?;

    let config = RuntimeConfig {
        title: format!("dewarp - {}", path.display()),
        redraw: RedrawMode::Continuous,
        ..RuntimeConfig::default()
    };

    Runtime::run(
        config,
        GpuInit::default(),
        Viewer {
            renderer,
            image: StillImage::new(frame),
        },
    )
}
