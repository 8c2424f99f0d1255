use crate::device::{DeviceErrorScope, DeviceLost, GpuContext, RenderSurface};
use crate::error::RenderError;
use crate::projection::{ProjectionParameters, Resolution, ViewSettings};
use crate::source::{SourceFrame, BYTES_PER_PIXEL};

use super::uniform::ProjectionUniform;

/// Format source frames are uploaded in. Pixels are sRGB-encoded RGBA8.
const SOURCE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Session-level renderer options.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RendererConfig {
    /// Clear color of the render pass. Pixels outside the projected frustum are
    /// always opaque black, independent of this value.
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
        }
    }
}

/// Drives one projection draw per call.
///
/// GPU resources are split by scope:
/// - session: pipeline, sampler, uniform buffer and the sampler/uniform bind
///   group, created by [`initialize`](Self::initialize) and kept until a fatal
///   error or [`reset`](Self::reset)
/// - frame: the source texture and its bind group, created inside
///   [`render_frame`](Self::render_frame) and dropped before it returns
///
/// No internal synchronization: one render loop owns the renderer.
pub struct FrameRenderer {
    config: RendererConfig,
    settings: ViewSettings,
    state: Option<RendererState>,
    last_params: Option<ProjectionParameters>,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl FrameRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            settings: ViewSettings::default(),
            state: None,
            last_params: None,
        }
    }

    /// Creates the session resources for `gpu`, targeting `format`.
    ///
    /// Replaces any existing state; this is also how a caller recovers after a
    /// fatal [`RenderError::Device`].
    pub fn initialize(
        &mut self,
        gpu: &GpuContext,
        format: wgpu::TextureFormat,
    ) -> Result<(), RenderError> {
        if gpu.is_lost() {
            return Err(RenderError::Device("cannot initialize on a lost device".into()));
        }
        self.state = Some(RendererState::new(gpu, format)?);
        log::debug!("projection renderer initialized for {format:?}");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Drops all session resources.
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn settings(&self) -> ViewSettings {
        self.settings
    }

    /// Parameters used by the most recent successful frame.
    pub fn last_parameters(&self) -> Option<ProjectionParameters> {
        self.last_params
    }

    /// Validates and applies new controls.
    ///
    /// On error the previous settings stay in effect.
    pub fn set_parameters(
        &mut self,
        hfov_degrees: f32,
        resolution: Option<Resolution>,
    ) -> Result<(), RenderError> {
        let settings = ViewSettings::new(hfov_degrees, resolution)?;
        self.apply_settings(settings)
    }

    /// Applies settings that were validated on construction.
    ///
    /// Once initialized, a resolution above the device's texture limit is
    /// rejected here and the previous settings stay in effect. Before that it
    /// is only caught when a frame is rendered.
    pub fn apply_settings(&mut self, settings: ViewSettings) -> Result<(), RenderError> {
        if let (Some(state), Some(res)) = (&self.state, settings.resolution()) {
            check_output_size(res, state.max_texture_dimension)?;
        }
        log::debug!(
            "view settings: hfov {} deg, resolution {:?}",
            settings.hfov_degrees(),
            settings.resolution()
        );
        self.settings = settings;
        Ok(())
    }

    /// Reprojects `source` into the current frame of `surface`.
    ///
    /// Validation failures are reported before anything is submitted, so the
    /// surface keeps its previous image. Fatal errors drop the session state.
    pub fn render_frame(
        &mut self,
        surface: &mut dyn RenderSurface,
        source: &SourceFrame<'_>,
    ) -> Result<(), RenderError> {
        let Some(state) = self.state.as_mut() else {
            return Err(RenderError::NotInitialized);
        };

        match state.render(surface, source, &self.settings, &self.config) {
            Ok(params) => {
                self.last_params = Some(params);
                Ok(())
            }
            Err(err) => {
                if err.is_fatal() {
                    log::error!("renderer state invalidated: {err}");
                    self.state = None;
                }
                Err(err)
            }
        }
    }
}

/// Session-scope GPU resources.
struct RendererState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    lost: DeviceLost,
    max_texture_dimension: u32,

    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipeline_format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,

    _sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    session_bind_group: wgpu::BindGroup,
    frame_bind_group_layout: wgpu::BindGroupLayout,
}

/// Frame-scope GPU resources. Never stored past one `render` call.
struct FrameBindings {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl RendererState {
    fn new(gpu: &GpuContext, format: wgpu::TextureFormat) -> Result<Self, RenderError> {
        let device = gpu.device();
        let scope = DeviceErrorScope::begin(device);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("dewarp projection shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/projection.wgsl").into()),
        });

        let session_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dewarp session bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(ProjectionUniform::min_binding_size()),
                    },
                    count: None,
                },
            ],
        });

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("dewarp frame bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("dewarp pipeline layout"),
            bind_group_layouts: &[&session_layout, &frame_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = create_pipeline(device, &shader, &pipeline_layout, format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("dewarp source sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dewarp projection ubo"),
            size: ProjectionUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let session_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dewarp session bind group"),
            layout: &session_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        scope.finish("renderer setup")?;

        Ok(Self {
            device: device.clone(),
            queue: gpu.queue().clone(),
            lost: gpu.lost().clone(),
            max_texture_dimension: device.limits().max_texture_dimension_2d,
            shader,
            pipeline_layout,
            pipeline_format: format,
            pipeline,
            _sampler: sampler,
            uniform_buffer,
            session_bind_group,
            frame_bind_group_layout,
        })
    }

    fn render(
        &mut self,
        surface: &mut dyn RenderSurface,
        source: &SourceFrame<'_>,
        settings: &ViewSettings,
        config: &RendererConfig,
    ) -> Result<ProjectionParameters, RenderError> {
        if self.lost.is_lost() {
            return Err(RenderError::Device("device lost".into()));
        }

        // Validation: nothing below may fail after work has been submitted.
        source.validate()?;
        if source.width > self.max_texture_dimension || source.height > self.max_texture_dimension
        {
            return Err(RenderError::Source(format!(
                "{}x{} exceeds the device texture limit of {}",
                source.width, source.height, self.max_texture_dimension
            )));
        }

        if let Some(res) = settings.resolution() {
            check_output_size(res, self.max_texture_dimension)?;
        }

        // Covers surface reallocation, upload and the pass; failures are fatal.
        let scope = DeviceErrorScope::begin(&self.device);

        if let Some(res) = settings.resolution() {
            if surface.size() != (res.width, res.height) {
                surface.resize(res.width, res.height);
            }
        }
        let (out_w, out_h) = surface.size();
        let params =
            ProjectionParameters::for_frame(source, settings.hfov_radians(), out_w, out_h)?;

        self.ensure_pipeline(surface.format());

        let frame = surface.acquire()?;

        // Staged on the queue; executes before the command buffer submitted below.
        let uniform = ProjectionUniform::from(&params);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let bindings = self.import(source);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dewarp frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("dewarp projection pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.session_bind_group, &[]);
            rpass.set_bind_group(1, &bindings.bind_group, &[]);
            rpass.draw(0..4, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        scope.finish("frame")?;
        surface.present(frame);

        Ok(params)
    }

    /// Uploads `source` into a fresh texture and binds it.
    fn import(&self, source: &SourceFrame<'_>) -> FrameBindings {
        let size = wgpu::Extent3d {
            width: source.width,
            height: source.height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("dewarp source frame"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SOURCE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            source.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(source.width * BYTES_PER_PIXEL as u32),
                rows_per_image: Some(source.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("dewarp frame bind group"),
            layout: &self.frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            }],
        });

        FrameBindings {
            _texture: texture,
            bind_group,
        }
    }

    fn ensure_pipeline(&mut self, format: wgpu::TextureFormat) {
        if self.pipeline_format == format {
            return;
        }
        log::debug!(
            "surface format changed {:?} -> {format:?}; rebuilding pipeline",
            self.pipeline_format
        );
        self.pipeline = create_pipeline(&self.device, &self.shader, &self.pipeline_layout, format);
        self.pipeline_format = format;
    }
}

fn check_output_size(res: Resolution, max_dimension: u32) -> Result<(), RenderError> {
    if res.width > max_dimension || res.height > max_dimension {
        return Err(RenderError::invalid(format!(
            "resolution {}x{} exceeds the device texture limit of {max_dimension}",
            res.width, res.height
        )));
    }
    Ok(())
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("dewarp projection pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::OwnedFrame;

    struct NoSurface;

    impl RenderSurface for NoSurface {
        fn format(&self) -> wgpu::TextureFormat {
            wgpu::TextureFormat::Rgba8UnormSrgb
        }
        fn size(&self) -> (u32, u32) {
            (4, 4)
        }
        fn resize(&mut self, _: u32, _: u32) {}
        fn acquire(&mut self) -> Result<crate::device::SurfaceFrame, RenderError> {
            Err(RenderError::FrameSkipped("no surface".into()))
        }
    }

    #[test]
    fn render_before_initialize_fails() {
        let mut r = FrameRenderer::default();
        let src = OwnedFrame::solid(2, 2, [0; 4]);
        let err = r.render_frame(&mut NoSurface, &src.as_source()).unwrap_err();
        assert_eq!(err, RenderError::NotInitialized);
        assert!(r.last_parameters().is_none());
    }

    #[test]
    fn rejected_parameters_keep_last_good_settings() {
        let mut r = FrameRenderer::default();
        r.set_parameters(120.0, Some(Resolution { width: 640, height: 480 }))
            .unwrap();

        assert!(r.set_parameters(180.0, None).is_err());
        assert!(r.set_parameters(90.0, Some(Resolution { width: 0, height: 480 })).is_err());

        let s = r.settings();
        assert_eq!(s.hfov_degrees(), 120.0);
        assert_eq!(s.resolution(), Some(Resolution { width: 640, height: 480 }));
    }

    #[test]
    fn output_size_is_bounded_by_device_limit() {
        let at_limit = Resolution { width: 2048, height: 16 };
        let above = Resolution { width: 2049, height: 16 };

        assert_eq!(check_output_size(at_limit, 2048), Ok(()));
        assert!(matches!(
            check_output_size(above, 2048),
            Err(RenderError::InvalidParameters(_))
        ));
    }

    #[test]
    fn default_clear_color_is_opaque_black() {
        let r = FrameRenderer::default();
        assert_eq!(r.config().clear_color, wgpu::Color::BLACK);
        assert!(!r.is_initialized());
    }
}
