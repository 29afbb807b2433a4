//! WebGPU render pipeline setup

use std::fmt;

use wgpu::util::DeviceExt;

use super::vertex::{Vertex, colors};

/// Failure while bringing up the GPU side
#[derive(Debug)]
pub enum RenderInitError {
    CreateSurface(wgpu::CreateSurfaceError),
    RequestAdapter(wgpu::RequestAdapterError),
    RequestDevice(wgpu::RequestDeviceError),
    /// Surface reports no usable texture format
    NoSurfaceFormat,
}

impl fmt::Display for RenderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderInitError::CreateSurface(e) => write!(f, "failed to create surface: {e}"),
            RenderInitError::RequestAdapter(e) => write!(f, "no suitable GPU adapter: {e}"),
            RenderInitError::RequestDevice(e) => write!(f, "failed to create device: {e}"),
            RenderInitError::NoSurfaceFormat => write!(f, "surface has no supported formats"),
        }
    }
}

impl std::error::Error for RenderInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderInitError::CreateSurface(e) => Some(e),
            RenderInitError::RequestAdapter(e) => Some(e),
            RenderInitError::RequestDevice(e) => Some(e),
            RenderInitError::NoSurfaceFormat => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for RenderInitError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        RenderInitError::CreateSurface(e)
    }
}

impl From<wgpu::RequestAdapterError> for RenderInitError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        RenderInitError::RequestAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for RenderInitError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RenderInitError::RequestDevice(e)
    }
}

/// Map viewport pixels (origin top-left, y down) to clip space
pub fn pixel_to_ndc(x: f32, y: f32, width: f32, height: f32) -> [f32; 2] {
    if width <= 0.0 || height <= 0.0 {
        return [0.0, 0.0];
    }
    [x / width * 2.0 - 1.0, 1.0 - y / height * 2.0]
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    /// Backing size in physical pixels
    pub size: (u32, u32),
    /// Viewport in CSS pixels (the coordinate space vertices arrive in)
    pub logical: (f32, f32),
    clear: wgpu::Color,
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        logical: (f32, f32),
    ) -> Result<Self, RenderInitError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("heart-catch-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderInitError::NoSurfaceFormat)?;

        // The canvas floats over the page; keep it see-through when we can
        let transparent = surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied);
        let alpha_mode = if transparent {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let clear = if transparent {
            wgpu::Color::TRANSPARENT
        } else {
            let [r, g, b, a] = colors::BACKGROUND.map(f64::from);
            wgpu::Color { r, g, b, a }
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("render_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    // Shader outputs premultiplied color
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
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
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertex_buffer"),
            contents: bytemuck::cast_slice(&[Vertex::new(0.0, 0.0, [0.0; 4])]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        log::info!("Renderer ready ({:?}, {}x{})", surface_format, config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_count: 0,
            size: (width, height),
            logical,
            clear,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32, logical: (f32, f32)) {
        self.logical = logical;
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure with the current size (after `SurfaceError::Lost`)
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload vertices (viewport pixels) and render
    pub fn render(&mut self, vertices: &[Vertex]) -> Result<(), wgpu::SurfaceError> {
        let (w, h) = self.logical;
        let ndc_vertices: Vec<Vertex> = vertices
            .iter()
            .map(|v| Vertex {
                position: pixel_to_ndc(v.position[0], v.position[1], w, h),
                color: v.color,
            })
            .collect();

        // Recreate buffer every frame; a few thousand vertices at most
        if !ndc_vertices.is_empty() {
            self.vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("vertex_buffer"),
                    contents: bytemuck::cast_slice(&ndc_vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
        }
        self.vertex_count = ndc_vertices.len() as u32;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if self.vertex_count > 0 {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..self.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_ndc_corners() {
        assert_eq!(pixel_to_ndc(0.0, 0.0, 800.0, 600.0), [-1.0, 1.0]);
        assert_eq!(pixel_to_ndc(800.0, 600.0, 800.0, 600.0), [1.0, -1.0]);
        assert_eq!(pixel_to_ndc(400.0, 300.0, 800.0, 600.0), [0.0, 0.0]);
    }

    #[test]
    fn test_pixel_to_ndc_degenerate_viewport() {
        assert_eq!(pixel_to_ndc(10.0, 10.0, 0.0, 600.0), [0.0, 0.0]);
    }

    #[test]
    fn test_error_display() {
        let e = RenderInitError::NoSurfaceFormat;
        assert_eq!(e.to_string(), "surface has no supported formats");
        assert!(std::error::Error::source(&e).is_none());
    }
}
