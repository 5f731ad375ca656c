//! wgpu renderer.
//!
//! Draws the field as instanced camera-facing polygons and the hover
//! connections as a line list. There is no depth buffer: dots are painted
//! in field order, lines first.

mod shaders;

#[cfg(feature = "egui")]
pub mod egui_integration;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use winit::window::Window;

use crate::dot::Dot;
use crate::error::GpuError;
use crate::session::Session;

const BACKGROUND: wgpu::Color = wgpu::Color::BLACK;
/// Smallest instance / vertex buffer capacity, in elements.
const MIN_CAPACITY: usize = 1024;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    model_view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    zoom: f32,
    sides: f32,
    _padding: [f32; 2],
}

/// Per-dot instance data.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DotInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

impl DotInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x4];

    pub fn from_dot(dot: &Dot) -> Self {
        Self {
            position: dot.render_position().to_array(),
            size: dot.size.value().max(0.0),
            color: dot.shaded_color(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
}

/// Flatten line segments into a line-list vertex array.
pub fn line_vertices(lines: &[(Vec3, Vec3)]) -> Vec<LineVertex> {
    lines
        .iter()
        .flat_map(|(a, b)| {
            [
                LineVertex { position: a.to_array() },
                LineVertex { position: b.to_array() },
            ]
        })
        .collect()
}

/// A vertex buffer that grows to fit.
struct GrowableBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: usize,
    len: u32,
}

impl GrowableBuffer {
    fn new(device: &wgpu::Device, label: &'static str, element_size: usize) -> Self {
        Self {
            label,
            buffer: Self::allocate(device, label, MIN_CAPACITY * element_size),
            capacity: MIN_CAPACITY * element_size,
            len: 0,
        }
    }

    fn allocate(device: &wgpu::Device, label: &'static str, size: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload<T: Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, items: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(items);
        if bytes.len() > self.capacity {
            self.capacity = bytes.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("grew {} to {} bytes", self.label, self.capacity);
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.len = items.len() as u32;
    }
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    dot_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instances: GrowableBuffer,
    lines: GrowableBuffer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Dot colors are already sRGB-encoded, so render to a linear format.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let dot_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            config.format,
            "Dot Pipeline",
            &shaders::dot_shader(),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<DotInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &DotInstance::ATTRIBUTES,
            },
            wgpu::PrimitiveTopology::TriangleList,
        );

        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            config.format,
            "Line Pipeline",
            &shaders::line_shader(),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &LineVertex::ATTRIBUTES,
            },
            wgpu::PrimitiveTopology::LineList,
        );

        let instances = GrowableBuffer::new(&device, "Dot Instances", std::mem::size_of::<DotInstance>());
        let lines = GrowableBuffer::new(&device, "Connection Lines", std::mem::size_of::<LineVertex>());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            dot_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            instances,
            lines,
        })
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Re-apply the current surface configuration after a lost surface.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload uniforms, dot instances and connection lines for this frame.
    pub fn prepare(&mut self, session: &Session) {
        let viewport = session.viewport();
        let rig = session.rig();
        let uniforms = Uniforms {
            model_view: rig.model_view(viewport).to_cols_array_2d(),
            proj: rig.projection(viewport).to_cols_array_2d(),
            zoom: rig.zoom,
            sides: session.settings().dot_sides as f32,
            _padding: [0.0; 2],
        };
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let instances: Vec<DotInstance> = session.dots().iter().map(DotInstance::from_dot).collect();
        self.instances.upload(&self.device, &self.queue, &instances);

        let lines = line_vertices(&session.connection_lines());
        self.lines.upload(&self.device, &self.queue, &lines);
    }

    /// Draw the prepared frame. `overlay` runs after the field pass with the
    /// same encoder and target view, for UI drawn on top.
    pub fn render<F>(&mut self, overlay: F) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Field Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if self.lines.len > 0 {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.lines.buffer.slice(..));
                render_pass.draw(0..self.lines.len, 0..1);
            }

            if self.instances.len > 0 {
                render_pass.set_pipeline(&self.dot_pipeline);
                render_pass.set_vertex_buffer(0, self.instances.buffer.slice(..));
                render_pass.draw(0..6, 0..self.instances.len);
            }
        }

        overlay(&self.device, &self.queue, &mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    label: &'static str,
    source: &str,
    buffer: wgpu::VertexBufferLayout<'_>,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[buffer],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::Track;

    #[test]
    fn test_layouts_are_packed() {
        assert_eq!(std::mem::size_of::<DotInstance>(), 32);
        assert_eq!(std::mem::size_of::<LineVertex>(), 12);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn test_instance_from_dot() {
        let mut dot = Dot {
            position: Track::new(Vec3::new(1.0, 2.0, 3.0)),
            offset: Vec3::new(0.5, 0.0, -1.0),
            home: Vec3::ZERO,
            size: Track::new(6.0),
            target_size: 6.0,
            opacity: Track::new(0.25),
            color: [255, 0, 0],
            usecase: 0,
            noise_seed: Vec3::ZERO,
            layer: 0,
            parity: 0,
        };
        let inst = DotInstance::from_dot(&dot);
        assert_eq!(inst.position, [1.5, 2.0, 2.0]);
        assert_eq!(inst.size, 6.0);
        assert_eq!(inst.color, [1.0, 0.0, 0.0, 0.25]);

        dot.size.set(-0.1);
        assert_eq!(DotInstance::from_dot(&dot).size, 0.0);
    }

    #[test]
    fn test_line_vertices() {
        let v = line_vertices(&[(Vec3::X, Vec3::Y), (Vec3::Z, Vec3::ONE)]);
        assert_eq!(v.len(), 4);
        assert_eq!(v[1].position, [0.0, 1.0, 0.0]);
        assert_eq!(v[3].position, [1.0, 1.0, 1.0]);
    }
}
