use std::mem::size_of;

use anyhow::{Context, Result};
use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use glam::{const_vec2, Affine2, Vec2, Vec4};
use log::debug;
use wgpu::util::DeviceExt;

use crate::{palette::Color, viewport::Size};

const QUAD_VERTICES: [Vec2; 4] = [
    const_vec2!([0., 0.]),
    const_vec2!([1., 0.]),
    const_vec2!([0., 1.]),
    const_vec2!([1., 1.]),
];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

const MIN_INSTANCE_CAPACITY: usize = 256;

#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
#[repr(C)]
struct Uniforms {
    viewport: Vec2,
    _pad0: [f32; 2],
}

/// One filled rectangle: the unit square mapped to pixels by an affine
/// transform.
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct QuadInstance {
    pub x_axis: Vec2,
    pub y_axis: Vec2,
    pub translation: Vec2,
    _pad0: [f32; 2],
    pub color: Vec4,
}

impl QuadInstance {
    pub fn new(transform: Affine2, color: Color) -> Self {
        Self {
            x_axis: transform.matrix2.x_axis,
            y_axis: transform.matrix2.y_axis,
            translation: transform.translation,
            color: color.to_linear(),
            ..Default::default()
        }
    }

    /// Pixel position of a unit-square corner.
    pub fn corner(&self, corner: Vec2) -> Vec2 {
        self.x_axis * corner.x + self.y_axis * corner.y + self.translation
    }
}

pub struct ConfettiRenderer {
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
    bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,
}

impl ConfettiRenderer {
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: Size,
        instances: &[QuadInstance],
    ) {
        if instances.len() > self.instance_capacity {
            let capacity = instances.len().next_power_of_two();
            debug!(
                "Growing confetti instance buffer {} -> {}",
                self.instance_capacity, capacity
            );
            self.instance_buffer = make_instance_buffer(device, capacity);
            self.instance_capacity = capacity;
        }

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, cast_slice(instances));
        }
        self.instance_count = instances.len() as _;

        let uniforms = Uniforms {
            viewport: Vec2::new(size.width as f32, size.height as f32),
            ..Default::default()
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(&uniforms));
    }

    pub fn draw<'rpass>(&'rpass self, rpass: &mut wgpu::RenderPass<'rpass>) {
        if self.instance_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.render_pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..(QUAD_INDICES.len() as _), 0, 0..self.instance_count);
    }
}

fn make_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Confetti Instance Buffer"),
        size: (capacity * size_of::<QuadInstance>()) as _,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[derive(Default)]
pub struct ConfettiRendererBuilder {
    color_format: Option<wgpu::TextureFormat>,
}

impl ConfettiRendererBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_target_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = Some(format);
        self
    }

    pub fn build(self, device: &wgpu::Device) -> Result<ConfettiRenderer> {
        let color_format = self.color_format.context("No color format provided")?;
        let instance_capacity = MIN_INSTANCE_CAPACITY;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Confetti Vertex Buffer"),
            contents: bytes_of(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Confetti Index Buffer"),
            contents: bytes_of(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = make_instance_buffer(device, instance_capacity);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Confetti Uniform Buffer"),
            size: size_of::<Uniforms>() as _,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size_of::<Uniforms>() as _),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader_module = device.create_shader_module(&wgpu::include_wgsl!("confetti.wgsl"));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Confetti Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<Vec2>() as _,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 0,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<QuadInstance>() as _,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: 0,
                                shader_location: 1,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: 8,
                                shader_location: 2,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: 16,
                                shader_location: 3,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x4,
                                offset: 32,
                                shader_location: 4,
                            },
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[color_format.into()],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Y points down in pixel space, so winding flips; draw both faces.
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Ok(ConfettiRenderer {
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            bind_group,
            render_pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;
    use crate::palette::WHITE;

    #[test]
    fn instance_layout_matches_attributes() {
        assert_eq!(size_of::<QuadInstance>(), 48);
        assert_eq!(size_of::<Uniforms>(), 16);
    }

    #[test]
    fn instance_maps_unit_square() {
        let transform = Affine2::from_translation(vec2(10., 20.)) * Affine2::from_scale(vec2(4., 4.));
        let instance = QuadInstance::new(transform, WHITE);
        assert_eq!(instance.corner(Vec2::ZERO), vec2(10., 20.));
        assert_eq!(instance.corner(Vec2::ONE), vec2(14., 24.));
        assert!(instance.color.abs_diff_eq(Vec4::ONE, 1e-6));
    }
}
