//! Flat-colored shape pipeline.
//!
//! Two layers share one pipeline:
//!   retained: canvas strokes, appended as the canvas grows, never cleared
//!   frame   : per-frame rectangles (pen swatch), cleared after each frame
//!
//! The retained layer lives in one GPU buffer whose capacity doubles when it
//! fills. Each frame writes only the vertices added since the last upload;
//! the whole layer is re-sent only when the buffer is reallocated. The layer
//! stops growing at the device's `max_buffer_size`.
//!
//! Everything is triangles with per-vertex color, drawn by shapes.wgsl.

use wgpu::util::DeviceExt;
use wgpu::{
    Buffer, BufferAddress, BufferUsages, Device, Queue, RenderPass, RenderPipeline, TextureFormat,
};

use codehud_core::{Canvas, Point, Rgba, Segment};

// ════════════════════════════════════════════════════════════════════
// Vertex Layout
// ════════════════════════════════════════════════════════════════════

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ShapeVertex {
    pos: [f32; 2],
    color: [f32; 4],
}

const VERTEX_SIZE: BufferAddress = std::mem::size_of::<ShapeVertex>() as BufferAddress;

/// Vertices per canvas segment (two triangles).
const SEGMENT_VERTICES: usize = 6;

/// Smallest retained buffer, in vertices.
pub const MIN_RETAINED_VERTICES: u64 = 6 * 1024;

impl ShapeVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: VERTEX_SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    resolution: [f32; 2],
    _pad: [f32; 2],
}

// ════════════════════════════════════════════════════════════════════
// Geometry
// ════════════════════════════════════════════════════════════════════

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: Rgba,
}

/// Corners of the quad covering a stroke from `from` to `to`, with square
/// caps extending half the width past each end. Order: the two corners at
/// `from`, then the two at `to`.
///
/// Returns `None` for a zero-length segment; callers draw a dot instead.
pub fn segment_corners(from: Point, to: Point, width: f32) -> Option<[[f32; 2]; 4]> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return None;
    }

    let half = width / 2.0;
    // Unit direction, scaled to half the width
    let (ux, uy) = (dx / len * half, dy / len * half);
    // Normal
    let (nx, ny) = (-uy, ux);

    let (ax, ay) = (from.x - ux, from.y - uy);
    let (bx, by) = (to.x + ux, to.y + uy);

    Some([
        [ax + nx, ay + ny],
        [ax - nx, ay - ny],
        [bx + nx, by + ny],
        [bx - nx, by - ny],
    ])
}

/// Vertex capacity that holds `needed` vertices, doubling from `current`
/// (at least [`MIN_RETAINED_VERTICES`]) and clamped to `max`.
///
/// Returns `current` unchanged when it already fits, and `None` when
/// `needed` exceeds `max`.
pub fn grown_capacity(current: u64, needed: u64, max: u64) -> Option<u64> {
    if needed > max {
        return None;
    }
    if needed <= current {
        return Some(current);
    }
    let mut capacity = current.max(MIN_RETAINED_VERTICES);
    while capacity < needed {
        capacity = capacity.saturating_mul(2);
    }
    Some(capacity.min(max))
}

fn color_of(c: Rgba) -> [f32; 4] {
    [c.r, c.g, c.b, c.a]
}

fn push_quad(out: &mut Vec<ShapeVertex>, corners: [[f32; 2]; 4], color: [f32; 4]) {
    let [a, b, c, d] = corners;
    for pos in [a, b, c, b, d, c] {
        out.push(ShapeVertex { pos, color });
    }
}

fn push_rect(out: &mut Vec<ShapeVertex>, rect: Rect) {
    let (x0, y0, x1, y1) = (rect.x, rect.y, rect.x + rect.w, rect.y + rect.h);
    push_quad(
        out,
        [[x0, y0], [x0, y1], [x1, y0], [x1, y1]],
        color_of(rect.color),
    );
}

fn push_segment(out: &mut Vec<ShapeVertex>, seg: &Segment) {
    match segment_corners(seg.from, seg.to, seg.width) {
        Some(corners) => push_quad(out, corners, color_of(seg.color)),
        None => {
            let half = seg.width / 2.0;
            push_rect(
                out,
                Rect {
                    x: seg.from.x - half,
                    y: seg.from.y - half,
                    w: seg.width,
                    h: seg.width,
                    color: seg.color,
                },
            );
        }
    }
}

// ════════════════════════════════════════════════════════════════════
// Pipeline
// ════════════════════════════════════════════════════════════════════

pub struct ShapePipeline {
    pipeline: RenderPipeline,
    globals_buffer: Buffer,
    globals_bind_group: wgpu::BindGroup,

    // CPU copy of the retained layer, re-sent when the buffer is reallocated
    retained: Vec<ShapeVertex>,
    retained_segments: usize,
    retained_buffer: Option<Buffer>,
    retained_capacity: u64,
    retained_uploaded: usize,
    max_retained: u64,
    canvas_full: bool,

    frame: Vec<ShapeVertex>,
}

impl ShapePipeline {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shapes.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shapes.wgsl").into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shape-globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shape-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shape-bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shape-pl"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shape-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ShapeVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            cache: None,
            multiview_mask: None,
        });

        Self {
            pipeline,
            globals_buffer,
            globals_bind_group,
            retained: Vec::new(),
            retained_segments: 0,
            retained_buffer: None,
            retained_capacity: 0,
            retained_uploaded: 0,
            max_retained: max_retained_vertices(device),
            canvas_full: false,
            frame: Vec::new(),
        }
    }

    /// Append canvas segments added since the last sync.
    ///
    /// Segments past the retained layer's limit are dropped with a warning.
    pub fn sync_canvas(&mut self, canvas: &Canvas) {
        let segments = canvas.segments();
        if segments.len() < self.retained_segments {
            // A different canvas; start over. The buffer is reused.
            self.retained.clear();
            self.retained_segments = 0;
            self.retained_uploaded = 0;
            self.canvas_full = false;
        }
        if segments.len() == self.retained_segments {
            return;
        }

        for seg in &segments[self.retained_segments..] {
            if (self.retained.len() + SEGMENT_VERTICES) as u64 > self.max_retained {
                if !self.canvas_full {
                    tracing::warn!(
                        segments = self.retained_segments,
                        "Canvas reached the GPU buffer limit; further strokes are not drawn"
                    );
                    self.canvas_full = true;
                }
                break;
            }
            push_segment(&mut self.retained, seg);
        }
        self.retained_segments = segments.len();
    }

    /// Send retained vertices added since the last upload, growing the
    /// buffer first if they do not fit.
    fn upload_retained(&mut self, device: &Device, queue: &Queue) {
        if self.retained_uploaded >= self.retained.len() {
            return;
        }

        let needed = self.retained.len() as u64;
        if needed > self.retained_capacity {
            let Some(capacity) = grown_capacity(self.retained_capacity, needed, self.max_retained)
            else {
                return;
            };
            tracing::debug!(vertices = capacity, "Growing canvas vertex buffer");
            self.retained_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("canvas-vb"),
                size: capacity * VERTEX_SIZE,
                usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.retained_capacity = capacity;
            self.retained_uploaded = 0;
        }

        if let Some(vb) = &self.retained_buffer {
            let start = self.retained_uploaded;
            queue.write_buffer(
                vb,
                start as BufferAddress * VERTEX_SIZE,
                bytemuck::cast_slice(&self.retained[start..]),
            );
            self.retained_uploaded = self.retained.len();
        }
    }

    /// Queue a rectangle for this frame only.
    pub fn push_rect(&mut self, rect: Rect) {
        push_rect(&mut self.frame, rect);
    }

    /// Clear the per-frame layer. The retained layer is untouched.
    pub fn clear(&mut self) {
        self.frame.clear();
    }

    /// Draw the retained layer, then this frame's shapes.
    pub fn render(
        &mut self,
        pass: &mut RenderPass<'_>,
        device: &Device,
        queue: &Queue,
        viewport: [u32; 2],
    ) {
        self.upload_retained(device, queue);

        if self.retained_uploaded == 0 && self.frame.is_empty() {
            return;
        }

        let globals = Globals {
            resolution: [viewport[0] as f32, viewport[1] as f32],
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);

        if let Some(vb) = self.retained_buffer.as_ref().filter(|_| self.retained_uploaded > 0) {
            let used = self.retained_uploaded as BufferAddress * VERTEX_SIZE;
            pass.set_vertex_buffer(0, vb.slice(..used));
            pass.draw(0..self.retained_uploaded as u32, 0..1);
        }

        if !self.frame.is_empty() {
            let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("frame-shapes-vb"),
                contents: bytemuck::cast_slice(&self.frame),
                usage: BufferUsages::VERTEX,
            });
            pass.set_vertex_buffer(0, vb.slice(..));
            pass.draw(0..self.frame.len() as u32, 0..1);
        }
    }
}

/// Retained-layer vertex limit for this device.
fn max_retained_vertices(device: &Device) -> u64 {
    (device.limits().max_buffer_size / VERTEX_SIZE).min(u32::MAX as u64)
}
