//! The HUD's wgpu surface and frame submission.
//!
//! One render pass per frame: clear to the background, draw canvas strokes
//! and the pen swatch, then glyphon draws the clock, weather, calendar and
//! typing lines over them.

use std::sync::Arc;

use anyhow::anyhow;
use wgpu::{
    Backends, Device, DeviceDescriptor, Instance, InstanceDescriptor, PowerPreference, Queue,
    RequestAdapterOptions, Surface, SurfaceConfiguration, TextureUsages, TextureViewDescriptor,
};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use codehud_core::Rgba;

use super::shapes::ShapePipeline;
use super::text::TextEngine;

/// Surface, device and the two HUD pipelines for the single HUD window.
pub struct GpuState {
    surface: Surface<'static>,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,

    // Strokes and swatch, then text
    shapes: ShapePipeline,
    text: TextEngine,
}

impl GpuState {
    /// Set up the surface for `window`. Prefers a low-power adapter and an
    /// sRGB format; adapter and device requests are awaited with pollster.
    pub fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| anyhow!("No suitable GPU adapter found: {}", e))?;

        tracing::info!(
            "GPU adapter: {} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            label: Some("codehud-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..Default::default()
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("Surface reports no texture formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shapes = ShapePipeline::new(&device, format);
        let text = TextEngine::new(&device, &queue, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            shapes,
            text,
        })
    }

    /// Reconfigure the surface for a new window size. Zero-sized (minimized)
    /// windows are ignored.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn viewport(&self) -> [u32; 2] {
        [self.config.width, self.config.height]
    }

    /// Draw the HUD. `draw_fn` queues this frame's shapes and text.
    ///
    /// Returns `Ok(false)` when the surface was lost or outdated and the frame
    /// was dropped; the next frame uses the reconfigured surface.
    pub fn render_frame(
        &mut self,
        clear_color: Rgba,
        draw_fn: impl FnOnce(&mut ShapePipeline, &mut TextEngine, [u32; 2]),
    ) -> anyhow::Result<bool> {
        let Some(output) = self.acquire()? else {
            return Ok(false);
        };

        let view = output
            .texture
            .create_view(&TextureViewDescriptor::default());

        let viewport = self.viewport();

        draw_fn(&mut self.shapes, &mut self.text, viewport);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.shapes
                .render(&mut pass, &self.device, &self.queue, viewport);
        }

        // Text goes on top of the canvas
        self.text
            .render(&self.device, &self.queue, &mut encoder, &view, viewport);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.shapes.clear();

        Ok(true)
    }

    /// Next swapchain texture, or `None` if this frame should be dropped.
    fn acquire(&mut self) -> anyhow::Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(tex) => Ok(Some(tex)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU out of memory")),
            Err(e) => {
                tracing::warn!("Skipping frame: {:?}", e);
                Ok(None)
            }
        }
    }
}

fn to_wgpu_color(c: Rgba) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}
