//! Glyphon-based text rendering engine.
//!
//! Each frame the caller pushes single-color text regions; render() lays
//! them out, uploads the glyphs and draws them over the shapes.

use glyphon::{
    Attrs, Buffer as GlyphonBuffer, Cache, Color as GColor, Family, FontSystem, Metrics,
    Resolution, Shaping, SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};
use wgpu::{CommandEncoder, Device, MultisampleState, Queue, TextureFormat, TextureView};

use codehud_core::Rgba;

/// Font metrics for the overlay.
pub const FONT_SIZE: f32 = 24.0;
pub const LINE_HEIGHT: f32 = 28.0;

/// One line of text at a pixel position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    pub text: String,
    pub left: f32,
    pub top: f32,
    pub color: Rgba,
}

impl TextRegion {
    pub fn new(text: impl Into<String>, left: f32, top: f32, color: Rgba) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            color,
        }
    }
}

fn to_glyphon(c: Rgba) -> GColor {
    let [r, g, b, a] = c.to_u8();
    GColor::rgba(r, g, b, a)
}

/// The text rendering engine. Wraps glyphon's font system and atlas.
pub struct TextEngine {
    font_system: FontSystem,
    swash_cache: SwashCache,
    viewport: Viewport,
    atlas: TextAtlas,
    renderer: TextRenderer,
    regions: Vec<TextRegion>,
}

impl TextEngine {
    pub fn new(device: &Device, queue: &Queue, format: TextureFormat) -> Self {
        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let renderer = TextRenderer::new(&mut atlas, device, MultisampleState::default(), None);

        Self {
            font_system,
            swash_cache,
            viewport,
            atlas,
            renderer,
            regions: Vec::new(),
        }
    }

    /// Queue a text region for rendering this frame.
    pub fn push_region(&mut self, region: TextRegion) {
        self.regions.push(region);
    }

    /// Render all queued regions in their own pass, then clear the queue.
    pub fn render(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        view: &TextureView,
        viewport: [u32; 2],
    ) {
        if self.regions.is_empty() {
            return;
        }

        self.viewport.update(
            queue,
            Resolution {
                width: viewport[0],
                height: viewport[1],
            },
        );

        let metrics = Metrics::new(FONT_SIZE, LINE_HEIGHT);
        let width = viewport[0] as f32;

        let mut buffers: Vec<GlyphonBuffer> = Vec::with_capacity(self.regions.len());
        for region in &self.regions {
            let mut buffer = GlyphonBuffer::new(&mut self.font_system, metrics);
            buffer.set_size(
                &mut self.font_system,
                Some((width - region.left).max(1.0)),
                Some(LINE_HEIGHT),
            );
            let attrs = Attrs::new()
                .family(Family::SansSerif)
                .color(to_glyphon(region.color));
            buffer.set_text(
                &mut self.font_system,
                &region.text,
                &attrs,
                Shaping::Advanced,
                None,
            );
            buffer.shape_until_scroll(&mut self.font_system, false);
            buffers.push(buffer);
        }

        let text_areas: Vec<TextArea<'_>> = self
            .regions
            .iter()
            .zip(&buffers)
            .map(|(region, buffer)| TextArea {
                buffer,
                left: region.left,
                top: region.top,
                scale: 1.0,
                bounds: TextBounds {
                    left: region.left as i32,
                    top: region.top as i32,
                    right: viewport[0] as i32,
                    bottom: (region.top + LINE_HEIGHT) as i32,
                },
                default_color: to_glyphon(region.color),
                custom_glyphs: &[],
            })
            .collect();

        if let Err(e) = self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            text_areas,
            &mut self.swash_cache,
        ) {
            tracing::warn!("Text prepare failed: {:?}", e);
            self.regions.clear();
            return;
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("text-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load, // Shapes are already drawn
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Err(e) = self.renderer.render(&self.atlas, &self.viewport, &mut pass) {
                tracing::warn!("Text render failed: {:?}", e);
            }
        }

        self.atlas.trim();
        self.regions.clear();
    }
}
