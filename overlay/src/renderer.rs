//! Software renderer using tiny-skia and cosmic-text
//!
//! Draws into a caller-owned RGBA buffer that is later color keyed: one exact
//! RGB value becomes transparent and everything else is presented opaque.
//! Partial coverage cannot survive that, so shapes are drawn without
//! anti-aliasing and glyph masks are thresholded instead of blended.
#![allow(clippy::too_many_arguments)]
use std::collections::HashMap;

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, LayoutGlyph, Metrics, Shaping, SwashCache, SwashContent,
};
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, PixmapMut, Rect, Stroke, Transform};

/// Glyph mask coverage at or above this is painted; anything lower is dropped.
const COVERAGE_THRESHOLD: u8 = 128;

/// Shaped strings kept between frames. Gauge values change slowly, so this
/// mostly holds digits, labels and units.
const SHAPE_CACHE_CAPACITY: usize = 256;

struct ShapedText {
    glyphs: Vec<LayoutGlyph>,
    width: f32,
    height: f32,
    last_used: u64,
}

/// Shaped text keyed by font size (tenths of a pixel), then by string.
#[derive(Default)]
struct ShapeCache {
    by_size: HashMap<u32, HashMap<String, ShapedText>>,
    clock: u64,
}

impl ShapeCache {
    fn size_key(font_size: f32) -> u32 {
        (font_size * 10.0).round() as u32
    }

    fn len(&self) -> usize {
        self.by_size.values().map(HashMap::len).sum()
    }

    /// Look up without allocating, marking the entry as recently used.
    fn touch(&mut self, text: &str, size: u32) -> Option<&ShapedText> {
        self.clock += 1;
        let clock = self.clock;
        let entry = self.by_size.get_mut(&size)?.get_mut(text)?;
        entry.last_used = clock;
        Some(entry)
    }

    fn get(&self, text: &str, size: u32) -> Option<&ShapedText> {
        self.by_size.get(&size)?.get(text)
    }

    fn insert(&mut self, text: &str, size: u32, glyphs: Vec<LayoutGlyph>, width: f32, height: f32) {
        self.clock += 1;
        self.by_size.entry(size).or_default().insert(
            text.to_string(),
            ShapedText {
                glyphs,
                width,
                height,
                last_used: self.clock,
            },
        );
        self.evict();
    }

    /// Drop the least recently used quarter once over capacity.
    fn evict(&mut self) {
        let len = self.len();
        if len <= SHAPE_CACHE_CAPACITY {
            return;
        }
        let mut ages: Vec<(u64, u32, String)> = self
            .by_size
            .iter()
            .flat_map(|(size, texts)| {
                texts
                    .iter()
                    .map(move |(text, shaped)| (shaped.last_used, *size, text.clone()))
            })
            .collect();
        ages.sort_unstable_by_key(|(last_used, _, _)| *last_used);

        let drop_count = len - SHAPE_CACHE_CAPACITY * 3 / 4;
        for (_, size, text) in ages.into_iter().take(drop_count) {
            if let Some(texts) = self.by_size.get_mut(&size) {
                texts.remove(&text);
            }
        }
        self.by_size.retain(|_, texts| !texts.is_empty());
    }
}

/// A software renderer for overlay content
pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    shapes: ShapeCache,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            shapes: ShapeCache::default(),
        }
    }

    /// Shape `text` unless cached. Returns (width, height).
    fn shape(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let size = ShapeCache::size_key(font_size);
        if let Some(shaped) = self.shapes.touch(text, size) {
            return (shaped.width, shaped.height);
        }

        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        let attrs = Attrs::new().family(Family::Monospace);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
            glyphs.extend(run.glyphs.iter().cloned());
        }

        self.shapes.insert(text, size, glyphs, width, height);
        (width, height)
    }

    /// Create a new pixel buffer (RGBA format)
    pub fn create_buffer(width: u32, height: u32) -> Vec<u8> {
        vec![0u8; (width * height * 4) as usize]
    }

    pub fn clear(&self, buffer: &mut [u8], width: u32, height: u32, color: Color) {
        if let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) {
            pixmap.fill(color);
        }
    }

    pub fn fill_rect(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        pixmap.fill_rect(rect, &solid_paint(color), Transform::identity(), None);
    }

    pub fn stroke_rect(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        stroke_width: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let stroke = Stroke {
            width: stroke_width,
            line_cap: LineCap::Square,
            line_join: LineJoin::Miter,
            ..Default::default()
        };
        pixmap.stroke_path(
            &PathBuilder::from_rect(rect),
            &solid_paint(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    /// Draw text with its baseline at `y`.
    pub fn draw_text(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        if buf_width as usize * buf_height as usize * 4 != buffer.len() {
            return;
        }
        self.shape(text, font_size);

        let Some(shaped) = self.shapes.get(text, ShapeCache::size_key(font_size)) else {
            return;
        };
        let mut target = Target {
            data: buffer,
            width: buf_width as i32,
            height: buf_height as i32,
        };
        let rgba = opaque_rgba(color);

        for glyph in &shaped.glyphs {
            let physical = glyph.physical((x, y), 1.0);
            let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical.cache_key)
            else {
                continue;
            };
            let origin_x = physical.x + image.placement.left;
            let origin_y = physical.y - image.placement.top;
            let (w, h) = (image.placement.width, image.placement.height);

            match image.content {
                SwashContent::Mask => target.stamp_mask(&image.data, w, h, origin_x, origin_y, rgba),
                SwashContent::Color => target.stamp_color(&image.data, w, h, origin_x, origin_y),
                // Per-channel coverage; the strongest channel decides
                SwashContent::SubpixelMask => {
                    let coverage: Vec<u8> = image
                        .data
                        .chunks_exact(4)
                        .map(|p| p[0].max(p[1]).max(p[2]))
                        .collect();
                    target.stamp_mask(&coverage, w, h, origin_x, origin_y, rgba);
                }
            }
        }
    }

    /// Measure text dimensions (uses shaping cache)
    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.shape(text, font_size)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = false;
    paint
}

/// Color as opaque RGBA bytes. Translucent colors are not representable after keying.
fn opaque_rgba(color: Color) -> [u8; 4] {
    let c = color.to_color_u8();
    [c.red(), c.green(), c.blue(), 255]
}

/// RGBA pixel rows glyph images are stamped into.
struct Target<'a> {
    data: &'a mut [u8],
    width: i32,
    height: i32,
}

impl Target<'_> {
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(((y * self.width + x) * 4) as usize)
    }

    /// Paint `rgba` wherever the coverage mask reaches the threshold.
    fn stamp_mask(&mut self, mask: &[u8], w: u32, h: u32, x: i32, y: i32, rgba: [u8; 4]) {
        for (i, &coverage) in mask.iter().enumerate().take((w * h) as usize) {
            if coverage < COVERAGE_THRESHOLD {
                continue;
            }
            let (gx, gy) = ((i as u32 % w) as i32, (i as u32 / w) as i32);
            if let Some(at) = self.offset(x + gx, y + gy) {
                self.data[at..at + 4].copy_from_slice(&rgba);
            }
        }
    }

    /// Color glyphs (emoji) keep their own pixels, thresholded on alpha.
    fn stamp_color(&mut self, pixels: &[u8], w: u32, h: u32, x: i32, y: i32) {
        for (i, px) in pixels.chunks_exact(4).enumerate().take((w * h) as usize) {
            if px[3] < COVERAGE_THRESHOLD {
                continue;
            }
            let (gx, gy) = ((i as u32 % w) as i32, (i as u32 / w) as i32);
            if let Some(at) = self.offset(x + gx, y + gy) {
                self.data[at..at + 4].copy_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
    }
}
