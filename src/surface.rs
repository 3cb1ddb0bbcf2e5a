use kurbo::{Point, Rect};

use crate::core::{Rgba8, Viewport};

/// Text overlay entry. Glyph rasterization is left to the presentation shell;
/// the engine keeps labels structured so scenes (and tests) can inspect them.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Label {
    pub text: String,
    pub pos: Point,
    pub size_px: f32,
    pub color: Rgba8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The drawing surface owned by exactly one scene instance: an RGBA8 raster
/// plus a label overlay. Fully repainted (never patched) on every tick.
#[derive(Clone, Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
    labels: Vec<Label>,
}

impl Surface {
    pub fn new(viewport: Viewport) -> Self {
        let n = viewport.width as usize * viewport.height as usize;
        Self {
            width: viewport.width,
            height: viewport.height,
            pixels: vec![Rgba8::new(0, 0, 0, 0); n],
            labels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Reset the whole surface to `color` and drop all labels. Draw functions
    /// call this first; nothing accumulates between frames.
    pub fn clear(&mut self, color: Rgba8) {
        self.pixels.fill(color);
        self.labels.clear();
    }

    fn blend_px(&mut self, x: i64, y: i64, color: Rgba8) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = color.over(self.pixels[idx]);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        if !rect_is_finite(&rect) {
            return;
        }
        let r = rect.abs();
        let x0 = r.x0.floor().max(0.0) as i64;
        let y0 = r.y0.floor().max(0.0) as i64;
        let x1 = r.x1.ceil().min(f64::from(self.width)) as i64;
        let y1 = r.y1.ceil().min(f64::from(self.height)) as i64;
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_px(x, y, color);
            }
        }
    }

    pub fn stroke_line(&mut self, a: Point, b: Point, width: f64, color: Rgba8) {
        if !point_is_finite(a) || !point_is_finite(b) || !width.is_finite() || width <= 0.0 {
            return;
        }
        let len = a.distance(b);
        // One stamp per half pixel keeps thick strokes gap-free.
        let steps = (len * 2.0).ceil().max(1.0) as usize;
        let half = width / 2.0;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let p = a.lerp(b, t);
            self.fill_rect(
                Rect::new(p.x - half, p.y - half, p.x + half, p.y + half),
                color,
            );
        }
    }

    pub fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Rgba8) {
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1], width, color);
        }
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        if !point_is_finite(center) || !radius.is_finite() || radius <= 0.0 {
            return;
        }
        let x0 = (center.x - radius).floor() as i64;
        let y0 = (center.y - radius).floor() as i64;
        let x1 = (center.x + radius).ceil() as i64;
        let y1 = (center.y + radius).ceil() as i64;
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= r2 {
                    self.blend_px(x, y, color);
                }
            }
        }
    }

    pub fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Rgba8) {
        if !point_is_finite(center)
            || !radius.is_finite()
            || radius <= 0.0
            || !width.is_finite()
            || width <= 0.0
        {
            return;
        }
        let outer = radius + width / 2.0;
        let inner = (radius - width / 2.0).max(0.0);
        let (o2, i2) = (outer * outer, inner * inner);
        let x0 = (center.x - outer).floor() as i64;
        let y0 = (center.y - outer).floor() as i64;
        let x1 = (center.x + outer).ceil() as i64;
        let y1 = (center.y + outer).ceil() as i64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                let d2 = dx * dx + dy * dy;
                if d2 <= o2 && d2 >= i2 {
                    self.blend_px(x, y, color);
                }
            }
        }
    }

    pub fn push_label(&mut self, label: Label) {
        if !point_is_finite(label.pos) {
            return;
        }
        self.labels.push(label);
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// First label whose text contains `needle`.
    pub fn find_label(&self, needle: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.text.contains(needle))
    }

    /// Copy out the raster as an `image` buffer (straight RGBA byte order).
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            data.extend_from_slice(&[px.r, px.g, px.b, px.a]);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

/// Label constructor with the defaults most scenes want.
pub fn label(text: impl Into<String>, pos: Point) -> Label {
    Label {
        text: text.into(),
        pos,
        size_px: 24.0,
        color: Rgba8::WHITE,
        id: None,
    }
}

fn point_is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

fn rect_is_finite(r: &Rect) -> bool {
    r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
}
