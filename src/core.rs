use kurbo::Point;

/// Logical drawing area of a scene surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
        }
    }
}

/// RGBA8 color, premultiplied alpha convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    // Scene palette shared by the topic modules.
    pub const BACKGROUND: Self = Self::opaque(30, 41, 59);
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const GRID: Self = Self::new(74, 85, 104, 128);
    pub const BLUE: Self = Self::opaque(96, 165, 250);
    pub const GREEN: Self = Self::opaque(52, 211, 153);
    pub const AMBER: Self = Self::opaque(251, 191, 36);
    pub const RED: Self = Self::opaque(248, 113, 113);

    /// Source-over compositing of `self` onto `dst`.
    pub fn over(self, dst: Rgba8) -> Rgba8 {
        if self.a == 255 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }
        let inv = 255 - u16::from(self.a);
        let blend = |s: u8, d: u8| -> u8 {
            let v = u16::from(s) + (u16::from(d) * inv + 127) / 255;
            v.min(255) as u8
        };
        Rgba8 {
            r: blend(self.r, dst.r),
            g: blend(self.g, dst.g),
            b: blend(self.b, dst.b),
            a: blend(self.a, dst.a),
        }
    }

    /// Scale all channels by `t` in 0..=1 (premultiplied fade).
    pub fn scaled(self, t: f64) -> Rgba8 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mul = |c: u8| (f64::from(c) * t).round().clamp(0.0, 255.0) as u8;
        Rgba8 {
            r: mul(self.r),
            g: mul(self.g),
            b: mul(self.b),
            a: mul(self.a),
        }
    }
}

/// Map `v` from `[lo, hi]` to `[out_lo, out_hi]`, clamping the input first.
///
/// Returns `None` when any argument is non-finite or the input range is
/// degenerate, so callers never forward NaN coordinates to the raster.
pub fn map_range(v: f64, lo: f64, hi: f64, out_lo: f64, out_hi: f64) -> Option<f64> {
    if !(v.is_finite() && lo.is_finite() && hi.is_finite() && out_lo.is_finite() && out_hi.is_finite())
    {
        return None;
    }
    if hi <= lo {
        return None;
    }
    let t = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    Some(out_lo + (out_hi - out_lo) * t)
}
