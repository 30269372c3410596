/// Linear RGB color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Rgb { r, g, b }
    }

    /// Builds a color from a packed `0xRRGGBB` value
    pub const fn hex(value: u32) -> Self {
        Rgb {
            r: ((value >> 16) & 0xff) as f64 / 255.0,
            g: ((value >> 8) & 0xff) as f64 / 255.0,
            b: (value & 0xff) as f64 / 255.0,
        }
    }

    /// Linear interpolation toward `other`, `t` clamped to `0..=1`
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn scale(self, k: f64) -> Rgb {
        Rgb::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn add(self, other: Rgb) -> Rgb {
        Rgb::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    /// Component-wise product, used to tint a surface by a light color
    pub fn modulate(self, other: Rgb) -> Rgb {
        Rgb::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    /// Source-over blend of `self` onto `dst` with the given opacity
    pub fn over(self, dst: Rgb, alpha: f64) -> Rgb {
        dst.lerp(self, alpha)
    }

    /// Quantizes to 8-bit channels, saturating out-of-range values
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

impl From<Rgb> for crossterm::style::Color {
    fn from(c: Rgb) -> Self {
        let (r, g, b) = c.to_rgb8();
        crossterm::style::Color::Rgb { r, g, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hex_unpacks_channels() {
        let c = Rgb::hex(0xff8000);
        assert_abs_diff_eq!(c.r, 1.0);
        assert_abs_diff_eq!(c.g, 128.0 / 255.0);
        assert_abs_diff_eq!(c.b, 0.0);
        assert_eq!(c.to_rgb8(), (255, 128, 0));
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgb::hex(0x000000);
        let b = Rgb::hex(0xffffff);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_abs_diff_eq!(a.lerp(b, 0.5).g, 0.5);
        // clamped
        assert_eq!(a.lerp(b, 2.0), b);
    }

    #[test]
    fn over_blends_by_alpha() {
        let src = Rgb::WHITE;
        let dst = Rgb::BLACK;
        assert_abs_diff_eq!(src.over(dst, 0.25).r, 0.25);
        assert_eq!(src.over(dst, 0.0), dst);
    }

    #[test]
    fn to_rgb8_saturates() {
        assert_eq!(Rgb::new(2.0, -1.0, 0.5).to_rgb8(), (255, 0, 128));
    }
}
