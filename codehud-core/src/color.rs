//! Colors shared by the canvas and the renderer.

/// Linear RGBA color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const RED: Rgba = Rgba::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Rgba = Rgba::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Rgba = Rgba::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Convert to 8-bit channels (rounded, clamped).
    pub fn to_u8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// The pen palette. Selected with the `1`/`2`/`3` keys outside typing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenColor {
    #[default]
    Red,
    Green,
    Blue,
}

impl PenColor {
    pub fn rgba(self) -> Rgba {
        match self {
            PenColor::Red => Rgba::RED,
            PenColor::Green => Rgba::GREEN,
            PenColor::Blue => Rgba::BLUE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PenColor::Red => "red",
            PenColor::Green => "green",
            PenColor::Blue => "blue",
        }
    }

    /// Map a palette hotkey (`'1'..='3'`) to a pen.
    pub fn from_hotkey(c: char) -> Option<PenColor> {
        match c {
            '1' => Some(PenColor::Red),
            '2' => Some(PenColor::Green),
            '3' => Some(PenColor::Blue),
            _ => None,
        }
    }
}
