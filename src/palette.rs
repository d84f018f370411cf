use glam::{vec4, Vec4};
use rand::Rng;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Linear RGBA for sRGB render targets.
    pub fn to_linear(self) -> Vec4 {
        vec4(
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            1.0,
        )
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub const GOLD: Color = Color::from_hex(0xFFD700);
pub const CYAN: Color = Color::from_hex(0x00FFFF);
pub const HOT_PINK: Color = Color::from_hex(0xFF69B4);
pub const WHITE: Color = Color::from_hex(0xFFFFFF);
pub const INDIGO: Color = Color::from_hex(0x4C1D95);

pub const PALETTE: [Color; 5] = [GOLD, CYAN, HOT_PINK, WHITE, INDIGO];

pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Color {
    PALETTE[rng.gen_range(0..PALETTE.len())]
}
