//! Dashboard palette, one color per metric. Muted and track shades are
//! derived with [`Theme::lighten`] and [`Theme::darken`].

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub primary: Color,
    pub accent: Color,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
    pub foreground: Color,
    pub background: Color,
    pub surface: Color,
    pub cpu: Color,
    pub memory_percent: Color,
    pub memory_mb: Color,
    pub threads: Color,
}

impl Theme {
    pub const fn dark() -> Self {
        Self {
            primary: Color::from_u32(0x00ffff),
            accent: Color::from_u32(0xffaa22),
            warning: Color::from_u32(0xffd166),
            error: Color::from_u32(0xff0000),
            success: Color::from_u32(0x00ff00),
            foreground: Color::from_u32(0xeeeeee),
            background: Color::from_u32(0x111111),
            surface: Color::from_u32(0x222222),
            cpu: Color::from_u32(0xff6b6b),
            memory_percent: Color::from_u32(0x4ecdc4),
            memory_mb: Color::from_u32(0x2a9d8f),
            threads: Color::from_u32(0xffd166),
        }
    }

    /// Move `color` towards white; 0.0 keeps it, 1.0 is white.
    pub fn lighten(color: Color, factor: f32) -> Color {
        blend(color, 255.0, factor)
    }

    /// Move `color` towards black; 0.0 keeps it, 1.0 is black.
    pub fn darken(color: Color, factor: f32) -> Color {
        blend(color, 0.0, factor)
    }
}

/// Linear blend of each RGB channel towards `target`. Named and indexed
/// colors have no channels to blend and pass through.
fn blend(color: Color, target: f32, factor: f32) -> Color {
    let Color::Rgb(r, g, b) = color else {
        return color;
    };
    let t = factor.clamp(0.0, 1.0);
    let mix = |c: u8| (f32::from(c) + (target - f32::from(c)) * t) as u8;
    Color::Rgb(mix(r), mix(g), mix(b))
}
