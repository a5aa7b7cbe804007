use ratatui::style::Color;

// Color palette structure
#[derive(Clone, Debug)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_0a: Color, // Yellow
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
}

// Oceanic Next theme
pub const OCEANIC_NEXT: Base16Palette = Base16Palette {
    base_00: Color::Rgb(0x1B, 0x2B, 0x34),
    base_02: Color::Rgb(0x4F, 0x5B, 0x66),
    base_03: Color::Rgb(0x65, 0x73, 0x7E),
    base_05: Color::Rgb(0xC0, 0xC5, 0xCE),
    base_06: Color::Rgb(0xCD, 0xD3, 0xDE),
    base_07: Color::Rgb(0xD8, 0xDE, 0xE9),
    base_08: Color::Rgb(0xEC, 0x5F, 0x67),
    base_0a: Color::Rgb(0xFA, 0xC8, 0x63),
    base_0c: Color::Rgb(0x5F, 0xB3, 0xB3),
    base_0d: Color::Rgb(0x66, 0x99, 0xCC),
};
