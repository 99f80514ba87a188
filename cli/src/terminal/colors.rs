use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 120, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 170, b: 60 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 210, g: 210, b: 210 };

pub const IPV4_ADDR: Color = Color::TrueColor { r: 110, g: 220, b: 160 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 170, g: 150, b: 255 };
pub const PORT: Color = Color::TrueColor { r: 255, g: 215, b: 100 };
pub const COMMAND: Color = Color::TrueColor { r: 230, g: 230, b: 170 };

pub const SCORE_HIGH: Color = Color::Green;
pub const SCORE_MEDIUM: Color = Color::Yellow;
pub const SCORE_LOW: Color = Color::Red;
