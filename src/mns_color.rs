use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Colour roles used by the renderer, resolved once for the current terminal
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    // board and overlay background
    pub bg: Color,
    // hidden cells, menu entries
    pub acc: Color,
    // text, revealed mines
    pub fg: Color,
    // greyed-out menu entries
    pub disabled: Color,
    // pointer highlight
    pub hover: Color,
    // adjacency numbers 1..8, calm to alarming
    pub levels: [Color; 8],
}

/// Colour depth the terminal reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Depth {
    has_16m: bool,
    has_256: bool,
}

/// A colour sampled as RGB, with a stable 256-colour index and a basic ANSI fallback
#[derive(Debug, Clone, Copy)]
struct Swatch {
    rgb: (u8, u8, u8),
    index256: u8,
    basic: Color,
}

const fn swatch(r: u8, g: u8, b: u8, index256: u8, basic: Color) -> Swatch {
    Swatch { rgb: (r, g, b), index256, basic }
}

const BG: Swatch = swatch(24, 24, 28, 234, Color::Black);
const ACC: Swatch = swatch(96, 140, 200, 68, Color::Blue);
const FG: Swatch = swatch(236, 236, 236, 255, Color::White);
const DISABLED: Swatch = swatch(110, 110, 110, 242, Color::DarkGray);
const HOVER: Swatch = swatch(170, 205, 255, 153, Color::LightBlue);

const LEVELS: [Swatch; 8] = [
    swatch(86, 156, 255, 75, Color::LightBlue), // something nearby
    swatch(80, 200, 120, 78, Color::Green), // be careful
    swatch(230, 200, 60, 185, Color::Yellow), // be very careful
    swatch(240, 140, 40, 208, Color::LightRed), // danger
    swatch(230, 60, 50, 160, Color::Red), // great danger
    swatch(200, 60, 170, 163, Color::Magenta), // surrounded
    swatch(140, 30, 40, 88, Color::Red), // no escape
    swatch(255, 255, 255, 231, Color::White), // all eight
];

impl Swatch {
    /// Pick the closest representation the terminal can display
    fn resolve(self, depth: Depth) -> Color {
        if depth.has_16m {
            Color::Rgb(self.rgb.0, self.rgb.1, self.rgb.2)
        } else if depth.has_256 {
            Color::Indexed(self.index256)
        } else {
            self.basic
        }
    }
}

impl Palette {
    /// Resolve every role against the colour support of stdout
    pub fn detect() -> Palette {
        let support = ColorSupport::stdout();
        Palette::for_depth(Depth { has_16m: support.has_16m, has_256: support.has_256 })
    }

    fn for_depth(depth: Depth) -> Palette {
        Palette {
            bg: BG.resolve(depth),
            acc: ACC.resolve(depth),
            fg: FG.resolve(depth),
            disabled: DISABLED.resolve(depth),
            hover: HOVER.resolve(depth),
            levels: LEVELS.map(|s| s.resolve(depth)),
        }
    }

    /// Colour for an adjacency number; 0 has no digit and uses the foreground
    pub fn level(&self, adjacent: u8) -> Color {
        match adjacent {
            1..=8 => self.levels[adjacent as usize - 1],
            _ => self.fg,
        }
    }
}
