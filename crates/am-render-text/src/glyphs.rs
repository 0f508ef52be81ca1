//! Unicode decorations and ASCII fallback glyphs.

use crate::config::GlyphMode;

/// Characters used to decorate rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextGlyphs {
    /// Horizontal rule for separators.
    pub rule: char,
    /// Underline for level-one headings.
    pub heading_rule: char,
    /// Underline for other headings.
    pub subheading_rule: char,
    pub bullet: char,
    pub bold: &'static str,
    pub button_open: &'static str,
    pub button_close: &'static str,
    pub link_arrow: &'static str,
    pub image: &'static str,
    /// Left edge drawn for nested containers.
    pub container_edge: char,
}

impl TextGlyphs {
    pub const UNICODE: Self = Self {
        rule: '─',
        heading_rule: '═',
        subheading_rule: '─',
        bullet: '•',
        bold: "*",
        button_open: "⟦ ",
        button_close: " ⟧",
        link_arrow: "↗",
        image: "▣",
        container_edge: '│',
    };

    pub const ASCII: Self = Self {
        rule: '-',
        heading_rule: '=',
        subheading_rule: '-',
        bullet: '*',
        bold: "*",
        button_open: "[ ",
        button_close: " ]",
        link_arrow: "->",
        image: "#",
        container_edge: '|',
    };

    /// Get the appropriate glyph set for the mode.
    #[must_use]
    pub const fn for_mode(mode: GlyphMode) -> Self {
        match mode {
            GlyphMode::Unicode => Self::UNICODE,
            GlyphMode::Ascii => Self::ASCII,
        }
    }

    #[must_use]
    pub fn rule_line(&self, width: usize) -> String {
        std::iter::repeat_n(self.rule, width).collect()
    }

    /// Underline for a heading of `level`, as wide as `title`.
    #[must_use]
    pub fn underline(&self, level: u8, title: &str) -> String {
        let glyph = if level <= 1 {
            self.heading_rule
        } else {
            self.subheading_rule
        };
        std::iter::repeat_n(glyph, title.chars().count().max(1)).collect()
    }
}
