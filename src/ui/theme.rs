//! Marquee theme for CineGraph
//!
//! Warm projection-booth palette plus the style helpers views share.

use ratatui::style::{Color, Modifier, Style};

use crate::models::OfferCategory;

pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Screen: #0d0b0a (auditorium black)
    pub const BACKGROUND: Color = Color::Rgb(0x0d, 0x0b, 0x0a);

    /// Panels, search box, status bar
    pub const SURFACE: Color = Color::Rgb(0x1c, 0x17, 0x14);

    /// Marquee gold: #f5c542
    pub const PRIMARY: Color = Color::Rgb(0xf5, 0xc5, 0x42);

    /// Curtain red: #c8323c
    pub const SECONDARY: Color = Color::Rgb(0xc8, 0x32, 0x3c);

    /// Popcorn: #fff1c9
    pub const ACCENT: Color = Color::Rgb(0xff, 0xf1, 0xc9);

    pub const TEXT: Color = Color::Rgb(0xea, 0xe4, 0xdc);

    pub const DIM: Color = Color::Rgb(0x6b, 0x62, 0x5a);

    pub const SUCCESS: Color = Color::Rgb(0x6f, 0xcf, 0x7c);

    pub const WARNING: Color = Color::Rgb(0xf0, 0x8a, 0x24);

    pub const ERROR: Color = Color::Rgb(0xe8, 0x3f, 0x4a);

    /// Frame lines: #5a4a2e (tarnished brass)
    pub const BORDER: Color = Color::Rgb(0x5a, 0x4a, 0x2e);

    // ═══════════════════════════════════════════════════════════════════════
    // STYLES
    // ═══════════════════════════════════════════════════════════════════════

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn border_focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn list_item() -> Style {
        Style::default().fg(Self::TEXT)
    }

    pub fn list_item_selected() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn input() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::SURFACE)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::SURFACE)
    }

    pub fn loading() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Year/date metadata
    pub fn year() -> Style {
        Style::default().fg(Self::SECONDARY)
    }

    pub fn genre() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Vote average: green from 7, yellow from 5, red below
    pub fn rating(rating: f32) -> Style {
        let color = if rating >= 7.0 {
            Self::SUCCESS
        } else if rating >= 5.0 {
            Self::ACCENT
        } else {
            Self::ERROR
        };
        Style::default().fg(color)
    }

    /// Heading color per offer group
    pub fn offer_category(category: OfferCategory) -> Style {
        let color = match category {
            OfferCategory::Subscription => Self::SUCCESS,
            OfferCategory::Rent => Self::ACCENT,
            OfferCategory::Buy => Self::SECONDARY,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}
