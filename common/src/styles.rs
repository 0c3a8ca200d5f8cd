//! Pre-computed static text styles.
//!
//! The display exposes two integer text scales: scale 1 is the 6x10 mono font and scale 2 the
//! 10x20 mono font. Text is positioned by its top-left corner (cursor semantics), so every
//! layout style uses [`Baseline::Top`].
//!
//! `MonoTextStyle` values are `const`, computed at compile time and referenced directly by the
//! widgets. Dynamic colours use [`SMALL_FONT`] with `MonoTextStyle::new`.

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::text::{Alignment, Baseline, TextStyle, TextStyleBuilder};
use profont::PROFONT_18_POINT;

use crate::colors::{CRITICAL, GREEN, TEXT};

// =============================================================================
// Text Layout Styles
// =============================================================================

/// Left-aligned, positioned by top-left corner.
pub const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

/// Right-aligned, positioned by top-right corner. Used for header status fields.
pub const TOP_RIGHT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Top)
    .build();

/// Centered horizontally, positioned by top edge. Used for banners.
pub const TOP_CENTER: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Top)
    .build();

// =============================================================================
// Fonts
// =============================================================================

/// Text scale 1.
pub const SMALL_FONT: &MonoFont = &FONT_6X10;

/// Headline font for full-screen banners.
pub const BANNER_FONT: &MonoFont = &PROFONT_18_POINT;

// =============================================================================
// Pre-computed Text Styles
// =============================================================================

pub const SMALL_TEXT: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, TEXT);

pub const SMALL_GREEN: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, GREEN);

pub const SMALL_CRITICAL: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, CRITICAL);

pub const LARGE_TEXT: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_10X20, TEXT);

pub const LARGE_GREEN: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_10X20, GREEN);
