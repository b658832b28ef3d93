use unicode_normalization::UnicodeNormalization as _;

use crate::schedule::WeekValues;

/// Number of PDF points in a millimetre.
pub const POINTS_PER_MILLIMETER: f32 = 2.834646;

/// Height of the capital letters of every Helvetica face, in 1/1000 of the font size.
const CAP_HEIGHT: f32 = 718.0;

/// Width used for the characters with no entry in the width tables.
const DEFAULT_GLYPH_WIDTH: u16 = 556;

/// Advance widths of Helvetica for the printable ASCII range, in 1/1000 of the font size.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' to '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0' to '9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':' to '@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A' to 'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N' to 'Z'
    278, 278, 278, 469, 556, 333,                                                   // '[' to '`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a' to 'm'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n' to 'z'
    334, 260, 334, 584,                                                             // '{' to '~'
];

/// Advance widths of Helvetica-Bold for the printable ASCII range.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// The three faces the schedules are printed with, all of them among the standard PDF fonts
/// so that nothing has to be embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic];

    /// The PostScript name of the standard font.
    pub fn base_font(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
        }
    }

    /// The name the font is registered with in the page resources.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Italic => "F3",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            // The oblique face shares the metrics of the upright one
            FontStyle::Regular | FontStyle::Italic => &HELVETICA_WIDTHS,
            FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

fn ascii_glyph_width(character: char, widths: &[u16; 95]) -> Option<u16> {
    match character {
        ' '..='~' => Some(widths[character as usize - 32]),
        _ => None,
    }
}

/// Advance width of a single character, in 1/1000 of the font size.
pub fn glyph_width(character: char, font_style: FontStyle) -> u16 {
    let widths = font_style.widths();
    if let Some(width) = ascii_glyph_width(character, widths) {
        return width;
    }
    let is_bold = font_style == FontStyle::Bold;
    match character {
        // Tabs are printed as spaces
        '\t' => widths[0],
        '\u{a0}' => 278,
        '\u{2018}' | '\u{2019}' | '\u{201a}' => {
            if is_bold {
                278
            } else {
                222
            }
        }
        '\u{201c}' | '\u{201d}' | '\u{201e}' => {
            if is_bold {
                500
            } else {
                333
            }
        }
        '\u{2013}' | '\u{20ac}' => 556,
        '\u{2014}' | '\u{2026}' => 1000,
        '\u{b0}' => 400,
        '\u{2022}' => 350,
        // Accented letters are as wide as their base letter
        _ => std::iter::once(character)
            .nfd()
            .next()
            .and_then(|base| ascii_glyph_width(base, widths))
            .unwrap_or(DEFAULT_GLYPH_WIDTH),
    }
}

/// Width of `text` set in `font_style` at `font_size` points, in millimetres.
pub fn measure_text_width(text: &str, font_style: FontStyle, font_size: f32) -> f32 {
    let units: u32 = text
        .nfc()
        .map(|character| u32::from(glyph_width(character, font_style)))
        .sum();

    units_to_millimeters(units, font_size)
}

fn units_to_millimeters(units: u32, font_size: f32) -> f32 {
    units as f32 / 1000.0 * font_size / POINTS_PER_MILLIMETER
}

/// Height of the capital letters at `font_size` points, in millimetres.
pub fn cap_height(font_size: f32) -> f32 {
    CAP_HEIGHT / 1000.0 * font_size / POINTS_PER_MILLIMETER
}

/// Greedy word wrap: words are accumulated on a line while the line stays within `max_width`.
/// A single word is never split, so a word wider than `max_width` sits alone on its own line.
/// Explicit line breaks in `text` are kept.
pub fn wrap_text(
    text: &str,
    font_style: FontStyle,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            if current_line.is_empty() {
                current_line.push_str(word);
                continue;
            }
            let candidate_line = format!("{current_line} {word}");
            if measure_text_width(&candidate_line, font_style, font_size) <= max_width {
                current_line = candidate_line;
            } else {
                lines.push(std::mem::replace(&mut current_line, word.to_string()));
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    lines
}

/// Shortens `text` so that it fits on one line of `max_width`, marking the cut with an ellipsis.
pub fn truncate_to_width(
    text: &str,
    font_style: FontStyle,
    font_size: f32,
    max_width: f32,
) -> String {
    if measure_text_width(text, font_style, font_size) <= max_width {
        return text.to_string();
    }
    let ellipsis_units = u32::from(glyph_width('\u{2026}', font_style));
    if units_to_millimeters(ellipsis_units, font_size) > max_width {
        return String::new();
    }

    // The longest prefix that still leaves room for the ellipsis
    let mut kept_text = String::new();
    let mut kept_units = ellipsis_units;
    for character in text.nfc() {
        kept_units += u32::from(glyph_width(character, font_style));
        if units_to_millimeters(kept_units, font_size) > max_width {
            break;
        }
        kept_text.push(character);
    }

    format!("{}\u{2026}", kept_text.trim_end())
}

/// A region of the source image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// How an image is drawn: the size on the page in millimetres and the part of the source
/// image that ends up in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFit {
    pub width: f32,
    pub height: f32,
    pub crop: PixelRect,
}

/// Crop-fit used by the header logo. The box is filled along the axis of the longer side of
/// the image, the other side is capped at the box size, and the source is cropped around its
/// centre to the resulting proportions so nothing gets distorted.
pub fn fit_cover(
    natural_width: u32,
    natural_height: u32,
    box_width: f32,
    box_height: f32,
) -> Option<ImageFit> {
    if natural_width == 0 || natural_height == 0 {
        return None;
    }
    let ratio = natural_width as f32 / natural_height as f32;
    let (width, height) = if ratio > 1.0 {
        (box_width.min(box_height * ratio), box_height)
    } else {
        (box_width, box_height.min(box_width / ratio))
    };
    let target_ratio = width / height;

    let crop = if ratio > target_ratio {
        let crop_width =
            ((natural_height as f32 * target_ratio).round() as u32).clamp(1, natural_width);
        PixelRect {
            x: (natural_width - crop_width) / 2,
            y: 0,
            width: crop_width,
            height: natural_height,
        }
    } else {
        let crop_height =
            ((natural_width as f32 / target_ratio).round() as u32).clamp(1, natural_height);
        PixelRect {
            x: 0,
            y: (natural_height - crop_height) / 2,
            width: natural_width,
            height: crop_height,
        }
    };

    Some(ImageFit { width, height, crop })
}

/// Aspect-fit used by the exercise photos: the whole image is scaled down (or up) until it
/// touches the box on the constraining axis, without any cropping.
pub fn fit_contain(
    natural_width: u32,
    natural_height: u32,
    box_width: f32,
    box_height: f32,
) -> Option<ImageFit> {
    if natural_width == 0 || natural_height == 0 {
        return None;
    }
    let scale = (box_width / natural_width as f32).min(box_height / natural_height as f32);

    Some(ImageFit {
        width: natural_width as f32 * scale,
        height: natural_height as f32 * scale,
        crop: PixelRect {
            x: 0,
            y: 0,
            width: natural_width,
            height: natural_height,
        },
    })
}

/// Reformats a `YYYY-MM-DD` date as `DD/MM/YYYY` by reordering its parts. Anything without
/// that shape is printed as `-`.
pub fn format_start_date(raw_date: &str) -> String {
    let has_date_shape = raw_date.len() == 10
        && raw_date.bytes().enumerate().all(|(index, byte)| match index {
            4 | 7 => byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !has_date_shape {
        log::debug!("The start date {:?} is not in the YYYY-MM-DD form", raw_date);
        return "-".into();
    }

    format!("{}/{}/{}", &raw_date[8..10], &raw_date[5..7], &raw_date[0..4])
}

/// Prints a value the way it was typed: no trailing `.0` for whole numbers.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Also catches the negative zero
        "0".into()
    } else {
        format!("{value}")
    }
}

/// `"{sets}x{reps} - {minutes}' {seconds}\""`, the counters printed under a standard photo.
pub fn format_standard_counters(values: Option<&WeekValues>) -> String {
    let default_values = WeekValues::default();
    let values = values.unwrap_or(&default_values);

    format!(
        "{}x{} - {}' {}\"",
        format_number(values.sets),
        format_number(values.reps),
        format_number(values.minutes),
        format_number(values.seconds),
    )
}

/// `"{sets}*{reps} @ {kg} kg"`, or the blank `"__*__ @ __ kg"` to be filled in by hand when
/// none of the three values was set.
pub fn format_athlete_load(values: Option<&WeekValues>) -> String {
    match values {
        Some(values) if values.sets != 0.0 || values.reps != 0.0 || values.load_kg != 0.0 => {
            format!(
                "{}*{} @ {} kg",
                format_number(values.sets),
                format_number(values.reps),
                format_number(values.load_kg),
            )
        }
        _ => "__*__ @ __ kg".into(),
    }
}

/// `"rec. {minutes}' {seconds}\""`, or the blank `"rec. __"`.
pub fn format_athlete_recovery(values: Option<&WeekValues>) -> String {
    match values {
        Some(values) if values.minutes != 0.0 || values.seconds != 0.0 => format!(
            "rec. {}' {}\"",
            format_number(values.minutes),
            format_number(values.seconds),
        ),
        _ => "rec. __".into(),
    }
}
