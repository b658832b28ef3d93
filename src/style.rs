use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ContextError;
use crate::schedule::TemplateType;

/// An RGB color with 8 bits per channel, written in JSON as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// The color as the three fractional components expected by the PDF color operators.
    pub fn components(self) -> [f32; 3] {
        [self.0, self.1, self.2].map(|channel| channel as f32 / 255.0)
    }
}

/// Every constant of the two printed layouts. All lengths are in millimetres and all font sizes
/// in points. The renderer only ever reads it, so one value can be shared by many renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderStyle {
    pub page: PageStyle,
    pub palette: Palette,
    pub header: HeaderStyle,
    pub standard: StandardStyle,
    pub athlete: AthleteStyle,
    pub notes: NotesStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageStyle {
    pub width: f32,
    pub height: f32,
    /// Where the cursor restarts after a page break.
    pub top_margin: f32,
    /// Space at the bottom of every page that is never drawn into.
    pub safety_bottom: f32,
}

impl Default for PageStyle {
    fn default() -> Self {
        PageStyle {
            width: 210.0,
            height: 297.0,
            top_margin: 18.0,
            safety_bottom: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    pub brand_bar: Rgb,
    pub brand_text: Rgb,
    pub day_bar: Rgb,
    pub tracking_bar: Rgb,
    pub notes_bar: Rgb,
    pub bar_text: Rgb,
    /// Label color of the athlete day bars, which are printed dark on yellow.
    pub athlete_bar_text: Rgb,
    pub week_header_fill: Rgb,
    pub cell_fill: Rgb,
    pub exercise_name: Rgb,
    pub text: Rgb,
    pub rule: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            brand_bar: Rgb(11, 79, 163),
            brand_text: Rgb::WHITE,
            day_bar: Rgb(233, 186, 0),
            tracking_bar: Rgb(26, 35, 126),
            notes_bar: Rgb(44, 122, 70),
            bar_text: Rgb::WHITE,
            athlete_bar_text: Rgb::BLACK,
            week_header_fill: Rgb(245, 245, 210),
            cell_fill: Rgb::WHITE,
            exercise_name: Rgb(24, 48, 71),
            text: Rgb::BLACK,
            rule: Rgb::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderStyle {
    pub bar_height: f32,
    pub brand_font_size: f32,
    /// Gap between the brand bar and the logo box.
    pub block_top_gap: f32,
    pub logo_box_width: f32,
    pub logo_box_height: f32,
    /// Horizontal gap between the logo box and the client details.
    pub details_gap: f32,
    /// Offset of the first baseline of the details from the top of the block.
    pub details_top_offset: f32,
    /// Offset of the values from their labels.
    pub value_offset: f32,
    pub name_font_size: f32,
    pub name_advance: f32,
    pub detail_font_size: f32,
    pub detail_advance: f32,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        HeaderStyle {
            bar_height: 15.0,
            brand_font_size: 15.0,
            block_top_gap: 6.0,
            logo_box_width: 38.0,
            logo_box_height: 38.0,
            details_gap: 12.0,
            details_top_offset: 6.0,
            value_offset: 16.0,
            name_font_size: 15.0,
            name_advance: 10.0,
            detail_font_size: 12.0,
            detail_advance: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandardStyle {
    pub margin_x: f32,
    pub brand_label: String,
    /// Padding added below the header block, and the spacing before the first day.
    pub header_padding: f32,
    pub header_spacing: f32,
    pub bar_height: f32,
    pub bar_font_size: f32,
    pub bar_gap: f32,
    pub exercises_per_row: usize,
    pub image_width: f32,
    pub image_height: f32,
    /// Room left under each photo for the name and the counters.
    pub text_allowance: f32,
    pub name_font_size: f32,
    pub tracking_label: String,
    pub tracking_columns: usize,
    pub tracking_row_height: f32,
    pub tracking_bar_gap: f32,
    pub grid_line_width: f32,
    pub section_gap: f32,
}

impl Default for StandardStyle {
    fn default() -> Self {
        StandardStyle {
            margin_x: 14.0,
            brand_label: "fitness&dance".into(),
            header_padding: 2.0,
            header_spacing: 12.0,
            bar_height: 10.0,
            bar_font_size: 13.2,
            bar_gap: 3.0,
            exercises_per_row: 3,
            image_width: 50.0,
            image_height: 27.0,
            text_allowance: 20.0,
            name_font_size: 11.0,
            tracking_label: "Tracking pesi".into(),
            tracking_columns: 14,
            tracking_row_height: 10.0,
            tracking_bar_gap: 2.0,
            grid_line_width: 0.2,
            section_gap: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AthleteStyle {
    pub margin_x: f32,
    pub brand_label: String,
    pub header_padding: f32,
    pub header_spacing: f32,
    pub bar_height: f32,
    pub bar_font_size: f32,
    pub bar_gap: f32,
    pub photo_column_width: f32,
    pub photo_height: f32,
    pub week_header_height: f32,
    pub week_label_font_size: f32,
    pub min_row_height: f32,
    /// Number of week columns printed for a day that declares no weeks.
    pub default_week_count: usize,
    pub name_font_size: f32,
    pub name_line_height: f32,
    pub caption_font_size: f32,
    pub caption_height: f32,
    pub load_font_size: f32,
    pub recovery_font_size: f32,
    pub note_font_size: f32,
    pub frame_line_width: f32,
    pub rule_line_width: f32,
    pub section_gap: f32,
}

impl Default for AthleteStyle {
    fn default() -> Self {
        AthleteStyle {
            margin_x: 10.0,
            brand_label: "Prof Ghizz".into(),
            header_padding: 6.0,
            header_spacing: 0.0,
            bar_height: 10.0,
            bar_font_size: 14.0,
            bar_gap: 2.0,
            photo_column_width: 32.0,
            photo_height: 26.0,
            week_header_height: 9.0,
            week_label_font_size: 10.2,
            min_row_height: 26.0,
            default_week_count: 10,
            name_font_size: 8.6,
            name_line_height: 4.7,
            caption_font_size: 8.0,
            caption_height: 4.5,
            load_font_size: 10.3,
            recovery_font_size: 9.2,
            note_font_size: 8.2,
            frame_line_width: 0.3,
            rule_line_width: 0.2,
            section_gap: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotesStyle {
    pub label: String,
    pub bar_height: f32,
    pub bar_font_size: f32,
    pub bar_gap: f32,
    pub line_count: usize,
    pub line_height: f32,
    pub font_size: f32,
    pub rule_line_width: f32,
}

impl Default for NotesStyle {
    fn default() -> Self {
        NotesStyle {
            label: "Note personali".into(),
            bar_height: 8.5,
            bar_font_size: 13.2,
            bar_gap: 2.0,
            line_count: 18,
            line_height: 7.0,
            font_size: 11.0,
            rule_line_width: 0.2,
        }
    }
}

impl RenderStyle {
    /// Loads a style from a JSON file. Every field missing from the file keeps its default.
    pub fn from_path(style_path: &Path) -> Result<Self, ContextError> {
        crate::schedule::read_json(style_path, "style configuration")
    }

    /// Horizontal page margin of the given template.
    pub fn margin_x(&self, template_type: TemplateType) -> f32 {
        match template_type {
            TemplateType::Standard => self.standard.margin_x,
            TemplateType::Athlete => self.athlete.margin_x,
        }
    }

    /// Width available between the two horizontal margins of the given template.
    pub fn content_width(&self, template_type: TemplateType) -> f32 {
        self.page.width - 2.0 * self.margin_x(template_type)
    }

    /// Height usable on a page that was just started by a page break.
    pub fn usable_page_height(&self) -> f32 {
        self.page.height - self.page.safety_bottom - self.page.top_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_overrides_keep_the_remaining_defaults() {
        let style: RenderStyle = serde_json::from_str(
            r#"{ "athlete": { "defaultWeekCount": 6 }, "palette": { "dayBar": [10, 20, 30] } }"#,
        )
        .unwrap();

        assert_eq!(style.athlete.default_week_count, 6);
        assert_eq!(style.athlete.photo_column_width, 32.0);
        assert_eq!(style.palette.day_bar, Rgb(10, 20, 30));
        assert_eq!(style.standard, StandardStyle::default());
        assert_eq!(style.page, PageStyle::default());
    }

    #[test]
    fn content_width_depends_on_the_template_margins() {
        let style = RenderStyle::default();
        assert_eq!(style.content_width(TemplateType::Standard), 182.0);
        assert_eq!(style.content_width(TemplateType::Athlete), 190.0);
        assert_eq!(style.usable_page_height(), 263.0);
    }
}
