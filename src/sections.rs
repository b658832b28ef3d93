use crate::composer::{BlockKind, Composer};
use crate::error::ContextError;
use crate::image_source::load_image;
use crate::measure::{format_start_date, FontStyle};
use crate::pdf::TextAlign;
use crate::schedule::{Client, Schedule, TemplateType};

/// Draws the brand bar, the logo and the client details at the top of the first page, and
/// moves the cursor below them. Returns the height of the block under the brand bar.
pub fn draw_header(
    composer: &mut Composer,
    schedule: &Schedule,
    client: &Client,
    logo: Option<&str>,
) -> Result<f32, ContextError> {
    let style = composer.style();
    let header = &style.header;
    let palette = &style.palette;
    let (brand_label, padding, spacing) = match composer.template_type() {
        TemplateType::Standard => (
            style.standard.brand_label.as_str(),
            style.standard.header_padding,
            style.standard.header_spacing,
        ),
        TemplateType::Athlete => (
            style.athlete.brand_label.as_str(),
            style.athlete.header_padding,
            style.athlete.header_spacing,
        ),
    };
    let margin_x = composer.margin_x();
    let top = composer.y();

    composer.fill_rect(0.0, top, style.page.width, header.bar_height, palette.brand_bar)?;
    composer.text(
        brand_label,
        FontStyle::Bold,
        header.brand_font_size,
        palette.brand_text,
        style.page.width - margin_x,
        top + header.bar_height / 1.6,
        TextAlign::Right,
    )?;

    let block_y = top + header.bar_height + header.block_top_gap;
    let logo_height = match logo.and_then(|logo| load_image(composer.loader(), logo)) {
        Some(decoded_logo) => composer.cover_image(
            &decoded_logo,
            margin_x,
            block_y,
            header.logo_box_width,
            header.logo_box_height,
        )?,
        None => 0.0,
    };

    let details_x = margin_x + header.logo_box_width + header.details_gap;
    let mut details_y = block_y + header.details_top_offset;
    composer.text(
        &client.name,
        FontStyle::Bold,
        header.name_font_size,
        palette.text,
        details_x,
        details_y,
        TextAlign::Left,
    )?;
    details_y += header.name_advance;

    let details = [
        ("Livello:", schedule.level.as_deref().unwrap_or("-").to_string()),
        ("Durata:", schedule.duration_label.as_deref().unwrap_or("-").to_string()),
        ("Inizio:", format_start_date(&schedule.start_date)),
    ];
    for (label, value) in details.iter() {
        composer.text(
            label,
            FontStyle::Bold,
            header.detail_font_size,
            palette.text,
            details_x,
            details_y,
            TextAlign::Left,
        )?;
        composer.text(
            value,
            FontStyle::Regular,
            header.detail_font_size,
            palette.text,
            details_x + header.value_offset,
            details_y,
            TextAlign::Left,
        )?;
        details_y += header.detail_advance;
    }

    let block_height = logo_height.max(details_y - block_y) + padding;
    composer.commit(BlockKind::Header, block_y + block_height - top);
    composer.advance(spacing);

    Ok(block_height)
}

/// Draws the notes bar followed by the ruled lines, filled with the lines of `notes`.
pub fn draw_notes(composer: &mut Composer, notes: Option<&str>) -> Result<(), ContextError> {
    let style = composer.style();
    let notes_style = &style.notes;
    let palette = &style.palette;
    let margin_x = composer.margin_x();
    let content_width = composer.content_width();

    let note_lines: Vec<&str> = notes.map(|notes| notes.lines().collect()).unwrap_or_default();
    if note_lines.len() > notes_style.line_count {
        log::warn!(
            "Only the first {} of {} lines of the notes fit in the notes block",
            notes_style.line_count,
            note_lines.len()
        );
    }

    // The ruled lines go with the bar, on a page of their own when they do not fit below it
    let whole_block_height = notes_style.bar_height
        + notes_style.bar_gap
        + notes_style.line_count as f32 * notes_style.line_height;
    let bar_y = composer.reserve(whole_block_height.min(style.usable_page_height()));
    composer.bar(
        margin_x,
        bar_y,
        content_width,
        notes_style.bar_height,
        palette.notes_bar,
        &notes_style.label,
        notes_style.bar_font_size,
        palette.bar_text,
        TextAlign::Left,
    )?;
    composer.commit(BlockKind::NotesBar, notes_style.bar_height);
    composer.advance(notes_style.bar_gap);

    for line in 0..notes_style.line_count {
        let line_y = composer.reserve(notes_style.line_height);
        composer.horizontal_rule(margin_x, line_y, content_width, notes_style.rule_line_width)?;
        if let Some(note_line) = note_lines.get(line) {
            composer.text(
                note_line,
                FontStyle::Regular,
                notes_style.font_size,
                palette.text,
                margin_x + 2.5,
                line_y + notes_style.line_height * 0.68,
                TextAlign::Left,
            )?;
        }
        composer.commit(BlockKind::NoteLine { line }, notes_style.line_height);
    }
    // Closes the last line; it sits on the bottom edge of the last block
    let closing_y = composer.y();
    composer.horizontal_rule(margin_x, closing_y, content_width, notes_style.rule_line_width)?;

    Ok(())
}
