use crate::composer::{BlockKind, Composer};
use crate::error::ContextError;
use crate::measure::{
    format_athlete_load, format_athlete_recovery, truncate_to_width, wrap_text, FontStyle,
};
use crate::pdf::TextAlign;
use crate::schedule::{Day, ScheduleExercise};
use crate::style::AthleteStyle;

/// Padding around the content of the photo cell.
const CELL_PADDING: f32 = 2.0;
/// Part of the photo height given up to the caption and the name.
const PHOTO_TEXT_RESERVE: f32 = 13.0;

// Baselines and rules of a week cell, from the top of the row
const LOAD_BASELINE: f32 = 8.5;
const FIRST_RULE: f32 = 11.0;
const RECOVERY_BASELINE: f32 = 15.5;
const SECOND_RULE: f32 = 18.0;
const NOTE_BASELINE: f32 = 21.2;
const WEEK_LABEL_BASELINE: f32 = 5.6;

/// The labels of the week columns of a day. A day without weeks gets the default number of
/// columns, left blank to be filled in.
pub fn week_labels(day: &Day, default_week_count: usize) -> Vec<String> {
    match day.declared_weeks() {
        Some(weeks) => weeks
            .iter()
            .enumerate()
            .map(|(index, week)| {
                if week.name.trim().is_empty() {
                    format!("Settim. {}", index + 1)
                } else {
                    week.name.replace("Settimana", "Settim.")
                }
            })
            .collect(),
        None => (1..=default_week_count.max(1))
            .map(|number| format!("Settim. {number}"))
            .collect(),
    }
}

/// Height of the matrix row of an exercise: the minimum height, unless the wrapped name and
/// the caption need more.
pub fn matrix_row_height(exercise: &ScheduleExercise, athlete: &AthleteStyle) -> f32 {
    let name_lines = wrap_text(
        &exercise.name,
        FontStyle::Regular,
        athlete.name_font_size,
        athlete.photo_column_width - CELL_PADDING,
    )
    .len()
    .max(1);
    let caption_height = if has_caption(exercise) { athlete.caption_height } else { 0.0 };
    let name_height = name_lines as f32 * athlete.name_line_height + CELL_PADDING;
    let content_height = CELL_PADDING
        + photo_image_height(athlete)
        + CELL_PADDING
        + caption_height
        + CELL_PADDING
        + name_height;

    if content_height > athlete.min_row_height {
        content_height + CELL_PADDING
    } else {
        athlete.min_row_height
    }
}

fn photo_image_height(athlete: &AthleteStyle) -> f32 {
    (athlete.photo_height - PHOTO_TEXT_RESERVE).max(0.0)
}

fn has_caption(exercise: &ScheduleExercise) -> bool {
    exercise
        .caption
        .as_deref()
        .is_some_and(|caption| !caption.trim().is_empty())
}

pub fn draw_days(composer: &mut Composer, days: &[Day]) -> Result<(), ContextError> {
    for (day_index, day) in days.iter().enumerate() {
        draw_matrix(composer, day_index, day)?;
    }

    Ok(())
}

fn draw_matrix(composer: &mut Composer, day_index: usize, day: &Day) -> Result<(), ContextError> {
    let style = composer.style();
    let athlete = &style.athlete;
    let margin_x = composer.margin_x();
    let content_width = composer.content_width();

    let labels = week_labels(day, athlete.default_week_count);
    let week_count = labels.len();
    let column_width = (content_width - athlete.photo_column_width) / week_count as f32;
    let row_heights: Vec<f32> = day
        .exercises
        .iter()
        .map(|exercise| matrix_row_height(exercise, athlete))
        .collect();
    let first_row_height = row_heights.first().copied().unwrap_or(athlete.min_row_height);

    // Bar, week labels and the first exercise stay together
    let bar_y = composer.reserve(
        athlete.bar_height + athlete.bar_gap + athlete.week_header_height + first_row_height,
    );
    composer.bar(
        margin_x,
        bar_y,
        content_width,
        athlete.bar_height,
        style.palette.day_bar,
        &day.name,
        athlete.bar_font_size,
        style.palette.athlete_bar_text,
        TextAlign::Center,
    )?;
    composer.commit(BlockKind::DayBar { day: day_index }, athlete.bar_height);
    composer.advance(athlete.bar_gap);

    let header_y = composer.reserve(athlete.week_header_height);
    for (week_index, label) in labels.iter().enumerate() {
        let week_x = margin_x + athlete.photo_column_width + week_index as f32 * column_width;
        composer.fill_rect(
            week_x,
            header_y,
            column_width,
            athlete.week_header_height,
            style.palette.week_header_fill,
        )?;
        composer.stroke_rect(
            week_x,
            header_y,
            column_width,
            athlete.week_header_height,
            athlete.frame_line_width,
        )?;
        composer.text(
            label,
            FontStyle::Bold,
            athlete.week_label_font_size,
            style.palette.text,
            week_x + column_width / 2.0,
            header_y + WEEK_LABEL_BASELINE,
            TextAlign::Center,
        )?;
    }
    composer.stroke_rect(
        margin_x,
        header_y,
        athlete.photo_column_width,
        athlete.week_header_height,
        athlete.frame_line_width,
    )?;
    composer.commit(
        BlockKind::WeekHeader {
            day: day_index,
            weeks: week_count,
        },
        athlete.week_header_height,
    );

    for (exercise_index, (exercise, row_height)) in
        day.exercises.iter().zip(row_heights).enumerate()
    {
        let row_y = composer.reserve(row_height);
        draw_photo_cell(composer, exercise, row_y, row_height)?;
        for week_index in 0..week_count {
            let week_x = margin_x + athlete.photo_column_width + week_index as f32 * column_width;
            draw_week_cell(
                composer,
                exercise,
                week_index,
                week_x,
                row_y,
                column_width,
                row_height,
            )?;
        }
        composer.commit(
            BlockKind::MatrixRow {
                day: day_index,
                exercise: exercise_index,
                weeks: week_count,
            },
            row_height,
        );
    }
    composer.advance(athlete.section_gap);

    Ok(())
}

fn draw_photo_cell(
    composer: &mut Composer,
    exercise: &ScheduleExercise,
    row_y: f32,
    row_height: f32,
) -> Result<(), ContextError> {
    let style = composer.style();
    let athlete = &style.athlete;
    let cell_x = composer.margin_x();
    let center_x = cell_x + athlete.photo_column_width / 2.0;
    let text_width = athlete.photo_column_width - CELL_PADDING;
    let image_height = photo_image_height(athlete);

    composer.stroke_rect(
        cell_x,
        row_y,
        athlete.photo_column_width,
        row_height,
        athlete.frame_line_width,
    )?;
    composer.contained_image(
        exercise.image_data.as_deref(),
        cell_x + CELL_PADDING,
        row_y + CELL_PADDING,
        athlete.photo_column_width - 2.0 * CELL_PADDING,
        image_height,
    )?;

    let mut text_y = row_y + CELL_PADDING + image_height + CELL_PADDING;
    if let Some(caption) = exercise.caption.as_deref().filter(|_| has_caption(exercise)) {
        let caption =
            truncate_to_width(caption, FontStyle::Italic, athlete.caption_font_size, text_width);
        composer.text(
            &caption,
            FontStyle::Italic,
            athlete.caption_font_size,
            style.palette.text,
            center_x,
            text_y,
            TextAlign::Center,
        )?;
        text_y += athlete.caption_height;
    }

    let name_lines =
        wrap_text(&exercise.name, FontStyle::Regular, athlete.name_font_size, text_width);
    for (line_index, name_line) in name_lines.iter().enumerate() {
        composer.text(
            name_line,
            FontStyle::Regular,
            athlete.name_font_size,
            style.palette.text,
            center_x,
            text_y + CELL_PADDING + line_index as f32 * athlete.name_line_height,
            TextAlign::Center,
        )?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_week_cell(
    composer: &mut Composer,
    exercise: &ScheduleExercise,
    week_index: usize,
    cell_x: f32,
    row_y: f32,
    column_width: f32,
    row_height: f32,
) -> Result<(), ContextError> {
    let style = composer.style();
    let athlete = &style.athlete;
    let palette = &style.palette;
    let center_x = cell_x + column_width / 2.0;
    let week_values = exercise.week_values(week_index);

    composer.fill_rect(cell_x, row_y, column_width, row_height, palette.cell_fill)?;
    composer.stroke_rect(cell_x, row_y, column_width, row_height, athlete.frame_line_width)?;

    composer.text(
        &format_athlete_load(week_values),
        FontStyle::Bold,
        athlete.load_font_size,
        palette.text,
        center_x,
        row_y + LOAD_BASELINE,
        TextAlign::Center,
    )?;
    composer.horizontal_rule(
        cell_x + 1.0,
        row_y + FIRST_RULE,
        column_width - 2.0,
        athlete.rule_line_width,
    )?;
    composer.text(
        &format_athlete_recovery(week_values),
        FontStyle::Regular,
        athlete.recovery_font_size,
        palette.text,
        center_x,
        row_y + RECOVERY_BASELINE,
        TextAlign::Center,
    )?;
    composer.horizontal_rule(
        cell_x + 1.0,
        row_y + SECOND_RULE,
        column_width - 2.0,
        athlete.rule_line_width,
    )?;

    let note = week_values.map(|values| values.note.trim()).unwrap_or_default();
    if !note.is_empty() {
        let note_width = column_width - 2.0 * CELL_PADDING;
        let first_line = wrap_text(note, FontStyle::Italic, athlete.note_font_size, note_width)
            .into_iter()
            .next()
            .unwrap_or_default();
        composer.text(
            &truncate_to_width(&first_line, FontStyle::Italic, athlete.note_font_size, note_width),
            FontStyle::Italic,
            athlete.note_font_size,
            palette.text,
            center_x,
            row_y + NOTE_BASELINE,
            TextAlign::Center,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::schedule::Week;

    #[test]
    fn days_without_weeks_get_ten_blank_columns() {
        let day = Day {
            name: "Giorno 1".into(),
            weeks: Some(Vec::new()),
            ..Default::default()
        };
        let labels = week_labels(&day, 10);
        assert_eq!(labels.len(), 10);
        assert_eq!(labels[0], "Settim. 1");
        assert_eq!(labels[9], "Settim. 10");
    }

    #[test]
    fn week_labels_are_shortened() {
        let day = Day {
            weeks: Some(vec![
                Week {
                    name: "Settimana 1".into(),
                },
                Week { name: "".into() },
                Week {
                    name: "Scarico".into(),
                },
            ]),
            ..Default::default()
        };
        similar_asserts::assert_eq!(
            week_labels(&day, 10),
            vec!["Settim. 1".to_string(), "Settim. 2".into(), "Scarico".into()]
        );
    }

    #[test]
    fn rows_grow_with_the_caption_and_long_names() {
        let athlete = AthleteStyle::default();
        let mut exercise = ScheduleExercise {
            name: "Squat".into(),
            ..Default::default()
        };
        assert_eq!(matrix_row_height(&exercise, &athlete), 26.0);

        exercise.caption = Some("Fermo di 2 secondi".into());
        // 2 + 13 + 2 + 4.5 + 2 + (4.7 + 2), plus the padding below
        assert!((matrix_row_height(&exercise, &athlete) - 32.2).abs() < 1e-4);

        exercise.caption = None;
        exercise.name = "Stacco rumeno con manubri su rialzo".into();
        assert!(matrix_row_height(&exercise, &athlete) > 26.0);
    }
}
