use crate::composer::{BlockKind, Composer};
use crate::error::ContextError;
use crate::measure::{format_standard_counters, truncate_to_width, FontStyle};
use crate::pdf::TextAlign;
use crate::schedule::{Day, ScheduleExercise};

/// Gap between the bottom of a photo and the baseline of the exercise name.
const NAME_BASELINE_OFFSET: f32 = 5.0;
/// Gap between the baseline of the name and the one of the counters.
const COUNTERS_BASELINE_OFFSET: f32 = 6.0;

pub fn draw_days(composer: &mut Composer, days: &[Day]) -> Result<(), ContextError> {
    for (day_index, day) in days.iter().enumerate() {
        if day.exercises.is_empty() {
            log::debug!("Skipping the day {:?}, it has no exercises", day.name);
            continue;
        }
        draw_exercise_grid(composer, day_index, day)?;
        draw_tracking_grid(composer, day_index, day)?;
    }

    Ok(())
}

fn draw_exercise_grid(
    composer: &mut Composer,
    day_index: usize,
    day: &Day,
) -> Result<(), ContextError> {
    let style = composer.style();
    let standard = &style.standard;
    let margin_x = composer.margin_x();
    let content_width = composer.content_width();
    let exercises_per_row = standard.exercises_per_row.max(1);
    let row_height = standard.image_height + standard.text_allowance;

    // The bar goes with the first row of photos
    let bar_y = composer.reserve(standard.bar_height + standard.bar_gap + row_height);
    composer.bar(
        margin_x,
        bar_y,
        content_width,
        standard.bar_height,
        style.palette.day_bar,
        &day.name,
        standard.bar_font_size,
        style.palette.bar_text,
        TextAlign::Center,
    )?;
    composer.commit(BlockKind::DayBar { day: day_index }, standard.bar_height);
    composer.advance(standard.bar_gap);

    let cell_width = content_width / exercises_per_row as f32;
    for (row_index, row) in day.exercises.chunks(exercises_per_row).enumerate() {
        let row_y = composer.reserve(row_height);
        for (column, exercise) in row.iter().enumerate() {
            let cell_x = margin_x + column as f32 * cell_width;
            draw_exercise_cell(composer, exercise, cell_x, row_y, cell_width)?;
        }

        let first_exercise = row_index * exercises_per_row;
        composer.commit(
            BlockKind::ExerciseRow {
                day: day_index,
                exercises: (first_exercise..first_exercise + row.len()).collect(),
            },
            row_height,
        );
    }
    composer.advance(standard.section_gap);

    Ok(())
}

fn draw_exercise_cell(
    composer: &mut Composer,
    exercise: &ScheduleExercise,
    cell_x: f32,
    cell_y: f32,
    cell_width: f32,
) -> Result<(), ContextError> {
    let style = composer.style();
    let standard = &style.standard;
    let center_x = cell_x + cell_width / 2.0;

    composer.contained_image(
        exercise.image_data.as_deref(),
        cell_x + (cell_width - standard.image_width) / 2.0,
        cell_y,
        standard.image_width,
        standard.image_height,
    )?;

    let name_y = cell_y + standard.image_height + NAME_BASELINE_OFFSET;
    let name = truncate_to_width(
        &exercise.name,
        FontStyle::Bold,
        standard.name_font_size,
        cell_width,
    );
    composer.text(
        &name,
        FontStyle::Bold,
        standard.name_font_size,
        style.palette.exercise_name,
        center_x,
        name_y,
        TextAlign::Center,
    )?;
    composer.text(
        &format_standard_counters(exercise.week_values(0)),
        FontStyle::Bold,
        standard.name_font_size,
        style.palette.text,
        center_x,
        name_y + COUNTERS_BASELINE_OFFSET,
        TextAlign::Center,
    )
}

fn draw_tracking_grid(
    composer: &mut Composer,
    day_index: usize,
    day: &Day,
) -> Result<(), ContextError> {
    let style = composer.style();
    let standard = &style.standard;
    let margin_x = composer.margin_x();
    let content_width = composer.content_width();
    let column_count = standard.tracking_columns.max(1);
    let column_width = content_width / column_count as f32;
    let row_height = standard.tracking_row_height;

    // The grid stays whole when a page can hold it, otherwise it starts on a page of its own.
    // The reservation only grows with the number of rows, so neither does the page count shrink
    let whole_grid_height =
        standard.bar_height + standard.tracking_bar_gap + day.exercises.len() as f32 * row_height;
    let bar_y = composer.reserve(whole_grid_height.min(style.usable_page_height()));
    composer.bar(
        margin_x,
        bar_y,
        content_width,
        standard.bar_height,
        style.palette.tracking_bar,
        &standard.tracking_label,
        standard.bar_font_size,
        style.palette.bar_text,
        TextAlign::Left,
    )?;
    composer.commit(BlockKind::TrackingBar { day: day_index }, standard.bar_height);
    composer.advance(standard.tracking_bar_gap);

    for row in 0..day.exercises.len() {
        let row_y = composer.reserve(row_height);
        for column in 0..column_count {
            composer.stroke_rect(
                margin_x + column as f32 * column_width,
                row_y,
                column_width,
                row_height,
                standard.grid_line_width,
            )?;
        }
        composer.commit(BlockKind::TrackingRow { day: day_index, row }, row_height);
    }
    composer.advance(standard.section_gap);

    Ok(())
}
