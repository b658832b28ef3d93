use std::ops::Range;

use rand::{distributions::Alphanumeric, Rng};
use schedr::{
    composer::BlockKind,
    schedule::{Day, ScheduleExercise, Week, WeekValues},
    Client, RenderStyle, Schedule, TemplateType,
};

struct FuzzSchedulesConfiguration {
    schedules_to_generate: u32,
    days_range: Range<usize>,
    exercises_range: Range<usize>,
    weeks_range: Range<usize>,
    words_range: Range<usize>,
    word_length_range: Range<usize>,
    note_lines_range: Range<usize>,
}

fn random_text(rng: &mut impl Rng, configuration: &FuzzSchedulesConfiguration) -> String {
    let word_count = rng.gen_range(configuration.words_range.clone());
    (0..word_count)
        .map(|_| {
            let word_length = rng.gen_range(configuration.word_length_range.clone());
            (0..word_length)
                .map(|_| char::from(rng.sample(Alphanumeric)))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn random_week_values(rng: &mut impl Rng) -> WeekValues {
    // Roughly half of the cells are left blank
    if rng.gen_bool(0.5) {
        return WeekValues::default();
    }
    WeekValues {
        sets: rng.gen_range(1..6) as f64,
        reps: rng.gen_range(1..20) as f64,
        minutes: rng.gen_range(0..4) as f64,
        seconds: (rng.gen_range(0..4) * 15) as f64,
        load_kg: rng.gen_range(0..300) as f64 / 2.0,
        note: if rng.gen_bool(0.3) { "lento in discesa".into() } else { String::new() },
    }
}

fn random_schedule(rng: &mut impl Rng, configuration: &FuzzSchedulesConfiguration) -> Schedule {
    let template_type = if rng.gen_bool(0.5) {
        TemplateType::Standard
    } else {
        TemplateType::Athlete
    };
    let days = (0..rng.gen_range(configuration.days_range.clone()))
        .map(|day_index| {
            let week_count = rng.gen_range(configuration.weeks_range.clone());
            let exercises = (0..rng.gen_range(configuration.exercises_range.clone()))
                .map(|exercise_index| ScheduleExercise {
                    id: format!("{day_index}-{exercise_index}"),
                    name: random_text(rng, configuration),
                    caption: rng.gen_bool(0.3).then(|| random_text(rng, configuration)),
                    per_week_values: (0..week_count.max(1))
                        .map(|_| random_week_values(rng))
                        .collect(),
                    ..Default::default()
                })
                .collect();
            Day {
                name: format!("Giorno {}", day_index + 1),
                exercises,
                weeks: (week_count > 0).then(|| {
                    (0..week_count)
                        .map(|week_index| Week {
                            name: format!("Settimana {}", week_index + 1),
                        })
                        .collect()
                }),
            }
        })
        .collect();

    Schedule {
        level: rng.gen_bool(0.5).then(|| "Intermedio".to_string()),
        start_date: format!("2024-{:02}-{:02}", rng.gen_range(1..13), rng.gen_range(1..29)),
        template_type,
        days,
        ..Default::default()
    }
}

#[test]
fn random_schedules_keep_the_layout_invariants() {
    let configuration = FuzzSchedulesConfiguration {
        schedules_to_generate: 40,
        days_range: 0..6,
        exercises_range: 0..22,
        weeks_range: 0..13,
        words_range: 1..6,
        word_length_range: 2..11,
        note_lines_range: 0..25,
    };
    let style = RenderStyle::default();
    let bottom_limit = style.page.height - style.page.safety_bottom;
    let mut rng = rand::thread_rng();

    for _ in 0..configuration.schedules_to_generate {
        let schedule = random_schedule(&mut rng, &configuration);
        let note_lines = rng.gen_range(configuration.note_lines_range.clone());
        let client = Client {
            name: random_text(&mut rng, &configuration),
            personal_notes: Some(
                (0..note_lines)
                    .map(|_| random_text(&mut rng, &configuration))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        };

        let rendered_schedule = schedr::render(&schedule, &client, None).unwrap();
        let blocks = rendered_schedule.blocks();

        // No block crosses the bottom of its page and blocks only move down the document
        for block in blocks {
            assert!(block.top >= 0.0, "{:?} starts above the page", block);
            assert!(
                block.bottom() <= bottom_limit + 1e-3,
                "{:?} crosses the bottom of page {}",
                block.kind,
                block.page + 1
            );
        }
        for (previous, next) in blocks.iter().zip(blocks.iter().skip(1)) {
            assert!(
                (previous.page, previous.bottom()) <= (next.page, next.top + 1e-3),
                "{:?} is placed before {:?}",
                next,
                previous
            );
        }
        assert_eq!(
            blocks.last().map(|block| block.page + 1),
            Some(rendered_schedule.page_count())
        );

        // Every exercise is printed exactly once, in order
        for (day_index, day) in schedule.days.iter().enumerate() {
            let expected_exercises: Vec<usize> = (0..day.exercises.len()).collect();
            let printed_exercises: Vec<usize> = blocks
                .iter()
                .flat_map(|block| match &block.kind {
                    BlockKind::ExerciseRow {
                        day: row_day,
                        exercises,
                    } if *row_day == day_index => exercises.clone(),
                    BlockKind::MatrixRow {
                        day: row_day,
                        exercise,
                        ..
                    } if *row_day == day_index => vec![*exercise],
                    _ => Vec::new(),
                })
                .collect();
            similar_asserts::assert_eq!(printed_exercises, expected_exercises);

            if schedule.template_type == TemplateType::Standard {
                let tracking_rows = blocks
                    .iter()
                    .filter(|block| {
                        matches!(
                            block.kind,
                            BlockKind::TrackingRow { day: row_day, .. } if row_day == day_index
                        )
                    })
                    .count();
                assert_eq!(tracking_rows, day.exercises.len());
            }
        }
        assert_eq!(
            blocks
                .iter()
                .filter(|block| matches!(block.kind, BlockKind::NoteLine { .. }))
                .count(),
            style.notes.line_count
        );

        let pdf_document = lopdf::Document::load_mem(rendered_schedule.to_bytes()).unwrap();
        assert_eq!(pdf_document.get_pages().len(), rendered_schedule.page_count());
    }
}
