use std::io::Cursor;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use schedr::{
    composer::{BlockKind, LayoutBlock},
    error::ContextError,
    image_source::ImageLoader,
    schedule::{Day, ScheduleExercise, Week, WeekValues},
    Client, RenderStyle, RenderedSchedule, Renderer, Schedule, TemplateType,
};

fn exercise(index: usize) -> ScheduleExercise {
    ScheduleExercise {
        id: format!("ex-{index}"),
        name: format!("Esercizio {}", index + 1),
        per_week_values: vec![WeekValues {
            sets: 3.0,
            reps: 10.0,
            seconds: 45.0,
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn schedule(template_type: TemplateType, exercises_per_day: &[usize]) -> Schedule {
    Schedule {
        status: "Attiva".into(),
        level: Some("Intermedio".into()),
        duration_label: Some("8 settimane".into()),
        start_date: "2024-03-05".into(),
        template_type,
        days: exercises_per_day
            .iter()
            .enumerate()
            .map(|(day_index, &exercise_count)| Day {
                name: format!("Giorno {}", day_index + 1),
                exercises: (0..exercise_count).map(exercise).collect(),
                weeks: None,
            })
            .collect(),
        ..Default::default()
    }
}

fn client() -> Client {
    Client {
        name: "Mario Rossi".into(),
        personal_notes: Some("Bere molta acqua\nRiscaldamento di 10 minuti".into()),
    }
}

fn png_data_uri(width: u32, height: u32) -> String {
    let mut image_bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 30, 30])))
        .write_to(&mut Cursor::new(&mut image_bytes), ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(image_bytes)
    )
}

fn blocks_of<'a>(
    rendered_schedule: &'a RenderedSchedule,
    predicate: impl Fn(&BlockKind) -> bool + 'a,
) -> Vec<&'a LayoutBlock> {
    rendered_schedule
        .blocks()
        .iter()
        .filter(|block| predicate(&block.kind))
        .collect()
}

fn count_images(pdf_bytes: &[u8]) -> usize {
    let pdf_document = lopdf::Document::load_mem(pdf_bytes).unwrap();
    pdf_document
        .objects
        .values()
        .filter(|object| match object {
            lopdf::Object::Stream(stream) => stream
                .dict
                .get(b"Subtype")
                .and_then(lopdf::Object::as_name)
                .is_ok_and(|subtype| subtype == b"Image"),
            _ => false,
        })
        .count()
}

#[test]
fn one_day_with_four_exercises_gives_rows_of_three_and_one() {
    let rendered_schedule =
        schedr::render(&schedule(TemplateType::Standard, &[4]), &client(), None).unwrap();

    let rows: Vec<Vec<usize>> = blocks_of(&rendered_schedule, |kind| {
        matches!(kind, BlockKind::ExerciseRow { .. })
    })
    .into_iter()
    .filter_map(|block| match &block.kind {
        BlockKind::ExerciseRow { exercises, .. } => Some(exercises.clone()),
        _ => None,
    })
    .collect();
    similar_asserts::assert_eq!(rows, vec![vec![0, 1, 2], vec![3]]);

    let tracking_rows = blocks_of(&rendered_schedule, |kind| {
        matches!(kind, BlockKind::TrackingRow { .. })
    });
    assert_eq!(tracking_rows.len(), 4);
    assert_eq!(
        blocks_of(&rendered_schedule, |kind| matches!(kind, BlockKind::NoteLine { .. })).len(),
        18
    );

    let pdf_document = lopdf::Document::load_mem(rendered_schedule.to_bytes()).unwrap();
    assert_eq!(pdf_document.get_pages().len(), rendered_schedule.page_count());
}

#[test]
fn athlete_days_without_weeks_have_ten_columns() {
    let mut athlete_schedule = schedule(TemplateType::Athlete, &[2, 1]);
    athlete_schedule.days[1].weeks = Some(vec![
        Week {
            name: "Settimana 1".into(),
        },
        Week {
            name: "Settimana 2".into(),
        },
        Week {
            name: "Settimana 3".into(),
        },
    ]);
    let rendered_schedule = schedr::render(&athlete_schedule, &client(), None).unwrap();

    let headers: Vec<BlockKind> = blocks_of(&rendered_schedule, |kind| {
        matches!(kind, BlockKind::WeekHeader { .. })
    })
    .into_iter()
    .map(|block| block.kind.clone())
    .collect();
    similar_asserts::assert_eq!(
        headers,
        vec![
            BlockKind::WeekHeader { day: 0, weeks: 10 },
            BlockKind::WeekHeader { day: 1, weeks: 3 },
        ]
    );

    let matrix_rows = blocks_of(&rendered_schedule, |kind| {
        matches!(kind, BlockKind::MatrixRow { .. })
    });
    assert_eq!(matrix_rows.len(), 3);
    assert_eq!(
        matrix_rows[0].kind,
        BlockKind::MatrixRow {
            day: 0,
            exercise: 0,
            weeks: 10
        }
    );
}

#[test]
fn the_page_count_never_decreases_with_more_exercises() {
    let mut previous_page_count = 0;
    for exercise_count in 0..40 {
        let rendered_schedule = schedr::render(
            &schedule(TemplateType::Standard, &[exercise_count, 2]),
            &client(),
            None,
        )
        .unwrap();
        assert!(
            rendered_schedule.page_count() >= previous_page_count,
            "{} exercises gave {} pages, {} gave {}",
            exercise_count,
            rendered_schedule.page_count(),
            exercise_count.saturating_sub(1),
            previous_page_count
        );
        previous_page_count = rendered_schedule.page_count();
    }
    assert!(previous_page_count > 3);
}

#[test]
fn the_page_count_never_decreases_whatever_surrounds_the_growing_day() {
    for template_type in [TemplateType::Standard, TemplateType::Athlete] {
        for (leading_exercises, trailing_exercises) in [(1, 0), (4, 0), (1, 5), (0, 5)] {
            let mut previous_page_count = 0;
            for exercise_count in 0..60 {
                let rendered_schedule = schedr::render(
                    &schedule(
                        template_type,
                        &[leading_exercises, exercise_count, trailing_exercises],
                    ),
                    &client(),
                    None,
                )
                .unwrap();
                assert!(
                    rendered_schedule.page_count() >= previous_page_count,
                    "{:?} [{}, {}, {}] gave {} pages, one exercise less gave {}",
                    template_type,
                    leading_exercises,
                    exercise_count,
                    trailing_exercises,
                    rendered_schedule.page_count(),
                    previous_page_count
                );
                previous_page_count = rendered_schedule.page_count();
            }
        }
    }
}

#[test]
fn every_output_is_the_same_document() {
    let standard_schedule = schedule(TemplateType::Standard, &[5, 3]);
    let rendered_schedule = schedr::render(&standard_schedule, &client(), None).unwrap();

    assert_eq!(rendered_schedule.to_bytes(), rendered_schedule.to_bytes());
    let decoded_bytes = base64::engine::general_purpose::STANDARD
        .decode(rendered_schedule.to_base64())
        .unwrap();
    assert_eq!(decoded_bytes, rendered_schedule.to_bytes());

    let rendered_again = schedr::render(&standard_schedule, &client(), None).unwrap();
    assert_eq!(rendered_again.to_bytes(), rendered_schedule.to_bytes());
}

#[test]
fn broken_images_leave_the_rest_of_the_schedule_intact() {
    let mut broken_schedule = schedule(TemplateType::Standard, &[3]);
    broken_schedule.days[0].exercises[0].image_data = Some("data:image/png;base64,AAAA".into());
    broken_schedule.days[0].exercises[1].image_data = Some("/no/such/photo.png".into());
    broken_schedule.days[0].exercises[2].image_data = Some(png_data_uri(40, 20));

    let rendered_schedule =
        schedr::render(&broken_schedule, &client(), Some("data:image/png;base64,broken")).unwrap();

    assert_eq!(
        blocks_of(&rendered_schedule, |kind| matches!(kind, BlockKind::ExerciseRow { .. })).len(),
        1
    );
    assert_eq!(count_images(rendered_schedule.to_bytes()), 1);
}

#[test]
fn the_logo_is_drawn_in_the_header() {
    let rendered_schedule = schedr::render(
        &schedule(TemplateType::Athlete, &[1]),
        &client(),
        Some(&png_data_uri(300, 100)),
    )
    .unwrap();

    assert_eq!(count_images(rendered_schedule.to_bytes()), 1);
    assert_eq!(rendered_schedule.blocks()[0].kind, BlockKind::Header);
}

struct CountingLoader {
    image_bytes: Vec<u8>,
    calls: Arc<AtomicUsize>,
}

impl ImageLoader for CountingLoader {
    fn load(&self, _source: &str) -> Result<Vec<u8>, ContextError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.image_bytes.clone())
    }
}

#[test]
fn a_photo_used_many_times_is_loaded_once() {
    let mut image_bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])))
        .write_to(&mut Cursor::new(&mut image_bytes), ImageFormat::Png)
        .unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = Renderer::with_loader(
        RenderStyle::default(),
        Box::new(CountingLoader {
            image_bytes,
            calls: calls.clone(),
        }),
    );

    let mut shared_photo_schedule = schedule(TemplateType::Standard, &[6]);
    for exercise in shared_photo_schedule.days[0].exercises.iter_mut() {
        exercise.image_data = Some("panca.png".into());
    }
    let rendered_schedule = renderer.render(&shared_photo_schedule, &client(), None).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(count_images(rendered_schedule.to_bytes()), 1);
}

#[test]
fn schedules_are_saved_under_their_file_name() {
    let rendered_schedule =
        schedr::render(&schedule(TemplateType::Standard, &[1]), &client(), None).unwrap();
    assert_eq!(rendered_schedule.file_name(), "scheda-MarioRossi-2024-03-05.pdf");

    let output_directory = std::env::temp_dir().join("schedr-render-test");
    std::fs::create_dir_all(&output_directory).unwrap();
    let output_path = rendered_schedule.save_to_file(&output_directory).unwrap();

    assert_eq!(output_path, output_directory.join("scheda-MarioRossi-2024-03-05.pdf"));
    assert_eq!(std::fs::read(&output_path).unwrap(), rendered_schedule.to_bytes());
}

#[test]
fn legacy_schedules_are_rendered_with_the_athlete_template() {
    let legacy_schedule: Schedule = serde_json::from_str(
        r#"{
            "stato": "Attiva",
            "livello": "Avanzato",
            "dataInizio": "2024-02-30",
            "templateType": "profghizztemplate",
            "giorni": [{
                "nome": "Giorno A",
                "esercizi": [
                    { "id": "1", "nome": "Panca piana", "didascalia": "Presa media",
                      "settimaneValori": [{
                          "serie": "4",
                          "ripetizioni": "8",
                          "caricoKg": "70",
                          "note": "ultima serie a cedimento"
                      }] },
                    { "id": "2", "nome": "Trazioni" }
                ]
            }]
        }"#,
    )
    .unwrap();
    let legacy_client: Client = serde_json::from_str(r#"{ "name": "Anna Bianchi" }"#).unwrap();

    let rendered_schedule = schedr::render(&legacy_schedule, &legacy_client, None).unwrap();

    assert_eq!(legacy_schedule.template_type, TemplateType::Athlete);
    let matrix_rows = blocks_of(&rendered_schedule, |kind| {
        matches!(kind, BlockKind::MatrixRow { .. })
    });
    assert_eq!(matrix_rows.len(), 2);
    // The caption makes the first row taller than the minimum
    assert!(matrix_rows[0].height > matrix_rows[1].height);
    assert_eq!(rendered_schedule.file_name(), "scheda-AnnaBianchi-2024-02-30.pdf");
}
