use std::path::{Path, PathBuf};

use base64::Engine as _;

use crate::composer::{Composer, LayoutBlock};
use crate::error::ContextError;
use crate::image_source::{DefaultImageLoader, ImageLoader};
use crate::schedule::{Client, Schedule, TemplateType};
use crate::style::RenderStyle;
use crate::{athlete, sections, standard};

/// Renders schedules with one style and one way of loading images. It holds no state between
/// renders, so it can be reused for any number of schedules.
pub struct Renderer {
    style: RenderStyle,
    loader: Box<dyn ImageLoader>,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new(RenderStyle::default())
    }
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Renderer {
            style,
            loader: Box::new(DefaultImageLoader::default()),
        }
    }

    pub fn with_loader(style: RenderStyle, loader: Box<dyn ImageLoader>) -> Self {
        Renderer { style, loader }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Lays out and serializes a schedule. Images that cannot be loaded are left out and never
    /// make the render fail.
    pub fn render(
        &self,
        schedule: &Schedule,
        client: &Client,
        logo: Option<&str>,
    ) -> Result<RenderedSchedule, ContextError> {
        let file_name = schedule_file_name(schedule, client);
        log::debug!(
            "Rendering {:?} with the {} template",
            file_name,
            <&'static str>::from(schedule.template_type)
        );

        let mut composer = Composer::new(
            &self.style,
            self.loader.as_ref(),
            schedule.template_type,
            file_name.trim_end_matches(".pdf").to_string(),
        );
        composer.set_title(&file_name);

        sections::draw_header(&mut composer, schedule, client, logo)?;
        match schedule.template_type {
            TemplateType::Standard => standard::draw_days(&mut composer, &schedule.days)?,
            TemplateType::Athlete => athlete::draw_days(&mut composer, &schedule.days)?,
        }
        sections::draw_notes(&mut composer, client.notes_for(schedule))?;

        let (pdf_document, blocks) = composer.finish();
        let page_count = pdf_document.page_count();
        let bytes = pdf_document.save_to_bytes()?;

        Ok(RenderedSchedule {
            bytes,
            blocks,
            page_count,
            file_name,
        })
    }
}

/// Renders a schedule with the default style, reading images from data URIs and local files.
pub fn render(
    schedule: &Schedule,
    client: &Client,
    logo: Option<&str>,
) -> Result<RenderedSchedule, ContextError> {
    Renderer::default().render(schedule, client, logo)
}

/// A finished schedule. The document is serialized once, every output is a view of the same
/// bytes.
#[derive(Debug, Clone)]
pub struct RenderedSchedule {
    bytes: Vec<u8>,
    blocks: Vec<LayoutBlock>,
    page_count: usize,
    file_name: String,
}

impl RenderedSchedule {
    /// The PDF file.
    pub fn to_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Writes the PDF to `path`. When `path` is a directory the file is named after
    /// [`RenderedSchedule::file_name`]. Returns the path written to.
    pub fn save_to_file(&self, path: &Path) -> Result<PathBuf, ContextError> {
        let output_path = if path.is_dir() {
            path.join(&self.file_name)
        } else {
            path.to_path_buf()
        };
        std::fs::write(&output_path, &self.bytes).map_err(|error| {
            ContextError::with_error(
                format!("Unable to write the schedule to {:?}", output_path),
                &error,
            )
        })?;
        log::info!("Saved the schedule to {:?}", output_path);

        Ok(output_path)
    }

    /// `scheda-{client name without whitespace}-{start date}.pdf`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Every block placed, in drawing order.
    pub fn blocks(&self) -> &[LayoutBlock] {
        &self.blocks
    }
}

pub fn schedule_file_name(schedule: &Schedule, client: &Client) -> String {
    let client_name: String = client
        .name
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect();
    let client_name = if client_name.is_empty() { "Cliente".to_string() } else { client_name };

    format!("scheda-{}-{}.pdf", client_name, schedule.start_date.trim())
}
