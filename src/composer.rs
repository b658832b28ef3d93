use std::collections::HashMap;

use crate::cursor::{PageBreak, PageCursor};
use crate::error::ContextError;
use crate::image_source::{load_image, DecodedImage, ImageLoader};
use crate::measure::{cap_height, fit_contain, fit_cover, FontStyle};
use crate::pdf::{ImageXObject, PdfDocument, TextAlign};
use crate::schedule::TemplateType;
use crate::style::{RenderStyle, Rgb};

/// What an atomic block of the layout holds. Days and exercises are referred to by their
/// position in the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    DayBar { day: usize },
    /// One row of the standard exercise grid.
    ExerciseRow { day: usize, exercises: Vec<usize> },
    TrackingBar { day: usize },
    TrackingRow { day: usize, row: usize },
    /// Row of week labels above an athlete matrix.
    WeekHeader { day: usize, weeks: usize },
    /// One exercise of an athlete matrix, with a cell for each week.
    MatrixRow { day: usize, exercise: usize, weeks: usize },
    NotesBar,
    NoteLine { line: usize },
}

/// An atomic block as it was placed: it never spans two pages.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    pub kind: BlockKind,
    /// Zero based page index.
    pub page: usize,
    /// Distance of the top edge from the top of the page, in millimetres.
    pub top: f32,
    pub height: f32,
}

impl LayoutBlock {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy)]
struct EmbeddedImage {
    index: usize,
    width: u32,
    height: u32,
}

/// The drawing surface of one render: the document being drawn, the cursor deciding where the
/// next block goes and the record of every block placed so far.
pub struct Composer<'a> {
    style: &'a RenderStyle,
    loader: &'a dyn ImageLoader,
    template_type: TemplateType,
    document: PdfDocument,
    cursor: PageCursor,
    blocks: Vec<LayoutBlock>,
    images: HashMap<String, Option<EmbeddedImage>>,
}

impl<'a> Composer<'a> {
    pub fn new(
        style: &'a RenderStyle,
        loader: &'a dyn ImageLoader,
        template_type: TemplateType,
        document_identifier: String,
    ) -> Self {
        let mut document = PdfDocument::new(document_identifier);
        document.add_page(style.page.width, style.page.height);

        Composer {
            style,
            loader,
            template_type,
            document,
            cursor: PageCursor::new(&style.page),
            blocks: Vec::new(),
            images: HashMap::new(),
        }
    }

    pub fn style(&self) -> &'a RenderStyle {
        self.style
    }

    pub fn template_type(&self) -> TemplateType {
        self.template_type
    }

    pub fn margin_x(&self) -> f32 {
        self.style.margin_x(self.template_type)
    }

    pub fn content_width(&self) -> f32 {
        self.style.content_width(self.template_type)
    }

    pub fn y(&self) -> f32 {
        self.cursor.y()
    }

    pub fn page(&self) -> usize {
        self.cursor.page_index()
    }

    pub fn set_title(&mut self, title: &str) {
        self.document.title = title.to_string();
    }

    /// Makes sure `height` fits below the cursor, breaking the page otherwise, and returns the
    /// `y` the reserved content starts at.
    pub fn reserve(&mut self, height: f32) -> f32 {
        if self.cursor.ensure_space(height) == PageBreak::NewPage {
            self.document
                .add_page(self.style.page.width, self.style.page.height);
        }
        self.cursor.y()
    }

    /// Records a block drawn at the cursor and moves the cursor below it.
    pub fn commit(&mut self, kind: BlockKind, height: f32) {
        let block = LayoutBlock {
            kind,
            page: self.cursor.page_index(),
            top: self.cursor.y(),
            height,
        };
        log::trace!(
            "Placed {:?} on page {} at {:.1}mm ({:.1}mm tall)",
            block.kind,
            block.page + 1,
            block.top,
            block.height
        );
        self.blocks.push(block);
        self.cursor.advance(height);
    }

    /// Moves the cursor down without placing anything.
    pub fn advance(&mut self, height: f32) {
        self.cursor.advance(height);
    }

    pub fn fill_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    ) -> Result<(), ContextError> {
        let page = self.page();
        self.document.fill_rect(page, x, y, width, height, color)
    }

    pub fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
    ) -> Result<(), ContextError> {
        let page = self.page();
        let rule = self.style.palette.rule;
        self.document
            .stroke_rect(page, x, y, width, height, line_width, rule)
    }

    pub fn horizontal_rule(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        line_width: f32,
    ) -> Result<(), ContextError> {
        let page = self.page();
        let rule = self.style.palette.rule;
        self.document
            .draw_line(page, [x, y], [x + width, y], line_width, rule)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        text: &str,
        font_style: FontStyle,
        font_size: f32,
        color: Rgb,
        x: f32,
        baseline_y: f32,
        align: TextAlign,
    ) -> Result<(), ContextError> {
        let page = self.page();
        self.document
            .write_text(page, text, font_style, font_size, color, [x, baseline_y], align)
    }

    /// A filled bar with a bold label vertically centred in it.
    #[allow(clippy::too_many_arguments)]
    pub fn bar(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgb,
        label: &str,
        label_font_size: f32,
        label_color: Rgb,
        align: TextAlign,
    ) -> Result<(), ContextError> {
        const LABEL_INSET: f32 = 2.5;

        self.fill_rect(x, y, width, height, fill)?;
        let baseline_y = y + height / 2.0 + cap_height(label_font_size) / 2.0;
        let label_x = match align {
            TextAlign::Left => x + LABEL_INSET,
            TextAlign::Center => x + width / 2.0,
            TextAlign::Right => x + width - LABEL_INSET,
        };
        self.text(
            label,
            FontStyle::Bold,
            label_font_size,
            label_color,
            label_x,
            baseline_y,
            align,
        )
    }

    /// Draws an image scaled to fit the box without cropping, centred in it. Returns `false`
    /// when there is no usable image, in which case nothing is drawn.
    pub fn contained_image(
        &mut self,
        source: Option<&str>,
        x: f32,
        y: f32,
        box_width: f32,
        box_height: f32,
    ) -> Result<bool, ContextError> {
        let Some(embedded_image) = source.and_then(|source| self.embedded_image(source)) else {
            return Ok(false);
        };
        let Some(fit) = fit_contain(
            embedded_image.width,
            embedded_image.height,
            box_width,
            box_height,
        ) else {
            return Ok(false);
        };
        let page = self.page();
        self.document.draw_image(
            page,
            embedded_image.index,
            x + (box_width - fit.width) / 2.0,
            y + (box_height - fit.height) / 2.0,
            fit.width,
            fit.height,
        )?;

        Ok(true)
    }

    /// Draws an already decoded image with the crop-fit of the header logo, anchored at the top
    /// left of the box. Returns the height it was drawn at.
    pub fn cover_image(
        &mut self,
        decoded_image: &DecodedImage,
        x: f32,
        y: f32,
        box_width: f32,
        box_height: f32,
    ) -> Result<f32, ContextError> {
        let Some(fit) = fit_cover(
            decoded_image.width(),
            decoded_image.height(),
            box_width,
            box_height,
        ) else {
            return Ok(0.0);
        };
        let cropped_image = decoded_image.crop(fit.crop);
        let image_index = self.document.add_image(to_image_xobject(&cropped_image));
        let page = self.page();
        self.document
            .draw_image(page, image_index, x, y, fit.width, fit.height)?;

        Ok(fit.height)
    }

    pub fn loader(&self) -> &'a dyn ImageLoader {
        self.loader
    }

    /// The same source is decoded and embedded only once per document.
    fn embedded_image(&mut self, source: &str) -> Option<EmbeddedImage> {
        if let Some(embedded_image) = self.images.get(source) {
            return *embedded_image;
        }
        let embedded_image = load_image(self.loader, source).map(|decoded_image| EmbeddedImage {
            index: self.document.add_image(to_image_xobject(&decoded_image)),
            width: decoded_image.width(),
            height: decoded_image.height(),
        });
        self.images.insert(source.to_string(), embedded_image);

        embedded_image
    }

    /// Ends the drawing, handing out the document and the trace of the placed blocks.
    pub fn finish(self) -> (PdfDocument, Vec<LayoutBlock>) {
        log::debug!(
            "Laid out {} blocks over {} pages",
            self.blocks.len(),
            self.document.page_count()
        );
        (self.document, self.blocks)
    }
}

fn to_image_xobject(decoded_image: &DecodedImage) -> ImageXObject {
    ImageXObject {
        width: decoded_image.width(),
        height: decoded_image.height(),
        interpolate: true,
        image_data: decoded_image.rgb.as_raw().clone(),
    }
}
