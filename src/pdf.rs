use std::{collections::BTreeSet, io::BufWriter, mem};

use lopdf::{content::Operation, Object, StringFormat};
use nalgebra_glm as glm;
use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization as _;

use crate::error::ContextError;
use crate::measure::{FontStyle, POINTS_PER_MILLIMETER};
use crate::style::Rgb;

/// Converts millimetres into the points `lopdf` expects.
pub fn millimeters_to_points(millimeters: f32) -> f32 {
    millimeters * POINTS_PER_MILLIMETER
}

/// Horizontal anchoring of a piece of text relative to its `x` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// The content of a page: the list of operations of its content stream.
#[derive(Debug, Clone, Default)]
pub struct PdfLayer {
    pub(crate) operations: Vec<Operation>,
}

impl TryFrom<&PdfLayer> for lopdf::Stream {
    type Error = ContextError;

    fn try_from(value: &PdfLayer) -> Result<Self, Self::Error> {
        let stream_content = lopdf::content::Content {
            operations: value.operations.clone(),
        };
        let encoded_content = stream_content.encode().map_err(|error| {
            ContextError::with_error("Failed to encode the page content", &error)
        })?;

        Ok(lopdf::Stream::new(lopdf::Dictionary::new(), encoded_content))
    }
}

/// The low-level image representation for a PDF document: 8 bits per channel RGB samples.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Width of the image in pixels (not the width it is drawn at).
    pub width: u32,
    /// Height of the image in pixels.
    pub height: u32,
    /// Should the image be interpolated when scaled?
    pub interpolate: bool,
    /// The samples, row by row, three bytes per pixel.
    pub image_data: Vec<u8>,
}

impl From<&ImageXObject> for lopdf::Stream {
    fn from(value: &ImageXObject) -> Self {
        use lopdf::Object::*;

        let dictionary = lopdf::Dictionary::from_iter(vec![
            ("Type", Name("XObject".into())),
            ("Subtype", Name("Image".into())),
            ("Width", Integer(i64::from(value.width))),
            ("Height", Integer(i64::from(value.height))),
            ("ColorSpace", Name("DeviceRGB".into())),
            ("BitsPerComponent", Integer(8)),
            ("Interpolate", Boolean(value.interpolate)),
        ]);

        lopdf::Stream::new(dictionary, value.image_data.clone())
    }
}

/// The name an image is referenced with from the content streams.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct XObjectReference(String);

impl XObjectReference {
    pub fn new(index: usize) -> Self {
        Self(format!("X{index}"))
    }
}

#[derive(Debug, Clone)]
pub struct PdfPage {
    pub(crate) number: usize,
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
    pub(crate) layer: PdfLayer,
    /// Indices of the document images drawn on this page.
    pub(crate) images: BTreeSet<usize>,
}

impl PdfPage {
    /// Flips a distance from the top of the page, in millimetres, into a PDF `y` in points.
    fn y_from_top(&self, millimeters: f32) -> f32 {
        self.height - millimeters_to_points(millimeters)
    }
}

/// A PDF document being drawn. Coordinates of all the drawing methods are in millimetres from
/// the top-left corner of the page, like the layout code thinks about them.
///
/// Drawing only records operations; [`PdfDocument::save_to_bytes`] assembles a fresh `lopdf`
/// document from them on every call, so the output only depends on what was drawn.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub identifier: String,
    pub title: String,
    pub(crate) pages: Vec<PdfPage>,
    images: Vec<ImageXObject>,
}

impl PdfDocument {
    pub fn new(pdf_document_identifier: String) -> Self {
        PdfDocument {
            identifier: pdf_document_identifier,
            title: String::new(),
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Appends a page of the given size in millimetres and returns its index.
    pub fn add_page(&mut self, page_width: f32, page_height: f32) -> usize {
        self.pages.push(PdfPage {
            number: self.pages.len() + 1,
            width: millimeters_to_points(page_width),
            height: millimeters_to_points(page_height),
            layer: PdfLayer::default(),
            images: BTreeSet::new(),
        });

        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Registers an image so that it can be drawn on any page, returning its index.
    pub fn add_image(&mut self, image: ImageXObject) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    #[allow(clippy::too_many_arguments)]
    pub fn fill_rect(
        &mut self,
        page_index: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    ) -> Result<(), ContextError> {
        let page = self.get_mut_page(page_index)?;
        let rectangle = rectangle_operands(page, x, y, width, height);
        page.layer.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", color_operands(color)),
            Operation::new("re", rectangle),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rect(
        &mut self,
        page_index: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: Rgb,
    ) -> Result<(), ContextError> {
        let page = self.get_mut_page(page_index)?;
        let rectangle = rectangle_operands(page, x, y, width, height);
        page.layer.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![Object::Real(millimeters_to_points(line_width))]),
            Operation::new("RG", color_operands(color)),
            Operation::new("re", rectangle),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &mut self,
        page_index: usize,
        start: [f32; 2],
        end: [f32; 2],
        line_width: f32,
        color: Rgb,
    ) -> Result<(), ContextError> {
        let page = self.get_mut_page(page_index)?;
        let [start_x, start_y] = start;
        let [end_x, end_y] = end;
        let start_y = page.y_from_top(start_y);
        let end_y = page.y_from_top(end_y);
        page.layer.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![Object::Real(millimeters_to_points(line_width))]),
            Operation::new("RG", color_operands(color)),
            Operation::new(
                "m",
                vec![Object::Real(millimeters_to_points(start_x)), Object::Real(start_y)],
            ),
            Operation::new(
                "l",
                vec![Object::Real(millimeters_to_points(end_x)), Object::Real(end_y)],
            ),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);

        Ok(())
    }

    /// Writes a single line of text whose baseline sits at `baseline_y`.
    #[allow(clippy::too_many_arguments)]
    pub fn write_text(
        &mut self,
        page_index: usize,
        text: &str,
        font_style: FontStyle,
        font_size: f32,
        color: Rgb,
        caret_position: [f32; 2],
        align: TextAlign,
    ) -> Result<(), ContextError> {
        if text.is_empty() {
            return Ok(());
        }
        let text_width = crate::measure::measure_text_width(text, font_style, font_size);
        let [x, baseline_y] = caret_position;
        let x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - text_width / 2.0,
            TextAlign::Right => x - text_width,
        };

        let page = self.get_mut_page(page_index)?;
        let baseline_y = page.y_from_top(baseline_y);
        page.layer.operations.extend([
            Operation::new("BT", vec![]), // Begin text section
            Operation::new(
                "Tf",
                vec![
                    Object::Name(font_style.resource_name().into()),
                    Object::Real(font_size),
                ],
            ), // Set the font and the font size
            Operation::new(
                "Td",
                vec![Object::Real(millimeters_to_points(x)), Object::Real(baseline_y)],
            ), // Set the position where the text begins to be written
            Operation::new("rg", color_operands(color)),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);

        Ok(())
    }

    /// Draws a registered image stretched over the given box.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        page_index: usize,
        image_index: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), ContextError> {
        if image_index >= self.images.len() {
            return Err(ContextError::with_context(format!(
                "Failed to find the image with index {}",
                image_index
            )));
        }
        let page = self.get_mut_page(page_index)?;
        // The image space is the unit square, scaled to the box and moved to its bottom-left corner
        let placement = glm::translation2d(&glm::vec2(
            millimeters_to_points(x),
            page.y_from_top(y + height),
        )) * glm::scaling2d(&glm::vec2(
            millimeters_to_points(width),
            millimeters_to_points(height),
        ));
        let placement_operands = [
            placement[(0, 0)],
            placement[(1, 0)],
            placement[(0, 1)],
            placement[(1, 1)],
            placement[(0, 2)],
            placement[(1, 2)],
        ]
        .into_iter()
        .map(Object::Real)
        .collect();

        page.layer.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("cm", placement_operands),
            Operation::new(
                "Do",
                vec![Object::Name(XObjectReference::new(image_index).0.into_bytes())],
            ),
            Operation::new("Q", vec![]),
        ]);
        page.images.insert(image_index);

        Ok(())
    }

    /// Assembles the document and serializes it. Nothing random or time dependent ends up in
    /// the file, so the same drawing always produces the same bytes.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>, ContextError> {
        use lopdf::Object::*;
        use lopdf::StringFormat::*;

        let mut inner_document = lopdf::Document::with_version("1.5");

        let document_info = lopdf::Dictionary::from_iter(vec![
            ("Trapped", "False".into()),
            (
                "CreationDate",
                String(
                    to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH).into_bytes(),
                    Literal,
                ),
            ),
            (
                "ModDate",
                String(
                    to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH).into_bytes(),
                    Literal,
                ),
            ),
            ("Title", String(encode_win_ansi(&self.title), Literal)),
            ("Creator", String("schedr".to_string().into_bytes(), Literal)),
            ("Producer", String("schedr".to_string().into_bytes(), Literal)),
        ]);
        let document_info_id = inner_document.add_object(Dictionary(document_info));

        // The standard fonts only need to be named, their metrics are known to every reader
        let fonts_dictionary: lopdf::Dictionary = FontStyle::ALL
            .into_iter()
            .map(|font_style| {
                let font_dictionary = lopdf::Dictionary::from_iter(vec![
                    ("Type", Name("Font".into())),
                    ("Subtype", Name("Type1".into())),
                    ("BaseFont", Name(font_style.base_font().into())),
                    ("Encoding", Name("WinAnsiEncoding".into())),
                ]);
                let font_id = inner_document.add_object(Dictionary(font_dictionary));
                (font_style.resource_name().to_string(), Reference(font_id))
            })
            .collect();
        let fonts_dictionary_id = inner_document.add_object(Dictionary(fonts_dictionary));

        let image_ids: Vec<lopdf::ObjectId> = self
            .images
            .iter()
            .map(|image| inner_document.add_object(lopdf::Stream::from(image)))
            .collect();

        let pages_id = inner_document.new_object_id();
        let mut page_ids = Vec::<lopdf::Object>::new();

        for page in self.pages.iter() {
            let mut resource_dictionary = lopdf::Dictionary::new();
            resource_dictionary.set("Font", Reference(fonts_dictionary_id));
            if !page.images.is_empty() {
                let xobjects_dictionary: lopdf::Dictionary = page
                    .images
                    .iter()
                    .map(|&image_index| {
                        (
                            XObjectReference::new(image_index).0,
                            Reference(image_ids[image_index]),
                        )
                    })
                    .collect();
                resource_dictionary.set("XObject", Dictionary(xobjects_dictionary));
            }
            let resources_page_id = inner_document.add_object(Dictionary(resource_dictionary));

            let page_content_id = inner_document.add_object(lopdf::Stream::try_from(&page.layer)?);

            let media_box: Vec<lopdf::Object> =
                vec![0.into(), 0.into(), page.width.into(), page.height.into()];
            let page_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Rotate", Integer(0)),
                ("MediaBox", media_box.clone().into()),
                ("CropBox", media_box.into()),
                ("Parent", Reference(pages_id)),
                ("Resources", Reference(resources_page_id)),
                ("Contents", Reference(page_content_id)),
            ]);
            let page_id = inner_document.add_object(page_dictionary);
            log::trace!("Assembled page {} as object {:?}", page.number, page_id);
            page_ids.push(Reference(page_id))
        }

        let pages = lopdf::Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Count", Integer(self.pages.len() as i64)),
            ("Kids", page_ids.into()),
        ]);
        inner_document.objects.insert(pages_id, Dictionary(pages));

        let catalog = lopdf::Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("PageLayout", "OneColumn".into()),
            ("PageMode", "UseNone".into()),
            ("Pages", Reference(pages_id)),
        ]);
        let catalog_id = inner_document.add_object(catalog);

        inner_document.trailer.set("Root", Reference(catalog_id));
        inner_document.trailer.set("Info", Reference(document_info_id));
        inner_document.trailer.set(
            "ID",
            Array(vec![
                String(self.identifier.clone().into_bytes(), Literal),
                String(self.identifier.clone().into_bytes(), Literal),
            ]),
        );
        inner_document.compress();

        let mut pdf_document_bytes = Vec::new();
        let mut writer = BufWriter::new(&mut pdf_document_bytes);
        inner_document.save_to(&mut writer).map_err(|error| {
            ContextError::with_error("Error while saving the PDF document to bytes", &error)
        })?;
        mem::drop(writer);

        Ok(pdf_document_bytes)
    }

    fn get_mut_page(&mut self, page_index: usize) -> Result<&mut PdfPage, ContextError> {
        self.pages
            .get_mut(page_index)
            .ok_or(ContextError::with_context(format!(
                "Failed to find the page with index {}",
                page_index
            )))
    }
}

fn color_operands(color: Rgb) -> Vec<Object> {
    color.components().into_iter().map(Object::Real).collect()
}

/// Operands of `re` for a box given from its top-left corner in millimetres.
fn rectangle_operands(page: &PdfPage, x: f32, y: f32, width: f32, height: f32) -> Vec<Object> {
    vec![
        Object::Real(millimeters_to_points(x)),
        Object::Real(page.y_from_top(y + height)),
        Object::Real(millimeters_to_points(width)),
        Object::Real(millimeters_to_points(height)),
    ]
}

/// Encodes text for the standard fonts, which use the WinAnsi code page. Characters with no
/// WinAnsi code are replaced by a question mark.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.nfc()
        .map(|character| match character {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => character as u8,
            '\u{20ac}' => 0x80,
            '\u{201a}' => 0x82,
            '\u{201e}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' => b' ',
            _ => {
                log::warn!("Unable to encode the character {:?}, replacing it", character);
                b'?'
            }
        })
        .collect()
}

fn to_pdf_timestamp_format(date: &OffsetDateTime) -> String {
    let offset = date.offset();
    let offset_sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}{offset_sign}{:02}'{:02}'",
        date.year(),
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        offset.whole_hours().abs(),
        offset.minutes_past_hour().abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> PdfDocument {
        let mut pdf_document = PdfDocument::new("scheda-test".into());
        let page_index = pdf_document.add_page(210.0, 297.0);
        pdf_document
            .fill_rect(page_index, 0.0, 0.0, 210.0, 15.0, Rgb(11, 79, 163))
            .unwrap();
        pdf_document
            .write_text(
                page_index,
                "Squat",
                FontStyle::Bold,
                11.0,
                Rgb::BLACK,
                [105.0, 40.0],
                TextAlign::Center,
            )
            .unwrap();
        let image_index = pdf_document.add_image(ImageXObject {
            width: 2,
            height: 1,
            interpolate: true,
            image_data: vec![255, 0, 0, 0, 0, 255],
        });
        pdf_document
            .draw_image(page_index, image_index, 14.0, 20.0, 50.0, 25.0)
            .unwrap();
        pdf_document.add_page(210.0, 297.0);

        pdf_document
    }

    #[test]
    fn saved_documents_can_be_read_back() {
        let pdf_document_bytes = sample_document().save_to_bytes().unwrap();
        let loaded_document = lopdf::Document::load_mem(&pdf_document_bytes).unwrap();
        assert_eq!(loaded_document.get_pages().len(), 2);
    }

    #[test]
    fn saving_twice_gives_the_same_bytes() {
        let pdf_document = sample_document();
        assert_eq!(
            pdf_document.save_to_bytes().unwrap(),
            pdf_document.save_to_bytes().unwrap()
        );
    }

    #[test]
    fn drawing_on_a_missing_page_is_an_error() {
        let mut pdf_document = PdfDocument::new("scheda-test".into());
        assert!(pdf_document
            .fill_rect(0, 0.0, 0.0, 1.0, 1.0, Rgb::BLACK)
            .is_err());
        pdf_document.add_page(210.0, 297.0);
        assert!(pdf_document.draw_image(0, 0, 0.0, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn text_is_encoded_with_the_win_ansi_code_page() {
        assert_eq!(encode_win_ansi("Però 5€"), b"Per\xf2 5\x80".to_vec());
        assert_eq!(encode_win_ansi("rec. 1' 30\""), b"rec. 1' 30\"".to_vec());
        assert_eq!(encode_win_ansi("\u{4e2d}"), b"?".to_vec());
    }

    #[test]
    fn epoch_timestamps_follow_the_pdf_date_format() {
        assert_eq!(
            to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH),
            "D:19700101000000+00'00'"
        );
    }
}
