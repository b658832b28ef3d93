use std::path::{Path, PathBuf};

use base64::Engine as _;
use image::{DynamicImage, GenericImageView as _, Rgb, RgbImage, Rgba};

use crate::error::ContextError;
use crate::measure::PixelRect;

/// Fetches the raw bytes behind an image reference found in a schedule.
///
/// Implement it to serve images from somewhere else than the local disk, or to stub them out.
pub trait ImageLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>, ContextError>;
}

/// Reads data URIs, local files (relative ones from `base_directory`) and, with the
/// `remote-images` feature, `http(s)` URLs.
#[derive(Debug, Clone, Default)]
pub struct DefaultImageLoader {
    pub base_directory: Option<PathBuf>,
}

impl DefaultImageLoader {
    pub fn with_base_directory(base_directory: impl Into<PathBuf>) -> Self {
        DefaultImageLoader {
            base_directory: Some(base_directory.into()),
        }
    }
}

impl ImageLoader for DefaultImageLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>, ContextError> {
        let source = source.trim();
        if source.starts_with("data:") {
            return decode_data_uri(source);
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            return fetch_remote_image(source);
        }

        let image_path = match &self.base_directory {
            Some(base_directory) if Path::new(source).is_relative() => base_directory.join(source),
            _ => PathBuf::from(source),
        };
        std::fs::read(&image_path).map_err(|error| {
            ContextError::with_error(format!("Unable to read the image {:?}", image_path), &error)
        })
    }
}

/// Decodes `data:[<mediatype>][;base64],<data>`. Only base64 payloads carry binary images.
fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>, ContextError> {
    let (header, payload) = data_uri
        .split_once(',')
        .ok_or(ContextError::with_context("The data URI has no payload"))?;
    if !header.ends_with(";base64") {
        return Err(ContextError::with_context(format!(
            "The data URI with header {:?} is not base64 encoded",
            header
        )));
    }
    let payload: String = payload.chars().filter(|character| !character.is_whitespace()).collect();

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|error| ContextError::with_error("Unable to decode the data URI", &error))
}

#[cfg(feature = "remote-images")]
fn fetch_remote_image(url: &str) -> Result<Vec<u8>, ContextError> {
    let response = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(|error| {
            ContextError::with_error(format!("Unable to fetch the image {url}"), &error)
        })?;
    let image_bytes = response.bytes().map_err(|error| {
        ContextError::with_error(format!("Unable to read the image {url}"), &error)
    })?;

    Ok(image_bytes.to_vec())
}

#[cfg(not(feature = "remote-images"))]
fn fetch_remote_image(url: &str) -> Result<Vec<u8>, ContextError> {
    Err(ContextError::with_context(format!(
        "Unable to fetch the image {url}: remote images are not enabled"
    )))
}

/// An image ready to be embedded: opaque RGB samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub rgb: RgbImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    /// Copies out a region of the image, clamped to its bounds.
    pub fn crop(&self, region: PixelRect) -> DecodedImage {
        let x = region.x.min(self.width().saturating_sub(1));
        let y = region.y.min(self.height().saturating_sub(1));
        let width = region.width.clamp(1, self.width() - x);
        let height = region.height.clamp(1, self.height() - y);

        DecodedImage {
            rgb: image::imageops::crop_imm(&self.rgb, x, y, width, height).to_image(),
        }
    }
}

/// Decodes PNG or JPEG bytes. Transparent pixels are flattened onto white, the color of the
/// cells the images are drawn in.
pub fn decode_image(image_bytes: &[u8]) -> Result<DecodedImage, ContextError> {
    let decoded_image = image::load_from_memory(image_bytes)
        .map_err(|error| ContextError::with_error("Unable to decode the image", &error))?;
    if decoded_image.width() == 0 || decoded_image.height() == 0 {
        return Err(ContextError::with_context("The image is empty"));
    }

    let rgb = match decoded_image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        decoded_image if decoded_image.color().has_alpha() => {
            let rgba = decoded_image.to_rgba8();
            RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                flatten_on_white(*rgba.get_pixel(x, y))
            })
        }
        decoded_image => decoded_image.to_rgb8(),
    };

    Ok(DecodedImage { rgb })
}

fn flatten_on_white(Rgba([red, green, blue, alpha]): Rgba<u8>) -> Rgb<u8> {
    let blend = |channel: u8| {
        let alpha = u16::from(alpha);
        ((u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
    };
    Rgb([blend(red), blend(green), blend(blue)])
}

/// Loads and decodes an image, logging and swallowing every failure: a missing photo never
/// stops a schedule from being printed.
pub fn load_image(loader: &dyn ImageLoader, source: &str) -> Option<DecodedImage> {
    if source.trim().is_empty() {
        return None;
    }
    let loaded_image = loader.load(source).and_then(|image_bytes| decode_image(&image_bytes));

    match loaded_image {
        Ok(decoded_image) => {
            log::trace!(
                "Loaded an image of {}x{} pixels",
                decoded_image.width(),
                decoded_image.height()
            );
            Some(decoded_image)
        }
        Err(error) => {
            log::warn!("Skipping the image {}: {}", abbreviate_source(source), error);
            None
        }
    }
}

/// Data URIs can be megabytes long, only their beginning is worth logging.
fn abbreviate_source(source: &str) -> String {
    const MAXIMUM_LOGGED_CHARACTERS: usize = 48;

    if source.chars().count() > MAXIMUM_LOGGED_CHARACTERS {
        let beginning: String = source.chars().take(MAXIMUM_LOGGED_CHARACTERS).collect();
        format!("{beginning:?}...")
    } else {
        format!("{source:?}")
    }
}
