//! Schedr turns the workout schedules of a gym into printable A4 PDF documents.
//!
//! A `Schedule` (read from JSON, see the `schedule` module) is laid out with one of two templates:
//! the standard one, a grid of exercise photos followed by a blank weight-tracking grid for every
//! day, and the athlete one, a matrix with one row per exercise and one column per week. The
//! entry point is `render::render`, or `render::Renderer` when the style or the way images are
//! loaded need to be changed. Both return a `RenderedSchedule`, which hands out the PDF as bytes,
//! as base64 or as a file.
//!
//! Layout is measure-then-draw: every atomic block (a bar, a row of photos, a line of a grid)
//! is measured, the space for it is reserved, possibly on a new page, and only then it is drawn.
//! No row is ever split between two pages.

/// The module were the data model of the schedules and the clients is presented.
///
/// All the structs deserialize leniently: missing fields take their default, numbers may be
/// given as strings and the Italian field names used by older schedules are accepted too.
pub mod schedule;

/// This module contains the `ContextError` type which is the error type used throughout this
/// library.
///
/// Errors only surface when the inputs cannot be read or the document cannot be written. What
/// goes wrong while drawing (an image that does not load, a malformed start date) is logged
/// and recovered from.
pub mod error;

/// Every constant of the two layouts, gathered in the immutable `RenderStyle`.
pub mod style;

/// Measurement primitives shared by both templates.
///
/// Text is measured with the metrics of the built-in Helvetica faces, wrapped greedily word by
/// word, and images are fitted to their boxes before anything is drawn. The formatting of the
/// printed values (start date, counters, loads) lives here too.
pub mod measure;

/// The page cursor that decides where the next block goes and when a page is broken.
pub mod cursor;

/// Best-effort loading of the logo and of the exercise photos.
///
/// Images come from data URIs, local files or, with the `remote-images` feature, from URLs.
/// The `ImageLoader` trait can be implemented to serve them from elsewhere.
pub mod image_source;

/// The module were the `PdfDocument` interface for working with PDF documents is presented.
///
/// # Introduction
///
/// `PdfDocument` records the drawing operations of every page in millimetres from the top-left
/// corner, and turns them into a PDF with `lopdf` when `save_to_bytes` is called. Text uses the
/// standard Helvetica faces every PDF reader carries, so no font is embedded. The documents are
/// deterministic: no random identifier nor timestamp ends up in them.
pub mod pdf;

/// The drawing surface of a render.
///
/// `Composer` binds the page cursor to the `PdfDocument`: blocks are reserved, drawn and then
/// committed, which records them as `LayoutBlock`s. That record is what `RenderedSchedule::blocks`
/// hands out.
pub mod composer;

/// The blocks shared by both templates: the header with the client details and the closing
/// notes.
pub mod sections;

/// The standard template: every day is a grid of photos with their targets, followed by an
/// empty grid where the weights lifted are written down by hand.
pub mod standard;

/// The athlete template: every day is a matrix with one row per exercise and one column per
/// week of the plan.
pub mod athlete;

/// The template dispatcher and the rendered output.
pub mod render;

pub use error::ContextError;
pub use render::{render, RenderedSchedule, Renderer};
pub use schedule::{Client, Schedule, TemplateType};
pub use style::RenderStyle;
