use crate::style::PageStyle;

/// Outcome of a space reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBreak {
    /// The content fits below the cursor on the current page.
    Fits,
    /// A new page was started and the cursor moved to its top margin.
    NewPage,
}

/// Vertical drawing position on the current page.
///
/// Layout is measure-then-draw: the height of every atomic chunk is passed to
/// [`PageCursor::ensure_space`] before anything of it is drawn, and the cursor only ever moves
/// down within a page.
#[derive(Debug, Clone)]
pub struct PageCursor {
    page_height: f32,
    top_margin: f32,
    safety_bottom: f32,
    cursor_y: f32,
    page_index: usize,
}

impl PageCursor {
    /// A cursor at the very top of the first page.
    pub fn new(page_style: &PageStyle) -> Self {
        PageCursor {
            page_height: page_style.height,
            top_margin: page_style.top_margin,
            safety_bottom: page_style.safety_bottom,
            cursor_y: 0.0,
            page_index: 0,
        }
    }

    pub fn y(&self) -> f32 {
        self.cursor_y
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Lowest coordinate content may reach on any page.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.safety_bottom
    }

    pub fn remaining(&self) -> f32 {
        self.bottom_limit() - self.cursor_y
    }

    pub fn fits(&self, required_height: f32) -> bool {
        self.cursor_y + required_height <= self.bottom_limit()
    }

    /// Starts a new page when `required_height` does not fit below the cursor.
    ///
    /// A chunk taller than a whole page cannot fit anywhere: it gets a single fresh page and
    /// overflows its bottom, instead of pushing out empty pages forever.
    pub fn ensure_space(&mut self, required_height: f32) -> PageBreak {
        if self.fits(required_height) {
            return PageBreak::Fits;
        }
        if self.cursor_y <= self.top_margin && self.page_index > 0 {
            log::warn!(
                "A block of {:.1}mm is taller than the page, it will overflow page {}",
                required_height,
                self.page_index + 1
            );
            return PageBreak::Fits;
        }
        self.start_new_page();

        PageBreak::NewPage
    }

    /// Moves the cursor down once a chunk has been drawn. Negative heights are ignored.
    pub fn advance(&mut self, height: f32) {
        self.cursor_y += height.max(0.0);
    }

    fn start_new_page(&mut self) {
        self.page_index += 1;
        self.cursor_y = self.top_margin;
        log::debug!("Started page {} of the schedule", self.page_index + 1);
    }
}
