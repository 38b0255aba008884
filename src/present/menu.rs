use crate::foundation::core::{IRect, Rgb8, SurfaceSize};
use crate::foundation::error::{StoryError, StoryResult};

/// Height of one option row.
pub const ROW_HEIGHT: i32 = 35;
/// Vertical padding added once to the menu height.
pub const MENU_PADDING: i32 = 20;
/// Width of the highlight outline.
pub const HIGHLIGHT_WIDTH: i32 = 2;

/// Whether a confirmed choice is written to the choice store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SaveMode {
    #[default]
    None,
    Persist,
}

/// Parameters of an option menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRequest {
    pub options: Vec<String>,
    pub box_color: Rgb8,
    pub text_color: Rgb8,
    pub save_mode: SaveMode,
    /// Tag for story choices. `None` records the choice as the last menu choice.
    pub story_id: Option<String>,
}

impl OptionRequest {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            box_color: Rgb8::BLACK,
            text_color: Rgb8::WHITE,
            save_mode: SaveMode::None,
            story_id: None,
        }
    }

    pub fn colors(mut self, box_color: Rgb8, text_color: Rgb8) -> Self {
        self.box_color = box_color;
        self.text_color = text_color;
        self
    }

    /// Persist the choice as the last menu choice.
    pub fn persist(mut self) -> Self {
        self.save_mode = SaveMode::Persist;
        self
    }

    /// Persist the choice as a story choice tagged `id`.
    pub fn persist_as(mut self, id: impl Into<String>) -> Self {
        self.save_mode = SaveMode::Persist;
        self.story_id = Some(id.into());
        self
    }
}

/// Single-shot handle for the resolution of one option menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChoiceTicket(pub(crate) u64);

/// Outcome of a confirmed option menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceResult {
    pub options: Vec<String>,
    pub choice: String,
    pub index: usize,
}

/// Snapshot of the active option menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuView {
    pub ticket: ChoiceTicket,
    pub options: Vec<String>,
    pub selected: usize,
    pub rect: IRect,
    pub highlight: IRect,
    /// Vertical center of each row, in order.
    pub row_centers: Vec<i32>,
    pub box_color: Rgb8,
    pub text_color: Rgb8,
    pub save_mode: SaveMode,
    pub story_id: Option<String>,
}

/// Menu rectangle for `count` rows: 60% of the surface width, centered on both axes.
pub fn menu_rect(size: SurfaceSize, count: usize) -> IRect {
    let (w, h) = (size.w(), size.h());
    let bw = (f64::from(w) * 0.6) as i32;
    let bh = ROW_HEIGHT.saturating_mul(count as i32).saturating_add(MENU_PADDING);
    let x1 = (w - bw).div_euclid(2);
    let y1 = (h - bh).div_euclid(2);
    IRect::new(x1, y1, x1 + bw, y1 + bh)
}

/// Vertical center of row `index`.
pub fn row_center(rect: IRect, index: usize) -> i32 {
    rect.y1 + 20 + ROW_HEIGHT * index as i32
}

/// Highlight rectangle around row `index`.
pub fn highlight_rect(rect: IRect, index: usize) -> IRect {
    let top = rect.y1 + 10 + ROW_HEIGHT * index as i32;
    IRect::new(rect.x1, top - 2, rect.x2, top + 33)
}

#[derive(Debug)]
pub(crate) struct OptionMenu {
    pub(crate) ticket: ChoiceTicket,
    request: OptionRequest,
    selected: usize,
    rect: IRect,
}

impl OptionMenu {
    pub(crate) fn new(
        ticket: ChoiceTicket,
        request: OptionRequest,
        size: SurfaceSize,
    ) -> StoryResult<Self> {
        if request.options.is_empty() {
            return Err(StoryError::EmptyOptions);
        }
        let rect = menu_rect(size, request.options.len());
        Ok(Self {
            ticket,
            request,
            selected: 0,
            rect,
        })
    }

    pub(crate) fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub(crate) fn down(&mut self) {
        self.selected = (self.selected + 1).min(self.request.options.len() - 1);
    }

    pub(crate) fn rect(&self) -> IRect {
        self.rect
    }

    pub(crate) fn highlight(&self) -> IRect {
        highlight_rect(self.rect, self.selected)
    }

    pub(crate) fn box_color(&self) -> Rgb8 {
        self.request.box_color
    }

    pub(crate) fn request(&self) -> &OptionRequest {
        &self.request
    }

    pub(crate) fn result(&self) -> ChoiceResult {
        ChoiceResult {
            options: self.request.options.clone(),
            choice: self.request.options[self.selected].clone(),
            index: self.selected,
        }
    }

    pub(crate) fn view(&self) -> MenuView {
        MenuView {
            ticket: self.ticket,
            options: self.request.options.clone(),
            selected: self.selected,
            rect: self.rect,
            highlight: self.highlight(),
            row_centers: (0..self.request.options.len())
                .map(|i| row_center(self.rect, i))
                .collect(),
            box_color: self.request.box_color,
            text_color: self.request.text_color,
            save_mode: self.request.save_mode,
            story_id: self.request.story_id.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/menu.rs"]
mod tests;
