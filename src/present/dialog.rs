use std::str::FromStr;
use std::time::Duration;

use crate::foundation::core::{IRect, Rgb8, SurfaceSize};
use crate::foundation::error::StoryError;
use crate::runtime::scheduler::TimerId;

/// Horizontal advance of one glyph of the dialog font, in surface units.
pub const GLYPH_ADVANCE: i32 = 8;
/// Height of one line of dialog text.
pub const LINE_HEIGHT: i32 = 20;
/// Default reveal period per character.
pub const DEFAULT_REVEAL_SPEED: Duration = Duration::from_millis(50);

// Padding between the box edge and the text widget, and again inside the widget.
const BOX_PADDING: i32 = 10;
const TEXT_PADDING: i32 = 10;

/// Anchor of the dialog box on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DialogPosition {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
    Center,
}

impl DialogPosition {
    /// Parse leniently. Case, spaces, dashes and underscores are ignored; anything unrecognized
    /// is [`DialogPosition::BottomLeft`].
    pub fn parse_lenient(s: &str) -> Self {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "topleft" => Self::TopLeft,
            "topright" => Self::TopRight,
            "bottomleft" => Self::BottomLeft,
            "bottomright" => Self::BottomRight,
            "center" | "centre" => Self::Center,
            _ => {
                tracing::debug!(position = s, "unrecognized dialog position; using bottom left");
                Self::BottomLeft
            }
        }
    }

    /// Box rectangle for a surface of the given size.
    pub fn rect(self, size: SurfaceSize) -> IRect {
        let (w, h) = (size.w(), size.h());
        match self {
            Self::BottomLeft => IRect::new(10, h - 160, w / 2, h - 10),
            Self::BottomRight => IRect::new(w / 2, h - 160, w - 10, h - 10),
            Self::TopLeft => IRect::new(10, 10, w / 2, 150),
            Self::TopRight => IRect::new(w / 2, 10, w - 10, 150),
            Self::Center => {
                let bw = (f64::from(w) * 0.6) as i32;
                let bh = 150;
                let x1 = (w - bw).div_euclid(2);
                let y1 = (h - bh).div_euclid(2);
                IRect::new(x1, y1, x1 + bw, y1 + bh)
            }
        }
    }
}

impl FromStr for DialogPosition {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl<'de> serde::Deserialize<'de> for DialogPosition {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(Self::parse_lenient(&s))
    }
}

/// Appearance and pacing of a dialog box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialogStyle {
    pub text_color: Rgb8,
    /// Delay between revealed characters. Zero shows the whole text at once.
    pub speed: Duration,
    pub position: DialogPosition,
    pub box_color: Rgb8,
}

impl Default for DialogStyle {
    fn default() -> Self {
        Self {
            text_color: Rgb8::WHITE,
            speed: DEFAULT_REVEAL_SPEED,
            position: DialogPosition::BottomLeft,
            box_color: Rgb8::BLACK,
        }
    }
}

impl DialogStyle {
    pub fn with_text_color(mut self, color: Rgb8) -> Self {
        self.text_color = color;
        self
    }

    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_position(mut self, position: DialogPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_box_color(mut self, color: Rgb8) -> Self {
        self.box_color = color;
        self
    }
}

/// Snapshot of the active dialog for hosts that draw text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogView {
    pub text: String,
    /// Characters revealed so far.
    pub reveal_index: usize,
    pub total_chars: usize,
    pub style: DialogStyle,
    /// Outer box.
    pub rect: IRect,
    /// Area the text is laid out in.
    pub text_rect: IRect,
    /// Wrapped lines currently in view.
    pub visible_lines: Vec<String>,
    /// Index of the first visible wrapped line.
    pub scroll_top: usize,
}

impl DialogView {
    /// Revealed prefix of the text.
    pub fn revealed(&self) -> &str {
        prefix(&self.text, self.reveal_index)
    }

    pub fn is_complete(&self) -> bool {
        self.reveal_index >= self.total_chars
    }
}

#[derive(Debug)]
pub(crate) struct DialogBox {
    text: String,
    total_chars: usize,
    style: DialogStyle,
    rect: IRect,
    reveal_index: usize,
    scroll_top: usize,
    pub(crate) timer: Option<TimerId>,
}

impl DialogBox {
    pub(crate) fn new(text: &str, style: DialogStyle, size: SurfaceSize) -> Self {
        let total_chars = text.chars().count();
        let mut dialog = Self {
            text: text.to_owned(),
            total_chars,
            style,
            rect: style.position.rect(size),
            reveal_index: 0,
            scroll_top: 0,
            timer: None,
        };
        if style.speed.is_zero() {
            dialog.reveal_index = total_chars;
            dialog.follow_end();
        }
        dialog
    }

    pub(crate) fn rect(&self) -> IRect {
        self.rect
    }

    /// Text widget area: the box less its padding.
    pub(crate) fn widget_rect(&self) -> IRect {
        self.rect.inset(BOX_PADDING)
    }

    fn text_rect(&self) -> IRect {
        self.widget_rect().inset(TEXT_PADDING)
    }

    pub(crate) fn style(&self) -> &DialogStyle {
        &self.style
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.reveal_index >= self.total_chars
    }

    /// Reveal one more character and scroll to the end. Returns `true` once complete.
    pub(crate) fn reveal_next(&mut self) -> bool {
        if self.reveal_index < self.total_chars {
            self.reveal_index += 1;
            self.follow_end();
        }
        self.is_complete()
    }

    /// Scroll by `lines`, negative towards the start. Clamped to the revealed content.
    pub(crate) fn scroll(&mut self, lines: i32) {
        let max_top = self.max_scroll_top();
        let top = self.scroll_top as i64 + i64::from(lines);
        self.scroll_top = top.clamp(0, max_top as i64) as usize;
    }

    fn columns(&self) -> usize {
        (self.text_rect().width() / GLYPH_ADVANCE).max(1) as usize
    }

    fn visible_rows(&self) -> usize {
        (self.text_rect().height() / LINE_HEIGHT).max(1) as usize
    }

    fn revealed_lines(&self) -> Vec<String> {
        wrap_text(prefix(&self.text, self.reveal_index), self.columns())
    }

    fn max_scroll_top(&self) -> usize {
        self.revealed_lines()
            .len()
            .saturating_sub(self.visible_rows())
    }

    fn follow_end(&mut self) {
        self.scroll_top = self.max_scroll_top();
    }

    pub(crate) fn view(&self) -> DialogView {
        let lines = self.revealed_lines();
        let visible_lines = lines
            .into_iter()
            .skip(self.scroll_top)
            .take(self.visible_rows())
            .collect();
        DialogView {
            text: self.text.clone(),
            reveal_index: self.reveal_index,
            total_chars: self.total_chars,
            style: self.style,
            rect: self.rect,
            text_rect: self.text_rect(),
            visible_lines,
            scroll_top: self.scroll_top,
        }
    }
}

fn prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// Word-wrap `text` to at most `columns` characters per line.
///
/// Newlines always break. Words longer than a line are split.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut len = 0usize;
        for word in paragraph.split(' ') {
            let wlen = word.chars().count();
            let needed = if len == 0 { wlen } else { len + 1 + wlen };
            if needed <= columns {
                if len > 0 {
                    line.push(' ');
                }
                line.push_str(word);
                len = needed;
                continue;
            }
            if len > 0 {
                lines.push(std::mem::take(&mut line));
            }
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > columns {
                lines.push(chars.drain(..columns).collect());
            }
            len = chars.len();
            line = chars.into_iter().collect();
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/present/dialog.rs"]
mod tests;
