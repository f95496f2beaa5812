//! Page layout: a top-down cursor over A4 pages that starts a new page when a
//! block does not fit in what is left of the current one.

use crate::metrics::Font;

pub(crate) const A4_WIDTH: f32 = 595.28;
pub(crate) const A4_HEIGHT: f32 = 841.89;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    pub const GRID: Rgb = Rgb(0.62, 0.62, 0.62);

    pub const fn hex(rgb: u32) -> Rgb {
        Rgb(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )
    }
}

/// Drawing operation in PDF user space (origin bottom-left, points).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    Logo {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Default)]
pub(crate) struct Page {
    pub ops: Vec<Op>,
}

#[derive(Debug)]
pub(crate) struct Canvas {
    margins: Margins,
    pages: Vec<Page>,
    /// Distance from the top edge of the current page.
    cursor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Style {
    pub font: Font,
    pub size: f32,
    pub color: Rgb,
}

impl Style {
    pub const fn new(font: Font, size: f32) -> Self {
        Self {
            font,
            size,
            color: Rgb::BLACK,
        }
    }

    pub const fn color(self, color: Rgb) -> Self {
        Self { color, ..self }
    }

    pub fn width(&self, text: &str) -> f32 {
        self.font.width(text, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
    Right,
}

impl Canvas {
    pub fn new(margins: Margins) -> Self {
        Self {
            margins,
            pages: vec![Page::default()],
            cursor: margins.top,
        }
    }

    pub fn left(&self) -> f32 {
        self.margins.left
    }

    pub fn content_width(&self) -> f32 {
        A4_WIDTH - self.margins.left - self.margins.right
    }

    fn remaining(&self) -> f32 {
        A4_HEIGHT - self.margins.bottom - self.cursor
    }

    fn at_page_top(&self) -> bool {
        self.cursor <= self.margins.top
    }

    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = self.margins.top;
    }

    /// Make room for a block `height` tall, breaking the page if needed.
    /// Returns whether a new page was started.
    pub fn ensure(&mut self, height: f32) -> bool {
        if height > self.remaining() && !self.at_page_top() {
            self.new_page();
            return true;
        }
        false
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    /// Vertical gap that never starts a page on its own.
    pub fn space(&mut self, dy: f32) {
        self.cursor = (self.cursor + dy).min(A4_HEIGHT - self.margins.bottom);
    }

    /// PDF y coordinate `offset` points below the cursor.
    pub fn y_below(&self, offset: f32) -> f32 {
        A4_HEIGHT - self.cursor - offset
    }

    pub fn push(&mut self, op: Op) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// One line of text whose top sits at the cursor, within `[x, x + width]`.
    pub fn text_at(&mut self, x: f32, width: f32, align: Align, style: Style, text: &str) {
        self.text_below(0.0, x, width, align, style, text);
    }

    /// Like [`Canvas::text_at`], with the top of the line `dy` below the cursor.
    pub fn text_below(&mut self, dy: f32, x: f32, width: f32, align: Align, style: Style, text: &str) {
        let x = match align {
            Align::Left => x,
            Align::Center => x + (width - style.width(text)).max(0.0) / 2.0,
            Align::Right => x + (width - style.width(text)).max(0.0),
        };
        let y = self.y_below(dy + style.size * 0.8);
        self.push(Op::Text {
            x,
            y,
            font: style.font,
            size: style.size,
            color: style.color,
            text: text.to_string(),
        });
    }

    /// Lines of text across the full content width, advancing the cursor and
    /// breaking pages between lines.
    pub fn paragraph(&mut self, lines: &[String], align: Align, style: Style, leading: f32) {
        let (x, width) = (self.left(), self.content_width());
        for line in lines {
            self.ensure(leading);
            self.text_at(x, width, align, style, line);
            self.advance(leading);
        }
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}
