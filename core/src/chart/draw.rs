//! Backend-agnostic display list shared by the screen chart and report pages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
    pub const INK: Rgba = Rgba::rgb(0x1e, 0x29, 0x3b);
    pub const MUTED: Rgba = Rgba::rgb(0x6b, 0x72, 0x80);
    pub const GRID: Rgba = Rgba::rgb(0xe2, 0xe8, 0xf0);
    pub const PANEL: Rgba = Rgba::rgb(0xf8, 0xfa, 0xfc);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnchor {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl TextAnchor {
    pub const fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub const CENTER: TextAnchor = TextAnchor::new(HAlign::Center, VAlign::Middle);
    pub const LEFT: TextAnchor = TextAnchor::new(HAlign::Left, VAlign::Middle);
    pub const RIGHT: TextAnchor = TextAnchor::new(HAlign::Right, VAlign::Middle);
    pub const TOP_LEFT: TextAnchor = TextAnchor::new(HAlign::Left, VAlign::Top);
    pub const TOP_CENTER: TextAnchor = TextAnchor::new(HAlign::Center, VAlign::Top);
    pub const BOTTOM_LEFT: TextAnchor = TextAnchor::new(HAlign::Left, VAlign::Bottom);
    pub const BOTTOM_CENTER: TextAnchor = TextAnchor::new(HAlign::Center, VAlign::Bottom);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    StrokeRect {
        rect: Rect,
        color: Rgba,
        width: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgba,
        width: f64,
        dashed: bool,
    },
    Polyline {
        points: Vec<Point>,
        color: Rgba,
        width: f64,
    },
    FillPolygon {
        points: Vec<Point>,
        color: Rgba,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
        filled: bool,
    },
    Text {
        position: Point,
        content: String,
        size: f64,
        color: Rgba,
        anchor: TextAnchor,
        bold: bool,
    },
}

impl DrawCommand {
    pub fn text(position: Point, content: impl Into<String>, size: f64, color: Rgba, anchor: TextAnchor) -> Self {
        DrawCommand::Text {
            position,
            content: content.into(),
            size,
            color,
            anchor,
            bold: false,
        }
    }

    pub fn bold_text(position: Point, content: impl Into<String>, size: f64, color: Rgba, anchor: TextAnchor) -> Self {
        DrawCommand::Text {
            position,
            content: content.into(),
            size,
            color,
            anchor,
            bold: true,
        }
    }

    pub fn line(from: Point, to: Point, color: Rgba, width: f64) -> Self {
        DrawCommand::Line {
            from,
            to,
            color,
            width,
            dashed: false,
        }
    }

    /// Moves the command by (dx, dy); used to drop a chart into a page slot.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        match self {
            DrawCommand::FillRect { rect, color } => DrawCommand::FillRect {
                rect: rect.offset(dx, dy),
                color,
            },
            DrawCommand::StrokeRect { rect, color, width } => DrawCommand::StrokeRect {
                rect: rect.offset(dx, dy),
                color,
                width,
            },
            DrawCommand::Line {
                from,
                to,
                color,
                width,
                dashed,
            } => DrawCommand::Line {
                from: from.offset(dx, dy),
                to: to.offset(dx, dy),
                color,
                width,
                dashed,
            },
            DrawCommand::Polyline {
                points,
                color,
                width,
            } => DrawCommand::Polyline {
                points: points.into_iter().map(|p| p.offset(dx, dy)).collect(),
                color,
                width,
            },
            DrawCommand::FillPolygon { points, color } => DrawCommand::FillPolygon {
                points: points.into_iter().map(|p| p.offset(dx, dy)).collect(),
                color,
            },
            DrawCommand::Circle {
                center,
                radius,
                color,
                filled,
            } => DrawCommand::Circle {
                center: center.offset(dx, dy),
                radius,
                color,
                filled,
            },
            DrawCommand::Text {
                position,
                content,
                size,
                color,
                anchor,
                bold,
            } => DrawCommand::Text {
                position: position.offset(dx, dy),
                content,
                size,
                color,
                anchor,
                bold,
            },
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match self {
            DrawCommand::Text { content, .. } => Some(content),
            _ => None,
        }
    }
}
