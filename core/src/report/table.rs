use crate::chart::draw::{DrawCommand, Point, Rect, Rgba, TextAnchor};

pub const ROW_HEIGHT: f64 = 20.0;
const CELL_PADDING: f64 = 5.0;
const FONT_SIZE: f64 = 8.5;
/// Average glyph advance relative to the font size.
const GLYPH_RATIO: f64 = 0.52;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub title: String,
    pub width: f64,
}

impl Column {
    pub fn new(title: impl Into<String>, width: f64) -> Self {
        Self {
            title: title.into(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub fill: Option<Rgba>,
    pub color: Rgba,
    pub bold: bool,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fill: None,
            color: Rgba::INK,
            bold: false,
        }
    }

    /// White bold text on a colored background.
    pub fn badge(text: impl Into<String>, fill: Rgba) -> Self {
        Self {
            text: text.into(),
            fill: Some(fill),
            color: Rgba::WHITE,
            bold: true,
        }
    }

    pub fn tinted(text: impl Into<String>, color: Rgba) -> Self {
        Self {
            text: text.into(),
            fill: None,
            color,
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn height(&self) -> f64 {
        (self.rows.len() + 1) as f64 * ROW_HEIGHT
    }

    /// Splits rows into chunks of at most `rows_per_page`; each chunk keeps
    /// the header. An empty table still yields one chunk.
    pub fn paginate(&self, rows_per_page: usize) -> Vec<Table> {
        let size = rows_per_page.max(1);
        if self.rows.is_empty() {
            return vec![self.clone()];
        }
        self.rows
            .chunks(size)
            .map(|chunk| Table {
                columns: self.columns.clone(),
                rows: chunk.to_vec(),
            })
            .collect()
    }

    pub fn render(&self, x: f64, y: f64) -> Vec<DrawCommand> {
        let width: f64 = self.columns.iter().map(|c| c.width).sum();
        let mut commands = vec![DrawCommand::FillRect {
            rect: Rect::new(x, y, width, ROW_HEIGHT),
            color: Rgba::INK,
        }];
        let mut cursor = x;
        for column in &self.columns {
            commands.push(DrawCommand::bold_text(
                Point::new(cursor + CELL_PADDING, y + ROW_HEIGHT / 2.0),
                fit(&column.title, column.width),
                FONT_SIZE,
                Rgba::WHITE,
                TextAnchor::LEFT,
            ));
            cursor += column.width;
        }

        for (index, row) in self.rows.iter().enumerate() {
            let top = y + (index + 1) as f64 * ROW_HEIGHT;
            if index % 2 == 1 {
                commands.push(DrawCommand::FillRect {
                    rect: Rect::new(x, top, width, ROW_HEIGHT),
                    color: Rgba::PANEL,
                });
            }
            let mut cursor = x;
            for (column, cell) in self.columns.iter().zip(row) {
                if let Some(fill) = cell.fill {
                    commands.push(DrawCommand::FillRect {
                        rect: Rect::new(cursor + 2.0, top + 2.0, column.width - 4.0, ROW_HEIGHT - 4.0),
                        color: fill,
                    });
                }
                let position = Point::new(cursor + CELL_PADDING, top + ROW_HEIGHT / 2.0);
                let text = fit(&cell.text, column.width);
                commands.push(if cell.bold {
                    DrawCommand::bold_text(position, text, FONT_SIZE, cell.color, TextAnchor::LEFT)
                } else {
                    DrawCommand::text(position, text, FONT_SIZE, cell.color, TextAnchor::LEFT)
                });
                cursor += column.width;
            }
            commands.push(DrawCommand::line(
                Point::new(x, top + ROW_HEIGHT),
                Point::new(x + width, top + ROW_HEIGHT),
                Rgba::GRID,
                0.5,
            ));
        }
        commands
    }
}

/// Trims text to the characters that fit in a column, marking the cut.
fn fit(text: &str, width: f64) -> String {
    let capacity = ((width - 2.0 * CELL_PADDING) / (FONT_SIZE * GLYPH_RATIO)).floor().max(1.0) as usize;
    if text.chars().count() <= capacity {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(capacity.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> Table {
        let mut table = Table::new(vec![Column::new("Bearing", 120.0), Column::new("Axis", 60.0)]);
        for i in 0..rows {
            table.push(vec![Cell::plain(format!("b-{}", i)), Cell::plain("V")]);
        }
        table
    }

    #[test]
    fn pagination_repeats_header_and_keeps_rows() {
        let pages = table(25).paginate(10);
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.columns.len() == 2));
        assert_eq!(pages.iter().map(|p| p.rows.len()).sum::<usize>(), 25);
        assert_eq!(table(0).paginate(10).len(), 1);
    }

    #[test]
    fn long_text_is_clipped_to_column() {
        let clipped = fit("Schedule balancing service within two weeks", 60.0);
        assert!(clipped.ends_with('…'));
        assert!(clipped.chars().count() < 20);
        assert_eq!(fit("V", 60.0), "V");
    }

    #[test]
    fn render_emits_header_and_cells() {
        let commands = table(2).render(40.0, 100.0);
        let texts: Vec<_> = commands.iter().filter_map(DrawCommand::text_content).collect();
        assert_eq!(texts, vec!["Bearing", "Axis", "b-0", "V", "b-1", "V"]);
    }
}
