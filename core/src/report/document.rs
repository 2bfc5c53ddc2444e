use crate::chart::draw::{DrawCommand, Point, Rect, Rgba, TextAnchor};
use crate::prelude::{ReportError, ReportResult};
use chrono::NaiveDate;

pub const A4_WIDTH: f64 = 595.0;
pub const A4_HEIGHT: f64 = 842.0;
pub const PAGE_MARGIN: f64 = 40.0;
pub const HEADER_RULE_Y: f64 = 62.0;
pub const FOOTER_RULE_Y: f64 = 800.0;

/// Report sections in document order. `Start` and `End` are cursor states
/// only and never label a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Start,
    Cover,
    SeverityLegend,
    MachineDetail,
    VibrationTable,
    ChartPage,
    End,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Start => "START",
            Section::Cover => "COVER",
            Section::SeverityLegend => "SEVERITY_LEGEND",
            Section::MachineDetail => "MACHINE_DETAIL",
            Section::VibrationTable => "VIBRATION_TABLE",
            Section::ChartPage => "CHART_PAGE",
            Section::End => "END",
        }
    }

    pub fn can_follow(self, previous: Section) -> bool {
        use Section::*;
        matches!(
            (previous, self),
            (Start, Cover)
                | (Start, SeverityLegend)
                | (Cover, SeverityLegend)
                | (Cover, End)
                | (SeverityLegend, MachineDetail)
                | (MachineDetail, VibrationTable)
                | (VibrationTable, ChartPage)
                | (ChartPage, SeverityLegend)
                | (ChartPage, End)
        )
    }
}

/// Tracks the current section and rejects out-of-order moves.
#[derive(Debug, Clone, Copy)]
pub struct SectionCursor {
    current: Section,
}

impl SectionCursor {
    pub fn new() -> Self {
        Self {
            current: Section::Start,
        }
    }

    pub fn current(&self) -> Section {
        self.current
    }

    pub fn advance(&mut self, next: Section) -> ReportResult<()> {
        if !next.can_follow(self.current) {
            return Err(ReportError::InvalidTransition {
                from: self.current.name(),
                to: next.name(),
            });
        }
        self.current = next;
        Ok(())
    }
}

impl Default for SectionCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub brand_initials: String,
    pub brand_color: Rgba,
    pub title: String,
    pub subtitle: String,
}

impl PageHeader {
    fn commands(&self, page_width: f64) -> Vec<DrawCommand> {
        let badge = Rect::new(PAGE_MARGIN, 18.0, 34.0, 34.0);
        vec![
            DrawCommand::FillRect {
                rect: badge,
                color: self.brand_color,
            },
            DrawCommand::bold_text(badge.center(), self.brand_initials.clone(), 13.0, Rgba::WHITE, TextAnchor::CENTER),
            DrawCommand::bold_text(
                Point::new(badge.right() + 10.0, 22.0),
                self.title.clone(),
                14.0,
                Rgba::INK,
                TextAnchor::TOP_LEFT,
            ),
            DrawCommand::text(
                Point::new(badge.right() + 10.0, 40.0),
                self.subtitle.clone(),
                10.0,
                Rgba::MUTED,
                TextAnchor::TOP_LEFT,
            ),
            DrawCommand::line(
                Point::new(PAGE_MARGIN, HEADER_RULE_Y),
                Point::new(page_width - PAGE_MARGIN, HEADER_RULE_Y),
                Rgba::GRID,
                1.0,
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    pub number: usize,
    pub date: NaiveDate,
    pub note: String,
}

impl Footer {
    pub fn label(&self) -> String {
        format!("Page {}", self.number)
    }

    fn commands(&self, page_width: f64) -> Vec<DrawCommand> {
        vec![
            DrawCommand::line(
                Point::new(PAGE_MARGIN, FOOTER_RULE_Y),
                Point::new(page_width - PAGE_MARGIN, FOOTER_RULE_Y),
                Rgba::GRID,
                1.0,
            ),
            DrawCommand::text(
                Point::new(PAGE_MARGIN, FOOTER_RULE_Y + 14.0),
                format!("{} | {}", self.note, self.date.format("%Y-%m-%d")),
                8.0,
                Rgba::MUTED,
                TextAnchor::LEFT,
            ),
            DrawCommand::text(
                Point::new(page_width - PAGE_MARGIN, FOOTER_RULE_Y + 14.0),
                self.label(),
                9.0,
                Rgba::INK,
                TextAnchor::RIGHT,
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub section: Section,
    pub number: usize,
    pub header: PageHeader,
    pub footer: Footer,
    pub body: Vec<DrawCommand>,
}

impl Page {
    /// Header, body and footer in paint order.
    pub fn display_list(&self, page_width: f64) -> Vec<DrawCommand> {
        let mut commands = vec![DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, page_width, A4_HEIGHT),
            color: Rgba::WHITE,
        }];
        commands.extend(self.header.commands(page_width));
        commands.extend(self.body.iter().cloned());
        commands.extend(self.footer.commands(page_width));
        commands
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.body
            .iter()
            .filter_map(DrawCommand::text_content)
            .any(|text| text.contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub date: NaiveDate,
    pub file_name: String,
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn pages_in(&self, section: Section) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(move |page| page.section == section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_follows_document_order() {
        let mut cursor = SectionCursor::new();
        for next in [
            Section::Cover,
            Section::SeverityLegend,
            Section::MachineDetail,
            Section::VibrationTable,
            Section::ChartPage,
            Section::SeverityLegend,
            Section::MachineDetail,
            Section::VibrationTable,
            Section::ChartPage,
            Section::End,
        ] {
            cursor.advance(next).unwrap();
        }
        assert_eq!(cursor.current(), Section::End);
    }

    #[test]
    fn cursor_rejects_skipped_sections() {
        let mut cursor = SectionCursor::new();
        cursor.advance(Section::SeverityLegend).unwrap();
        let err = cursor.advance(Section::ChartPage).unwrap_err();
        assert!(matches!(
            err,
            ReportError::InvalidTransition {
                from: "SEVERITY_LEGEND",
                to: "CHART_PAGE"
            }
        ));
        assert_eq!(cursor.current(), Section::SeverityLegend);
    }

    #[test]
    fn display_list_wraps_body_with_one_header_and_footer() {
        let page = Page {
            section: Section::ChartPage,
            number: 7,
            header: PageHeader {
                brand_initials: "VA".into(),
                brand_color: Rgba::INK,
                title: "Vibration Report".into(),
                subtitle: "Pump 1".into(),
            },
            footer: Footer {
                number: 7,
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                note: "Confidential".into(),
            },
            body: vec![DrawCommand::text(Point::new(1.0, 1.0), "body", 10.0, Rgba::INK, TextAnchor::LEFT)],
        };
        let texts: Vec<String> = page
            .display_list(A4_WIDTH)
            .iter()
            .filter_map(|c| c.text_content().map(str::to_string))
            .collect();
        assert_eq!(texts.iter().filter(|t| t.as_str() == "Page 7").count(), 1);
        assert!(texts.contains(&"Confidential | 2024-03-01".to_string()));
        assert!(page.contains_text("body"));
    }
}
