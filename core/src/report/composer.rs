use crate::chart::draw::{DrawCommand, Point, Rect, Rgba, TextAnchor};
use crate::chart::layout::{ChartLayout, Margins};
use crate::chart::render::{render_chart, ChartInput};
use crate::export::naming::{combined_report_name, machine_report_name};
use crate::model::{Axis, AxisChannel, BearingReport, ExternalStatus, MachineReport, SeverityZone};
use crate::prelude::{ReportError, ReportResult};
use crate::report::assets::ReportAssets;
use crate::report::document::{
    Document, Footer, Page, PageHeader, Section, SectionCursor, A4_HEIGHT, A4_WIDTH, PAGE_MARGIN,
};
use crate::report::table::{Cell, Column, Table};
use crate::severity::{classify_optional_zone, classify_status, zone_description, MachineClass};
use chrono::NaiveDate;

pub const UPPER_SLOT: Rect = Rect::new(40.0, 80.0, 515.0, 330.0);
pub const LOWER_SLOT: Rect = Rect::new(40.0, 440.0, 515.0, 330.0);
pub const NO_DATA: &str = "No data available";
const CONTENT_TOP: f64 = 80.0;
/// Machine rows that fit under the cover title block.
const COVER_ROWS: usize = 20;
const COVER_TABLE_TOP: f64 = 290.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    pub date: NaiveDate,
    pub machine_class: MachineClass,
    /// Table rows per page before a continuation page starts.
    pub rows_per_page: usize,
}

impl ComposeOptions {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            machine_class: MachineClass::default(),
            rows_per_page: 28,
        }
    }
}

/// Builds the document for one machine.
pub fn compose_machine(report: &MachineReport, assets: &ReportAssets, options: &ComposeOptions) -> ReportResult<Document> {
    ensure_identified(report)?;
    let mut composer = Composer::new(assets, options, "Vibration Analysis Report");
    composer.machine_sections(report)?;
    composer.finish(machine_report_name(&report.machine.machine_id, options.date))
}

/// One document for several machines: a cover, then each machine's
/// sections with page numbers running on.
pub fn compose_combined(reports: &[MachineReport], assets: &ReportAssets, options: &ComposeOptions) -> ReportResult<Document> {
    for report in reports {
        ensure_identified(report)?;
    }
    let mut composer = Composer::new(assets, options, "Combined Vibration Report");
    composer.enter(Section::Cover)?;
    for body in composer.cover_bodies(reports) {
        composer.finalize(Section::Cover, format!("{} machines", reports.len()), body);
    }
    for report in reports {
        composer.machine_sections(report)?;
    }
    composer.finish(combined_report_name(reports.len(), options.date))
}

fn ensure_identified(report: &MachineReport) -> ReportResult<()> {
    if report.machine.machine_id.trim().is_empty() {
        return Err(ReportError::MissingIdentifier("machine id"));
    }
    if report.bearings.iter().any(|b| b.analysis.bearing_id.trim().is_empty()) {
        return Err(ReportError::MissingIdentifier("bearing id"));
    }
    Ok(())
}

struct Composer<'a> {
    assets: &'a ReportAssets,
    options: &'a ComposeOptions,
    title: String,
    cursor: SectionCursor,
    pages: Vec<Page>,
}

impl<'a> Composer<'a> {
    fn new(assets: &'a ReportAssets, options: &'a ComposeOptions, title: &str) -> Self {
        Self {
            assets,
            options,
            title: title.to_string(),
            cursor: SectionCursor::new(),
            pages: Vec::new(),
        }
    }

    fn enter(&mut self, section: Section) -> ReportResult<()> {
        self.cursor.advance(section)
    }

    /// Closes a page: assigns the next number and attaches header and footer.
    fn finalize(&mut self, section: Section, subtitle: String, body: Vec<DrawCommand>) {
        let number = self.pages.len() + 1;
        self.pages.push(Page {
            section,
            number,
            header: PageHeader {
                brand_initials: self.assets.brand_initials.clone(),
                brand_color: self.assets.brand_color,
                title: self.title.clone(),
                subtitle: format!("{} | {}", subtitle, self.options.date.format("%Y-%m-%d")),
            },
            footer: Footer {
                number,
                date: self.options.date,
                note: self.assets.footer_note.clone(),
            },
            body,
        });
    }

    fn finish(mut self, file_name: String) -> ReportResult<Document> {
        self.enter(Section::End)?;
        Ok(Document {
            title: self.title,
            date: self.options.date,
            file_name,
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            pages: self.pages,
        })
    }

    fn machine_sections(&mut self, report: &MachineReport) -> ReportResult<()> {
        let subtitle = format!("{} ({})", report.machine.name, report.machine.machine_id);

        self.enter(Section::SeverityLegend)?;
        let legend = self.legend_body();
        self.finalize(Section::SeverityLegend, subtitle.clone(), legend);

        self.enter(Section::MachineDetail)?;
        for body in self.machine_detail_bodies(report) {
            self.finalize(Section::MachineDetail, subtitle.clone(), body);
        }

        self.enter(Section::VibrationTable)?;
        for body in self.vibration_bodies(report) {
            self.finalize(Section::VibrationTable, subtitle.clone(), body);
        }

        self.enter(Section::ChartPage)?;
        self.chart_pages(report, &subtitle);
        Ok(())
    }

    /// Title block and the first rows of the machine list, then as many
    /// continuation pages as the rest of the list needs.
    fn cover_bodies(&self, reports: &[MachineReport]) -> Vec<Vec<DrawCommand>> {
        let center = A4_WIDTH / 2.0;
        let mut first = vec![
            DrawCommand::bold_text(Point::new(center, 180.0), self.title.clone(), 24.0, Rgba::INK, TextAnchor::CENTER),
            DrawCommand::text(
                Point::new(center, 215.0),
                self.assets.brand_name.clone(),
                12.0,
                self.assets.brand_color,
                TextAnchor::CENTER,
            ),
            DrawCommand::text(
                Point::new(center, 240.0),
                format!(
                    "Report date {} | {} machines | {} bearings",
                    self.options.date.format("%Y-%m-%d"),
                    reports.len(),
                    reports.iter().map(|r| r.bearings.len()).sum::<usize>()
                ),
                10.0,
                Rgba::MUTED,
                TextAnchor::CENTER,
            ),
        ];

        let mut table = Table::new(vec![
            Column::new("Machine", 190.0),
            Column::new("Machine ID", 170.0),
            Column::new("Bearings", 70.0),
            Column::new("Worst Zone", 85.0),
        ]);
        for report in reports {
            let worst = report.bearings.iter().filter_map(|b| b.analysis.computed_zone).max();
            let style = classify_optional_zone(worst);
            table.push(vec![
                Cell::plain(report.machine.name.clone()),
                Cell::plain(report.machine.machine_id.clone()),
                Cell::plain(report.bearings.len().to_string()),
                Cell::badge(worst.map(SeverityZone::letter).unwrap_or("?"), style.color),
            ]);
        }

        let first_capacity = COVER_ROWS.min(self.options.rows_per_page).max(1);
        let (head, rest) = table.rows.split_at(first_capacity.min(table.rows.len()));
        first.extend(
            Table {
                columns: table.columns.clone(),
                rows: head.to_vec(),
            }
            .render(PAGE_MARGIN, COVER_TABLE_TOP),
        );

        let mut bodies = vec![first];
        if !rest.is_empty() {
            let remainder = Table {
                columns: table.columns.clone(),
                rows: rest.to_vec(),
            };
            for chunk in remainder.paginate(self.options.rows_per_page) {
                let mut body = section_title("Machines (continued)");
                body.extend(chunk.render(PAGE_MARGIN, CONTENT_TOP + 30.0));
                bodies.push(body);
            }
        }
        bodies
    }

    fn legend_body(&self) -> Vec<DrawCommand> {
        let class = self.options.machine_class;
        let mut body = section_title("Severity Legend");
        body.push(DrawCommand::text(
            Point::new(PAGE_MARGIN, CONTENT_TOP + 24.0),
            format!("ISO 10816-3 velocity RMS limits, machine class {}", class.label()),
            9.0,
            Rgba::MUTED,
            TextAnchor::LEFT,
        ));

        let mut zones = Table::new(vec![
            Column::new("Zone", 50.0),
            Column::new("Condition", 100.0),
            Column::new("Velocity RMS", 110.0),
            Column::new("Meaning", 255.0),
        ]);
        for zone in SeverityZone::ALL {
            let style = classify_optional_zone(Some(zone));
            zones.push(vec![
                Cell::badge(zone.letter(), style.color),
                Cell::plain(style.label),
                Cell::plain(class.threshold_text(zone)),
                Cell::plain(zone_description(zone)),
            ]);
        }
        let zones_top = CONTENT_TOP + 40.0;
        body.extend(zones.render(PAGE_MARGIN, zones_top));

        let statuses_top = zones_top + zones.height() + 40.0;
        body.push(DrawCommand::bold_text(
            Point::new(PAGE_MARGIN, statuses_top - 12.0),
            "Platform status",
            11.0,
            Rgba::INK,
            TextAnchor::LEFT,
        ));
        let mut statuses = Table::new(vec![
            Column::new("Status", 120.0),
            Column::new("Icon", 50.0),
            Column::new("Color", 90.0),
            Column::new("Treated as", 255.0),
        ]);
        for status in [
            ExternalStatus::Normal,
            ExternalStatus::Satisfactory,
            ExternalStatus::Alert,
            ExternalStatus::Unacceptable,
            ExternalStatus::Unknown,
        ] {
            let style = classify_status(status);
            statuses.push(vec![
                Cell::badge(status.label(), style.color),
                Cell::plain(style.icon.glyph()),
                Cell::plain(style.color.hex()),
                Cell::plain(
                    style
                        .zone
                        .map(|zone| format!("Zone {}", zone.letter()))
                        .unwrap_or_else(|| "Not classified".to_string()),
                ),
            ]);
        }
        body.extend(statuses.render(PAGE_MARGIN, statuses_top));

        let mut y = statuses_top + statuses.height() + 30.0;
        for line in &self.assets.methodology {
            body.push(DrawCommand::text(Point::new(PAGE_MARGIN, y), line.clone(), 9.0, Rgba::MUTED, TextAnchor::LEFT));
            y += 14.0;
        }
        body
    }

    fn machine_detail_bodies(&self, report: &MachineReport) -> Vec<Vec<DrawCommand>> {
        if report.bearings.is_empty() {
            return vec![no_data_body("Machine Details", "No bearings were returned for this machine.")];
        }
        let machine = &report.machine;
        let mut info = Table::new(vec![Column::new("Field", 150.0), Column::new("Value", 365.0)]);
        for (field, value) in [
            ("Machine ID", machine.machine_id.clone()),
            ("Name", machine.name.clone()),
            ("Type", machine.machine_type.clone()),
            ("Customer", machine.customer_id.clone()),
            ("Area", machine.area_id.clone()),
            ("Report Date", self.options.date.format("%Y-%m-%d").to_string()),
            ("Bearings", report.bearings.len().to_string()),
        ] {
            info.push(vec![Cell::plain(field), Cell::plain(value)]);
        }

        let mut bearings = Table::new(vec![
            Column::new("Bearing", 105.0),
            Column::new("Status", 75.0),
            Column::new("Zone", 45.0),
            Column::new("Fault", 90.0),
            Column::new("Confidence", 60.0),
            Column::new("Recommendation", 140.0),
        ]);
        for bearing in &report.bearings {
            let analysis = &bearing.analysis;
            let status = classify_status(analysis.external_status);
            let zone = classify_optional_zone(analysis.computed_zone);
            let diagnosis = analysis.diagnosis.as_ref();
            bearings.push(vec![
                Cell::plain(bearing.name.clone()),
                Cell::badge(analysis.external_status.label(), status.color),
                Cell::badge(analysis.computed_zone.map(SeverityZone::letter).unwrap_or("?"), zone.color),
                Cell::plain(diagnosis.map(|d| d.fault_type.clone()).unwrap_or_else(|| "-".into())),
                Cell::plain(diagnosis.map(|d| d.confidence.label()).unwrap_or("-")),
                Cell::plain(diagnosis.map(|d| d.recommendation.clone()).unwrap_or_else(|| "-".into())),
            ]);
        }

        let first_capacity = self
            .options
            .rows_per_page
            .saturating_sub(info.rows.len() + 3)
            .max(1);
        let (head, rest) = bearings.rows.split_at(first_capacity.min(bearings.rows.len()));

        let mut first = section_title("Machine Details");
        first.extend(info.render(PAGE_MARGIN, CONTENT_TOP + 30.0));
        let bearings_top = CONTENT_TOP + 30.0 + info.height() + 30.0;
        first.push(DrawCommand::bold_text(
            Point::new(PAGE_MARGIN, bearings_top - 12.0),
            "Bearing condition",
            11.0,
            Rgba::INK,
            TextAnchor::LEFT,
        ));
        first.extend(
            Table {
                columns: bearings.columns.clone(),
                rows: head.to_vec(),
            }
            .render(PAGE_MARGIN, bearings_top),
        );

        let mut bodies = vec![first];
        if !rest.is_empty() {
            let remainder = Table {
                columns: bearings.columns.clone(),
                rows: rest.to_vec(),
            };
            for chunk in remainder.paginate(self.options.rows_per_page) {
                let mut body = section_title("Machine Details (continued)");
                body.extend(chunk.render(PAGE_MARGIN, CONTENT_TOP + 30.0));
                bodies.push(body);
            }
        }
        bodies
    }

    fn vibration_bodies(&self, report: &MachineReport) -> Vec<Vec<DrawCommand>> {
        if report.bearings.is_empty() {
            return vec![no_data_body("Vibration Measurements", "No bearings were returned for this machine.")];
        }
        let class = self.options.machine_class;
        let mut table = Table::new(vec![
            Column::new("Bearing", 130.0),
            Column::new("Axis", 55.0),
            Column::new("vRMS (mm/s)", 85.0),
            Column::new("aRMS (g)", 80.0),
            Column::new("1× Peak (mm/s)", 85.0),
            Column::new("State", 80.0),
        ]);
        for bearing in &report.bearings {
            for axis in Axis::ALL {
                table.push(vibration_row(bearing, axis, class));
            }
        }

        table
            .paginate(self.options.rows_per_page)
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let mut body = section_title(if index == 0 {
                    "Vibration Measurements"
                } else {
                    "Vibration Measurements (continued)"
                });
                body.push(DrawCommand::text(
                    Point::new(PAGE_MARGIN, CONTENT_TOP + 24.0),
                    format!("vRMS colored by ISO 10816-3 class {} limits", class.label()),
                    9.0,
                    Rgba::MUTED,
                    TextAnchor::LEFT,
                ));
                body.extend(chunk.render(PAGE_MARGIN, CONTENT_TOP + 40.0));
                body
            })
            .collect()
    }

    /// Two panels per page, bearing order then H, V, A.
    fn chart_pages(&mut self, report: &MachineReport, subtitle: &str) {
        if !report.has_any_spectrum() {
            let detail = if report.bearings.is_empty() {
                "No bearings were returned for this machine."
            } else {
                "No spectra were returned for any bearing axis."
            };
            self.finalize(Section::ChartPage, subtitle.to_string(), no_data_body("Spectrum Charts", detail));
            return;
        }

        let charts: Vec<(&BearingReport, Axis)> = report
            .bearings
            .iter()
            .flat_map(|bearing| Axis::ALL.into_iter().map(move |axis| (bearing, axis)))
            .collect();
        let last = charts.len() - 1;
        let mut body = Vec::new();
        for (index, (bearing, axis)) in charts.into_iter().enumerate() {
            let slot = if index % 2 == 0 { UPPER_SLOT } else { LOWER_SLOT };
            body.extend(chart_panel(bearing, axis, slot));
            if index % 2 == 1 || index == last {
                self.finalize(Section::ChartPage, subtitle.to_string(), std::mem::take(&mut body));
            }
        }
    }
}

fn section_title(title: &str) -> Vec<DrawCommand> {
    vec![DrawCommand::bold_text(
        Point::new(PAGE_MARGIN, CONTENT_TOP),
        title,
        14.0,
        Rgba::INK,
        TextAnchor::TOP_LEFT,
    )]
}

fn no_data_body(title: &str, detail: &str) -> Vec<DrawCommand> {
    let mut body = section_title(title);
    body.push(DrawCommand::bold_text(
        Point::new(A4_WIDTH / 2.0, A4_HEIGHT / 2.0),
        NO_DATA,
        16.0,
        Rgba::MUTED,
        TextAnchor::CENTER,
    ));
    body.push(DrawCommand::text(
        Point::new(A4_WIDTH / 2.0, A4_HEIGHT / 2.0 + 22.0),
        detail,
        10.0,
        Rgba::MUTED,
        TextAnchor::CENTER,
    ));
    body
}

fn vibration_row(bearing: &BearingReport, axis: Axis, class: MachineClass) -> Vec<Cell> {
    let metrics = bearing.metrics(axis);
    let channel = bearing.analysis.channel(axis);
    let velocity = match metrics.velocity_rms {
        Some(v) => {
            let band = class.band_for_velocity(v);
            Cell::tinted(format!("{:.2}", v), classify_optional_zone(Some(band)).color)
        }
        None => Cell::plain("-"),
    };
    let peak = metrics
        .peak_amplitude
        .or_else(|| channel.and_then(|c| c.peak_at_1x).map(|p| p.amplitude));
    let state = if channel.is_some_and(AxisChannel::has_spectrum) {
        Cell::plain("Available")
    } else {
        Cell::tinted("No data", Rgba::MUTED)
    };
    vec![
        Cell::plain(bearing.name.clone()),
        Cell::plain(axis.code()),
        velocity,
        Cell::plain(format_optional(metrics.acceleration_rms, 2)),
        Cell::plain(format_optional(peak, 3)),
        state,
    ]
}

fn format_optional(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

fn chart_panel(bearing: &BearingReport, axis: Axis, slot: Rect) -> Vec<DrawCommand> {
    let fallback = AxisChannel::unavailable(format!("No FFT data for {}", axis.wire_name()));
    let channel = bearing.analysis.channel(axis).unwrap_or(&fallback);
    let layout = ChartLayout::new(
        slot.width,
        slot.height,
        Margins::PANEL,
        &channel.spectrum,
        bearing.analysis.running_frequency,
    );
    let input = ChartInput {
        axis,
        channel,
        running_frequency: bearing.analysis.running_frequency,
    };

    let mut commands = vec![DrawCommand::bold_text(
        Point::new(slot.x, slot.y - 4.0),
        format!("{} | {}", bearing.name, axis.label()),
        9.0,
        Rgba::INK,
        TextAnchor::BOTTOM_LEFT,
    )];
    commands.extend(
        render_chart(&input, &layout, None)
            .into_iter()
            .map(|command| command.translate(slot.x, slot.y)),
    );
    commands.push(DrawCommand::StrokeRect {
        rect: slot,
        color: Rgba::GRID,
        width: 0.8,
    });
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BearingAnalysis, MachineSummary, SpectrumPoint};
    use std::collections::BTreeMap;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn options() -> ComposeOptions {
        ComposeOptions::new(date())
    }

    fn channel(available: bool) -> AxisChannel {
        if available {
            AxisChannel {
                available: true,
                spectrum: (0..20)
                    .map(|i| SpectrumPoint::new(i as f64 * 5.0, if i == 5 { 0.42 } else { 0.02 }))
                    .collect(),
                peak_at_1x: Some(SpectrumPoint::new(25.0, 0.42)),
                ..AxisChannel::default()
            }
        } else {
            AxisChannel::unavailable("No FFT data")
        }
    }

    fn bearing(id: &str, available: &[Axis]) -> BearingReport {
        let channels: BTreeMap<Axis, AxisChannel> = Axis::ALL
            .into_iter()
            .map(|axis| (axis, channel(available.contains(&axis))))
            .collect();
        BearingReport {
            name: format!("Bearing {}", id),
            analysis: BearingAnalysis {
                bearing_id: id.to_string(),
                machine_id: "m-1".into(),
                running_frequency: 25.0,
                sample_rate: 10_000.0,
                rpm: Some(1500.0),
                external_status: ExternalStatus::Satisfactory,
                computed_zone: Some(SeverityZone::B),
                velocity_rms: Some(2.1),
                diagnosis: None,
                channels,
            },
            metrics: BTreeMap::new(),
        }
    }

    fn machine(id: &str, bearings: Vec<BearingReport>) -> MachineReport {
        MachineReport {
            machine: MachineSummary::bare(id),
            bearings,
        }
    }

    fn assert_contiguous(document: &Document) {
        for (index, page) in document.pages.iter().enumerate() {
            assert_eq!(page.number, index + 1);
            assert_eq!(page.footer.number, index + 1);
            let footers = page
                .display_list(document.page_width)
                .iter()
                .filter(|c| c.text_content() == Some(page.footer.label().as_str()))
                .count();
            assert_eq!(footers, 1);
        }
    }

    #[test]
    fn chart_pages_hold_two_panels_each() {
        for count in 1..=5 {
            let bearings = (0..count).map(|i| bearing(&format!("b-{}", i), &Axis::ALL)).collect();
            let document = compose_machine(&machine("m-1", bearings), ReportAssets::shared(), &options()).unwrap();
            let expected = (3 * count + 1) / 2;
            assert_eq!(document.pages_in(Section::ChartPage).count(), expected);
            assert_contiguous(&document);
        }
    }

    #[test]
    fn combined_report_numbers_pages_across_machines() {
        let reports = vec![
            machine("m-1", vec![bearing("b-1", &Axis::ALL)]),
            machine("m-2", vec![bearing("b-2", &Axis::ALL)]),
        ];
        let document = compose_combined(&reports, ReportAssets::shared(), &options()).unwrap();
        assert_eq!(document.pages.len(), 11);
        assert_contiguous(&document);
        let sections: Vec<Section> = document.pages.iter().map(|p| p.section).collect();
        assert_eq!(sections[0], Section::Cover);
        assert_eq!(sections[1], Section::SeverityLegend);
        assert_eq!(sections[6], Section::SeverityLegend);
        assert_eq!(document.pages_in(Section::ChartPage).count(), 4);
        assert_eq!(document.file_name, "CombinedReport_2machines_2024-03-01.zip");
    }

    #[test]
    fn zero_bearings_yield_no_data_pages() {
        let document = compose_machine(&machine("m-1", Vec::new()), ReportAssets::shared(), &options()).unwrap();
        assert_eq!(document.pages.len(), 4);
        for section in [Section::MachineDetail, Section::VibrationTable, Section::ChartPage] {
            let pages: Vec<&Page> = document.pages_in(section).collect();
            assert_eq!(pages.len(), 1);
            assert!(pages[0].contains_text(NO_DATA));
        }
    }

    #[test]
    fn zero_spectra_yield_one_no_data_chart_page() {
        let report = machine("m-1", vec![bearing("b-1", &[]), bearing("b-2", &[])]);
        let document = compose_machine(&report, ReportAssets::shared(), &options()).unwrap();
        let charts: Vec<&Page> = document.pages_in(Section::ChartPage).collect();
        assert_eq!(charts.len(), 1);
        assert!(charts[0].contains_text(NO_DATA));
        assert!(!document.pages_in(Section::VibrationTable).next().unwrap().contains_text(NO_DATA));
    }

    #[test]
    fn vertical_only_bearing_shows_peak_and_no_data_panels() {
        let report = machine("m-1", vec![bearing("b-1", &[Axis::V])]);
        let document = compose_machine(&report, ReportAssets::shared(), &options()).unwrap();
        let first_chart = document.pages_in(Section::ChartPage).next().unwrap();
        assert!(first_chart.contains_text("No data"));
        assert!(first_chart.contains_text("1× Peak: 25.0 Hz, 0.420 mm/s"));
        assert!(first_chart.contains_text("Bearing b-1 | Vertical"));
        assert_eq!(document.file_name, "VibrationReport_m-1_2024-03-01.zip");
    }

    #[test]
    fn long_tables_continue_with_header() {
        let bearings = (0..12).map(|i| bearing(&format!("b-{}", i), &[Axis::V])).collect();
        let options = ComposeOptions {
            rows_per_page: 10,
            ..options()
        };
        let document = compose_machine(&machine("m-1", bearings), ReportAssets::shared(), &options).unwrap();
        let tables: Vec<&Page> = document.pages_in(Section::VibrationTable).collect();
        assert_eq!(tables.len(), 4);
        assert!(tables.iter().all(|p| p.contains_text("vRMS (mm/s)")));
        assert!(tables[1].contains_text("(continued)"));
        assert!(document.pages_in(Section::MachineDetail).count() >= 2);
        assert_contiguous(&document);
    }

    #[test]
    fn cover_lists_every_machine_across_pages() {
        let reports: Vec<MachineReport> = (0..25)
            .map(|i| machine(&format!("m-{:02}", i), vec![bearing("b-1", &[Axis::V])]))
            .collect();
        let document = compose_combined(&reports, ReportAssets::shared(), &options()).unwrap();
        let covers: Vec<&Page> = document.pages_in(Section::Cover).collect();
        assert_eq!(covers.len(), 2);
        assert!(covers[1].contains_text("Machine ID"));
        for report in &reports {
            let id = report.machine.machine_id.as_str();
            assert!(covers.iter().any(|page| page.contains_text(id)), "{} missing from cover", id);
        }
        assert!(!covers.iter().any(|page| page.contains_text("more machines")));
        assert_eq!(document.pages[2].section, Section::SeverityLegend);
        assert_contiguous(&document);
    }

    #[test]
    fn blank_machine_id_is_rejected() {
        let report = machine(" ", vec![bearing("b-1", &Axis::ALL)]);
        assert!(matches!(
            compose_machine(&report, ReportAssets::shared(), &options()),
            Err(ReportError::MissingIdentifier("machine id"))
        ));
    }
}
