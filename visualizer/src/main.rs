use bearingcore::chart::{axis_color, AxisSelector};
use bearingcore::collaborator::HttpCollaborator;
use bearingcore::export::naming::spectrum_csv_name;
use bearingcore::export::spectrum_csv;
use bearingcore::model::{Axis, BearingReport, MachineReport, MachineSummary};
use bearingcore::report::{AggregateOptions, ReportAggregator};
use bearingcore::severity::{classify_optional_zone, classify_status, MachineClass};
use bearingcore::telemetry::Metrics;
use chart::SpectrumChart;
use chrono::{Local, NaiveDate};
use iced::{
    widget::{button, canvas::Canvas, column, row, scrollable, text, text_input, Column, Container, Row},
    Alignment, Color, Element, Length, Task, Theme,
};
use std::path::PathBuf;
use std::sync::Arc;

mod chart;

const SERVICE_URL_VAR: &str = "BEARING_SERVICE_URL";
const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:9000";
const HISTORY_LIMIT: usize = 20;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(state: &Visualizer) -> String {
    match &state.report {
        Some(report) => format!("Bearing Spectrum Viewer - {}", report.machine.name),
        None => "Bearing Spectrum Viewer".into(),
    }
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Light
}

fn swatch(rgba: bearingcore::chart::Rgba) -> Color {
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a as f32)
}

#[derive(Debug)]
struct Visualizer {
    collaborator: Result<Arc<HttpCollaborator>, String>,
    date: String,
    machine_id: String,
    bearing_id: String,
    machines: Vec<MachineSummary>,
    report: Option<MachineReport>,
    bearing_index: usize,
    selector: Option<AxisSelector>,
    loading: bool,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    DateChanged(String),
    MachineChanged(String),
    BearingChanged(String),
    RefreshMachines,
    MachinesListed(Result<Vec<MachineSummary>, String>),
    PickMachine(String),
    Load,
    Loaded(Result<(MachineReport, Metrics), String>),
    PickBearing(usize),
    SelectAxis(Axis),
    ExportCsv,
    Exported(Result<PathBuf, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let url = std::env::var(SERVICE_URL_VAR).unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());
        let collaborator = HttpCollaborator::new(&url)
            .map(Arc::new)
            .map_err(|err| err.to_string());
        let status = match &collaborator {
            Ok(client) => format!("Analysis service: {}", client.base_url()),
            Err(err) => format!("Service unavailable: {err}"),
        };
        let mut state = Visualizer {
            collaborator,
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            machine_id: String::new(),
            bearing_id: String::new(),
            machines: Vec::new(),
            report: None,
            bearing_index: 0,
            selector: None,
            loading: false,
            status,
            history: Vec::new(),
        };
        let task = state.list_machines();
        (state, task)
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::DateChanged(value) => {
                state.date = value;
                Task::none()
            }
            Message::MachineChanged(value) => {
                state.machine_id = value;
                Task::none()
            }
            Message::BearingChanged(value) => {
                state.bearing_id = value;
                Task::none()
            }
            Message::RefreshMachines => state.list_machines(),
            Message::MachinesListed(Ok(machines)) => {
                state.push_history(format!("{} machine(s) on {}", machines.len(), state.date));
                state.machines = machines;
                Task::none()
            }
            Message::MachinesListed(Err(err)) => {
                state.status = format!("Machine list error: {err}");
                Task::none()
            }
            Message::PickMachine(machine_id) => {
                state.machine_id = machine_id;
                state.bearing_id.clear();
                state.load()
            }
            Message::Load => state.load(),
            Message::Loaded(Ok((report, metrics))) => {
                state.loading = false;
                state.status = format!(
                    "{}: {} bearing(s), {} request(s), {} failed, {} empty",
                    report.machine.name,
                    report.bearings.len(),
                    metrics.requests,
                    metrics.failures,
                    metrics.empty
                );
                state.push_history(format!("Loaded {}", report.machine.machine_id));
                state.report = Some(report);
                state.pick_bearing(0);
                Task::none()
            }
            Message::Loaded(Err(err)) => {
                state.loading = false;
                state.status = format!("Load error: {err}");
                state.push_history(format!("Load failed: {err}"));
                Task::none()
            }
            Message::PickBearing(index) => {
                state.pick_bearing(index);
                Task::none()
            }
            Message::SelectAxis(axis) => {
                if let Some(selector) = state.selector.as_mut() {
                    selector.select(axis);
                }
                Task::none()
            }
            Message::ExportCsv => state.export_csv(),
            Message::Exported(Ok(path)) => {
                state.status = format!("Exported {}", path.display());
                state.push_history(format!("CSV {}", path.display()));
                Task::none()
            }
            Message::Exported(Err(err)) => {
                state.status = format!("Export error: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let machine_list = if state.machines.is_empty() {
            Column::new().push(text("No machines listed").size(12))
        } else {
            state.machines.iter().fold(Column::new().spacing(4), |col, machine| {
                col.push(
                    button(text(format!("{} ({})", machine.name, machine.machine_type)).size(13))
                        .on_press(Message::PickMachine(machine.machine_id.clone()))
                        .width(Length::Fill)
                        .padding(6),
                )
            })
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| col.push(text(entry.clone()).size(12)))
        };

        let controls = column![
            text("Analysis Request").size(26),
            text_input("Date (YYYY-MM-DD)", &state.date)
                .on_input(Message::DateChanged)
                .padding(6),
            button("List machines").on_press(Message::RefreshMachines).padding(8),
            Container::new(scrollable(machine_list).height(Length::Fixed(180.0))).padding(6),
            text_input("Machine ID", &state.machine_id)
                .on_input(Message::MachineChanged)
                .padding(6),
            text_input("Bearing ID (optional)", &state.bearing_id)
                .on_input(Message::BearingChanged)
                .padding(6),
            button(if state.loading { "Loading..." } else { "Load analysis" })
                .on_press_maybe((!state.loading).then_some(Message::Load))
                .padding(10),
            text(&state.status).size(14),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(140.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(340.0));

        let layout = row![controls, state.analysis_view()]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout).width(Length::Fill).height(Length::Fill).into()
    }

    fn analysis_view(&self) -> Element<'_, Message> {
        let Some(report) = &self.report else {
            return column![text("Spectrum").size(26), text("Load a machine to view its spectra").size(14)]
                .spacing(10)
                .padding(16)
                .width(Length::Fill)
                .into();
        };
        let Some(bearing) = report.bearings.get(self.bearing_index) else {
            return column![
                text(report.machine.name.clone()).size(26),
                text("No bearings were returned for this machine").size(14)
            ]
            .spacing(10)
            .padding(16)
            .width(Length::Fill)
            .into();
        };

        let bearing_buttons = report
            .bearings
            .iter()
            .enumerate()
            .fold(Row::new().spacing(6), |row, (index, entry)| {
                row.push(
                    button(text(entry.name.clone()).size(13))
                        .on_press_maybe((index != self.bearing_index).then_some(Message::PickBearing(index)))
                        .padding(6),
                )
            });

        let selected = self.selector.as_ref().and_then(AxisSelector::selected);
        let axis_buttons = Axis::ALL.into_iter().fold(Row::new().spacing(6), |row, axis| {
            let enabled = self.selector.as_ref().is_some_and(|s| s.is_enabled(axis));
            let label = if selected == Some(axis) {
                format!("[{}]", axis.label())
            } else {
                axis.label().to_string()
            };
            row.push(
                button(text(label).size(13).color(swatch(axis_color(axis))))
                    .on_press_maybe(enabled.then_some(Message::SelectAxis(axis)))
                    .padding(6),
            )
        });

        let chart: Element<'_, Message> = match selected.and_then(|axis| bearing.analysis.channel(axis).map(|c| (axis, c))) {
            Some((axis, channel)) => Canvas::new(SpectrumChart {
                axis,
                channel,
                running_frequency: bearing.analysis.running_frequency,
            })
            .width(Length::Fill)
            .height(Length::Fixed(400.0))
            .into(),
            None => Container::new(text("No spectrum available for any axis").size(16))
                .height(Length::Fixed(400.0))
                .center_y(Length::Fixed(400.0))
                .into(),
        };

        column![
            text(format!("{} / {}", report.machine.name, bearing.name)).size(26),
            bearing_buttons,
            bearing_summary(bearing),
            axis_buttons,
            chart,
            button("Export CSV")
                .on_press_maybe(selected.map(|_| Message::ExportCsv))
                .padding(8),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill)
        .into()
    }

    fn date(&self) -> Result<NaiveDate, String> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|err| format!("invalid date {}: {}", self.date, err))
    }

    fn list_machines(&mut self) -> Task<Message> {
        let (collaborator, date) = match (&self.collaborator, self.date()) {
            (Ok(collaborator), Ok(date)) => (collaborator.clone(), date),
            (Err(err), _) | (_, Err(err)) => {
                self.status = err.clone();
                return Task::none();
            }
        };
        Task::perform(fetch_machines(collaborator, date), Message::MachinesListed)
    }

    fn load(&mut self) -> Task<Message> {
        let (collaborator, date) = match (&self.collaborator, self.date()) {
            (Ok(collaborator), Ok(date)) => (collaborator.clone(), date),
            (Err(err), _) | (_, Err(err)) => {
                self.status = err.clone();
                return Task::none();
            }
        };
        let machine_id = self.machine_id.trim().to_string();
        if machine_id.is_empty() {
            self.status = "Enter a machine ID".into();
            return Task::none();
        }
        let bearing = Some(self.bearing_id.trim().to_string()).filter(|id| !id.is_empty());
        self.loading = true;
        self.status = format!("Loading {}...", machine_id);
        log::info!("loading machine {} bearing {:?} for {}", machine_id, bearing, date);
        Task::perform(fetch_report(collaborator, machine_id, bearing, date), Message::Loaded)
    }

    fn pick_bearing(&mut self, index: usize) {
        self.bearing_index = index;
        self.selector = self
            .report
            .as_ref()
            .and_then(|report| report.bearings.get(index))
            .map(|bearing| AxisSelector::for_analysis(&bearing.analysis));
    }

    fn export_csv(&mut self) -> Task<Message> {
        let Some(bearing) = self.report.as_ref().and_then(|r| r.bearings.get(self.bearing_index)) else {
            return Task::none();
        };
        let Some(axis) = self.selector.as_ref().and_then(AxisSelector::selected) else {
            return Task::none();
        };
        let date = match self.date() {
            Ok(date) => date,
            Err(err) => {
                self.status = err;
                return Task::none();
            }
        };
        match spectrum_csv(&bearing.analysis, axis, date) {
            Ok(contents) => {
                let path = PathBuf::from(spectrum_csv_name(
                    &bearing.analysis.machine_id,
                    &bearing.analysis.bearing_id,
                    axis,
                    date,
                ));
                Task::perform(write_file(path, contents), Message::Exported)
            }
            Err(err) => {
                self.status = format!("Export error: {err}");
                Task::none()
            }
        }
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }
}

fn bearing_summary(bearing: &BearingReport) -> Element<'_, Message> {
    let analysis = &bearing.analysis;
    let status = classify_status(analysis.external_status);
    let zone = classify_optional_zone(analysis.computed_zone);
    let velocity = analysis
        .velocity_rms
        .map(|v| {
            format!(
                "{:.2} mm/s (class {} band {})",
                v,
                MachineClass::default().label(),
                MachineClass::default().band_for_velocity(v).letter()
            )
        })
        .unwrap_or_else(|| "-".into());
    let diagnosis = analysis
        .diagnosis
        .as_ref()
        .map(|d| format!("{} ({}): {}", d.fault_type, d.confidence.label(), d.recommendation))
        .unwrap_or_else(|| "No diagnosis".into());

    column![
        row![
            text(format!("{} Status: {}", status.icon.glyph(), status.label))
                .size(16)
                .color(swatch(status.color)),
            text(format!("{} Zone: {}", zone.icon.glyph(), zone.label))
                .size(16)
                .color(swatch(zone.color)),
        ]
        .spacing(24),
        text(format!(
            "RPM {} | 1× {:.2} Hz | vRMS {}",
            analysis.rpm.map(|rpm| format!("{:.0}", rpm)).unwrap_or_else(|| "-".into()),
            analysis.running_frequency,
            velocity
        ))
        .size(13),
        text(diagnosis).size(13),
    ]
    .spacing(4)
    .into()
}

async fn fetch_machines(collaborator: Arc<HttpCollaborator>, date: NaiveDate) -> Result<Vec<MachineSummary>, String> {
    let aggregator = ReportAggregator::new(collaborator.as_ref(), AggregateOptions::for_display(date));
    aggregator.list_machines().await.map_err(|e| e.to_string())
}

async fn fetch_report(
    collaborator: Arc<HttpCollaborator>,
    machine_id: String,
    bearing: Option<String>,
    date: NaiveDate,
) -> Result<(MachineReport, Metrics), String> {
    let aggregator = ReportAggregator::new(collaborator.as_ref(), AggregateOptions::for_display(date));
    let report = aggregator
        .machine_report(&machine_id, bearing.as_deref())
        .await
        .map_err(|e| e.to_string())?;
    Ok((report, aggregator.metrics()))
}

async fn write_file(path: PathBuf, contents: String) -> Result<PathBuf, String> {
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(path)
}
