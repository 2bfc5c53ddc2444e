use crate::workflow::config::{ReportConfig, ReportMode};
use anyhow::{bail, Context};
use bearingcore::collaborator::AnalysisCollaborator;
use bearingcore::export::naming::spectrum_csv_name;
use bearingcore::export::spectrum_csv;
use bearingcore::model::{Axis, MachineReport};
use bearingcore::render::bundle_document;
use bearingcore::report::{
    compose_combined, compose_machine, AggregateOptions, ComposeOptions, ReportAggregator, ReportAssets,
};
use bearingcore::report::document::Document;
use bearingcore::telemetry::Metrics;
use chrono::NaiveDate;
use futures::future::join_all;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub documents: Vec<PathBuf>,
    pub csv_files: Vec<PathBuf>,
    pub page_count: usize,
    pub metrics: Metrics,
    /// Machines whose document could not be produced, with the reason.
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    fn absorb(&mut self, other: RunSummary) {
        self.documents.extend(other.documents);
        self.csv_files.extend(other.csv_files);
        self.page_count += other.page_count;
        self.metrics.requests += other.metrics.requests;
        self.metrics.failures += other.metrics.failures;
        self.metrics.empty += other.metrics.empty;
        self.failures.extend(other.failures);
    }
}

#[derive(Clone)]
pub struct Runner {
    config: ReportConfig,
}

impl Runner {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    fn aggregate_options(&self, date: NaiveDate) -> AggregateOptions {
        AggregateOptions {
            analysis_kind: self.config.analysis_kind,
            data_source: self.config.data_source,
            ..AggregateOptions::for_report(date)
        }
    }

    fn compose_options(&self, date: NaiveDate) -> ComposeOptions {
        ComposeOptions {
            machine_class: self.config.machine_class,
            ..ComposeOptions::new(date)
        }
    }

    pub async fn execute(&self, collaborator: &dyn AnalysisCollaborator) -> anyhow::Result<RunSummary> {
        let date = self.config.report_date();
        fs::create_dir_all(&self.config.output_dir)
            .with_context(|| format!("creating output directory {}", self.config.output_dir.display()))?;

        let machine_ids = self.resolve_machines(collaborator, date).await?;
        log::info!(
            "reporting {} machine(s) for {} in {:?} mode",
            machine_ids.len(),
            date,
            self.config.mode
        );

        match self.config.mode {
            ReportMode::Single => {
                let machine_id = &machine_ids[0];
                self.machine_pipeline(collaborator, machine_id, self.config.bearing.as_deref(), date)
                    .await
                    .with_context(|| format!("reporting machine {}", machine_id))
            }
            ReportMode::Individual => {
                let runs = machine_ids
                    .iter()
                    .map(|id| self.machine_pipeline(collaborator, id, None, date));
                let mut summary = RunSummary::default();
                for (machine_id, outcome) in machine_ids.iter().zip(join_all(runs).await) {
                    match outcome {
                        Ok(run) => summary.absorb(run),
                        Err(err) => {
                            log::error!("machine {} failed: {:#}", machine_id, err);
                            summary.failures.push((machine_id.clone(), format!("{:#}", err)));
                        }
                    }
                }
                if summary.documents.is_empty() {
                    bail!("no machine report could be produced");
                }
                Ok(summary)
            }
            ReportMode::Combined => self.combined_pipeline(collaborator, &machine_ids, date).await,
        }
    }

    async fn resolve_machines(&self, collaborator: &dyn AnalysisCollaborator, date: NaiveDate) -> anyhow::Result<Vec<String>> {
        if !self.config.machines.is_empty() {
            return Ok(self.config.machines.iter().map(|id| id.trim().to_string()).collect());
        }
        let aggregator = ReportAggregator::new(collaborator, self.aggregate_options(date));
        let listed: Vec<String> = aggregator
            .list_machines()
            .await
            .context("listing machines")?
            .into_iter()
            .map(|machine| machine.machine_id)
            .collect();
        if listed.is_empty() {
            bail!("no machines with data on {}", date);
        }
        if self.config.mode == ReportMode::Single && listed.len() > 1 {
            bail!(
                "{} machines have data on {}; pick one with --machine or use individual/combined mode",
                listed.len(),
                date
            );
        }
        Ok(listed)
    }

    async fn machine_pipeline(
        &self,
        collaborator: &dyn AnalysisCollaborator,
        machine_id: &str,
        bearing: Option<&str>,
        date: NaiveDate,
    ) -> anyhow::Result<RunSummary> {
        let aggregator = ReportAggregator::new(collaborator, self.aggregate_options(date));
        let report = aggregator
            .machine_report(machine_id, bearing)
            .await
            .context("aggregating analyses")?;
        let document = compose_machine(&report, ReportAssets::shared(), &self.compose_options(date))
            .context("composing document")?;

        let mut summary = RunSummary {
            metrics: aggregator.metrics(),
            ..RunSummary::default()
        };
        self.write_document(&document, &mut summary)?;
        if self.config.include_csv {
            self.write_csv(&report, date, &mut summary)?;
        }
        Ok(summary)
    }

    async fn combined_pipeline(
        &self,
        collaborator: &dyn AnalysisCollaborator,
        machine_ids: &[String],
        date: NaiveDate,
    ) -> anyhow::Result<RunSummary> {
        let aggregator = ReportAggregator::new(collaborator, self.aggregate_options(date));
        let mut reports = Vec::with_capacity(machine_ids.len());
        for machine_id in machine_ids {
            let report = aggregator
                .machine_report(machine_id, None)
                .await
                .with_context(|| format!("aggregating machine {}", machine_id))?;
            reports.push(report);
        }
        let document = compose_combined(&reports, ReportAssets::shared(), &self.compose_options(date))
            .context("composing combined document")?;

        let mut summary = RunSummary {
            metrics: aggregator.metrics(),
            ..RunSummary::default()
        };
        self.write_document(&document, &mut summary)?;
        if self.config.include_csv {
            for report in &reports {
                self.write_csv(report, date, &mut summary)?;
            }
        }
        Ok(summary)
    }

    fn write_document(&self, document: &Document, summary: &mut RunSummary) -> anyhow::Result<()> {
        let bytes = bundle_document(document).context("rendering pages")?;
        let path = self.config.output_dir.join(&document.file_name);
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {} ({} pages)", path.display(), document.pages.len());
        summary.page_count += document.pages.len();
        summary.documents.push(path);
        Ok(())
    }

    fn write_csv(&self, report: &MachineReport, date: NaiveDate, summary: &mut RunSummary) -> anyhow::Result<()> {
        for bearing in &report.bearings {
            for axis in Axis::ALL {
                if !bearing.analysis.channel(axis).is_some_and(|c| c.has_spectrum()) {
                    continue;
                }
                let contents = spectrum_csv(&bearing.analysis, axis, date)
                    .with_context(|| format!("exporting {} {}", bearing.analysis.bearing_id, axis))?;
                let path = self.config.output_dir.join(spectrum_csv_name(
                    &report.machine.machine_id,
                    &bearing.analysis.bearing_id,
                    axis,
                    date,
                ));
                fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
                summary.csv_files.push(path);
            }
        }
        Ok(())
    }
}
