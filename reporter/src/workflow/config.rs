use anyhow::{bail, Context};
use bearingcore::collaborator::{AnalysisKind, DataSource};
use bearingcore::severity::MachineClass;
use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:9000";

/// How requested machines are turned into documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// One document for one machine, optionally a single bearing.
    #[default]
    Single,
    /// One document per machine, generated concurrently.
    Individual,
    /// One document covering every machine.
    Combined,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub service_url: String,
    /// Empty means every machine with data on `date`.
    pub machines: Vec<String>,
    pub bearing: Option<String>,
    pub mode: ReportMode,
    pub date: Option<NaiveDate>,
    pub data_source: DataSource,
    pub analysis_kind: AnalysisKind,
    pub machine_class: MachineClass,
    pub output_dir: PathBuf,
    pub include_csv: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            machines: Vec::new(),
            bearing: None,
            mode: ReportMode::Single,
            date: None,
            data_source: DataSource::default(),
            analysis_kind: AnalysisKind::default(),
            machine_class: MachineClass::default(),
            output_dir: PathBuf::from("reports"),
            include_csv: false,
        }
    }
}

impl ReportConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading report config {}", path_ref.display()))?;
        let config: ReportConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing report config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(
        service_url: String,
        machines: Vec<String>,
        bearing: Option<String>,
        mode: ReportMode,
        date: Option<NaiveDate>,
        output_dir: PathBuf,
        include_csv: bool,
    ) -> anyhow::Result<Self> {
        let config = Self {
            service_url,
            machines,
            bearing,
            mode,
            date,
            output_dir,
            include_csv,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Configured date, or today when none was given.
    pub fn report_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.machines.iter().any(|id| id.trim().is_empty()) {
            bail!("machine ids must not be blank");
        }
        if let Some(bearing) = &self.bearing {
            if bearing.trim().is_empty() {
                bail!("bearing id must not be blank");
            }
            if self.mode != ReportMode::Single || self.machines.len() != 1 {
                bail!("a bearing filter needs single mode and exactly one machine");
            }
        }
        if self.mode == ReportMode::Single && self.machines.len() > 1 {
            bail!(
                "single mode takes one machine, got {}; use individual or combined",
                self.machines.len()
            );
        }
        Ok(())
    }
}
