use crate::prelude::{RenderError, RenderResult};
use crate::render::svg::render_page_svg;
use crate::report::document::Document;
use serde::Serialize;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::CompressionMethod;

pub const MANIFEST_NAME: &str = "manifest.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    title: &'a str,
    file_name: &'a str,
    date: String,
    page_width: f64,
    page_height: f64,
    pages: Vec<ManifestPage>,
}

#[derive(Debug, Serialize)]
struct ManifestPage {
    number: usize,
    section: &'static str,
    file: String,
}

pub fn page_file_name(number: usize) -> String {
    format!("page-{:03}.svg", number)
}

/// Packs a document as one SVG per page plus a manifest.
pub fn bundle_document(document: &Document) -> RenderResult<Vec<u8>> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let mut pages = Vec::with_capacity(document.pages.len());
        for page in &document.pages {
            let file = page_file_name(page.number);
            writer.start_file(file.as_str(), options)?;
            writer.write_all(render_page_svg(document, page)?.as_bytes())?;
            pages.push(ManifestPage {
                number: page.number,
                section: page.section.name(),
                file,
            });
        }

        let manifest = Manifest {
            title: &document.title,
            file_name: &document.file_name,
            date: document.date.format("%Y-%m-%d").to_string(),
            page_width: document.page_width,
            page_height: document.page_height,
            pages,
        };
        let json = serde_json::to_vec_pretty(&manifest).map_err(|err| RenderError::Encoding(err.to_string()))?;
        writer.start_file(MANIFEST_NAME, options)?;
        writer.write_all(&json)?;
        writer.finish()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MachineReport, MachineSummary};
    use crate::report::assets::ReportAssets;
    use crate::report::composer::{compose_machine, ComposeOptions};
    use chrono::NaiveDate;
    use std::io::Read;

    #[test]
    fn bundle_holds_every_page_and_manifest() {
        let report = MachineReport {
            machine: MachineSummary::bare("m-0001"),
            bearings: Vec::new(),
        };
        let options = ComposeOptions::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let document = compose_machine(&report, ReportAssets::shared(), &options).unwrap();
        let bytes = bundle_document(&document).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), document.pages.len() + 1);

        let mut manifest = String::new();
        archive.by_name(MANIFEST_NAME).unwrap().read_to_string(&mut manifest).unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(manifest["pages"].as_array().unwrap().len(), 4);
        assert_eq!(manifest["pages"][3]["section"], "CHART_PAGE");

        let mut page = String::new();
        archive.by_name("page-004.svg").unwrap().read_to_string(&mut page).unwrap();
        assert!(page.contains("No data available"));
        assert!(page.contains("Page 4"));
    }
}
