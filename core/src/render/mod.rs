pub mod bundle;
pub mod svg;

pub use bundle::{bundle_document, page_file_name};
pub use svg::{render_page_svg, render_svg, PlottersPainter};
