use crate::chart::draw::DrawCommand;

/// Failure talking to the external analysis collaborator.
#[derive(thiserror::Error, Debug)]
pub enum CollaboratorError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("collaborator returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("invalid collaborator url: {0}")]
    InvalidUrl(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Errors that halt a report or chart flow.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("missing required identifier: {0}")]
    MissingIdentifier(&'static str),
    #[error("invalid section transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors produced while serializing charts, tables, or documents.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("drawing backend failure: {0}")]
    Backend(String),
    #[error("csv failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("archive failure: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding failure: {0}")]
    Encoding(String),
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;
pub type ReportResult<T> = Result<T, ReportError>;
pub type RenderResult<T> = Result<T, RenderError>;

/// A surface that can replay a chart or page display list.
pub trait PaintTarget {
    fn paint(&mut self, command: &DrawCommand) -> RenderResult<()>;

    fn paint_all(&mut self, commands: &[DrawCommand]) -> RenderResult<()> {
        for command in commands {
            self.paint(command)?;
        }
        Ok(())
    }
}
