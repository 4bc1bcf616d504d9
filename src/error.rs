use thiserror::Error;

/// Main error type for the Gridpress crate.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum GridpressError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Domain module errors
    #[error("{0}")]
    WorkbookError(#[from] crate::workbook::WorkbookError),

    #[error("{0}")]
    TableError(#[from] crate::table::TableError),

    #[error("{0}")]
    TransformError(#[from] crate::transform::TransformError),

    #[error("{0}")]
    ExportError(#[from] crate::export::ExportError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, GridpressError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| GridpressError::WithContextError(format!("{}: {}", message, e)))
    }
}
