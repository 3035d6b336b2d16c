use thiserror::Error;

pub mod export;

pub use export::{export_file_name, write_export, ExportRow};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
