//! Spreadsheet normalizer: column selection, identifier cleanup and the filtered sheet

pub mod export;
pub mod normalize;
pub mod reader;
pub mod writer;

/// Sheet name of the reduced workbook handed to the driver
pub const FILTERED_SHEET_NAME: &str = "Filtrada";

pub use export::{ColumnSelection, Export, RunMetadata};
pub use normalize::{
    IdentifierKind, guess_cpf_column, guess_student_id_column, header_columns,
    normalize,
};
pub use reader::{Workbook, read_filtered_workbook, read_workbook};
