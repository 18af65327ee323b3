//! Count table input and distance matrix output.
//!
//! * [parse_count_table] / [read_count_table] - tab-delimited taxon x sample
//!   counts into a [CountTable](crate::model::CountTable)
//! * [format_distance_matrix] / [format_matrix] - full or partial distance
//!   matrices as tab-delimited text

pub mod reader;
pub mod table_error;
pub mod writer;

pub use reader::{parse_count_table, read_count_table};
pub use table_error::{TableError, TableErrorKind};
pub use writer::{format_distance_matrix, format_matrix};
