//! Rendering of extracted documents and tables.

mod json;
mod table;

pub use json::{from_json, to_json, JsonFormat};
pub use table::{tables_to_csv, to_csv};
