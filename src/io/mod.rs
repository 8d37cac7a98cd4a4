pub mod loader;
pub mod output;
pub mod synthetic;

pub use loader::{clean_records, load_records, write_records};
pub use output::{write_csv_tables, JsonWriter, OutputFormat, OutputWriter, TerminalWriter};
pub use synthetic::generate_cohort;
