pub mod config;
pub mod error;
pub mod header;
pub mod output;
pub mod record;
pub mod table;
pub mod vcftable;

pub use config::Settings;
pub use error::{Error, Result};
pub use header::{HeaderText, InfoKeyToName, Schema};
pub use output::Destination;
pub use record::{Record, RecordDecoder};
pub use table::Table;
pub use vcftable::TableBuilder;
