//! Domain types for chartdex

mod fingerprint;
mod parsed;
mod record;
mod scan;
mod unit;

pub use fingerprint::Fingerprint;
pub use parsed::ParsedMetadata;
pub use record::{
    AssetFlags, ChartId, ChartMetadata, ChartRecord, ChartType, CreateChart, Difficulty,
    Instrument, InstrumentPart, NotesFormat,
};
pub use scan::{ScanIssue, ScanPhase, ScanProgress, ScanResult};
pub use unit::{path_key, ChartKind, ChartUnit, UnitFile};
