/// Collaborator traits consumed by the scanner
use crate::error::Result;
use crate::types::{ParsedMetadata, UnitFile};

/// Chart metadata parser
///
/// Implementers turn the member files of one chart unit into structured
/// metadata. Parsing must be synchronous and free of side effects: the
/// scanner calls it from blocking worker threads and may call it for the
/// same unit more than once.
///
/// Members the scanner chose not to load are passed as zero-length
/// placeholders (see [`UnitFile::placeholder`]); their names are still
/// meaningful.
pub trait ChartParser: Send + Sync {
    /// Parse the files of a single chart unit
    ///
    /// # Errors
    /// Returns an error if the unit has no usable chart file or a chart file
    /// is malformed
    fn parse_chart_unit(&self, files: &[UnitFile]) -> Result<ParsedMetadata>;
}
