pub mod encoding;
pub mod file_combiner;
pub mod header;
pub mod line_reader;
pub mod report;

pub use encoding::LineEncoding;
pub use file_combiner::{names_any, FileCombiner};
pub use header::{HeaderGroup, HeaderMode, HeaderVariant, Line};
pub use line_reader::LineReader;
pub use report::{CombineReport, CombineResult};
