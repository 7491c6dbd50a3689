pub mod file_lister;

pub use file_lister::{FileLister, SourcePattern};
