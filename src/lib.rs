//! datesort - sort files into day-named directories by creation date
//!
//! Files in a directory are grouped by the local calendar day they were
//! created on, with the day taken to end at 4 AM rather than midnight.
//! Directories whose names already start with a `day-month-year` date are
//! reused; missing ones are created as `{day}-{month}-{year}`.

pub mod bucket;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod date_dir;
pub mod date_key;
pub mod error;
pub mod mover;
pub mod output;
pub mod registry;
pub mod scan;
pub mod sorter;
pub mod undo;

pub use bucket::{CreationDateReader, DateBucketResolver, FsCreationDateReader};
pub use classifier::{ContentClassifier, Eligibility, FileClassifier};
pub use config::{CompiledFilters, ConfigError, SorterConfig};
pub use date_dir::DirectoryNameParser;
pub use date_key::DateKey;
pub use error::{SortError, SortResult};
pub use mover::{FsMover, Mover, Operation, OperationLog};
pub use registry::OutputDirectoryRegistry;
pub use sorter::{FileOutcome, SkipReason, SortReport, Sorter};
pub use undo::{UndoManager, UndoReport};

pub use cli::{SortCommand, run_cli};
