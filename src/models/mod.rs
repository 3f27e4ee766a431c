pub mod loaders;
pub mod record;

pub use loaders::{load_group_file, load_record_groups};
pub use record::{AnnotationResult, Record, RecordGroup, ResultTable, TableSummary};
