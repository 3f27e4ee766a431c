pub mod toml_loader;

pub use toml_loader::{load_group_file, load_record_groups};
