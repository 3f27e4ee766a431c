pub mod prompt_builder;
pub mod response_parser;
pub mod result_writer;

pub use prompt_builder::{PromptStrategy, PromptTemplate};
pub use response_parser::{parse_response, ParsedResponse};
pub use result_writer::ResultWriter;
