pub mod annotation_flow;

pub use annotation_flow::AnnotationFlow;
