mod post;

pub use post::{AnalysisOutcome, PostFetcher, PostPipeline};
