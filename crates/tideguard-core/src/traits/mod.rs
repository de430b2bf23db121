mod classifier;
mod credibility;
mod storage;

pub use classifier::{Classification, IClassifier};
pub use credibility::ICredibilityScorer;
pub use storage::IHazardStorage;
