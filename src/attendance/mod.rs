pub mod classifier;
pub mod submission;
pub mod sweep;
pub mod transition;
