pub mod activity;
pub mod dashboard;
