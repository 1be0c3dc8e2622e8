pub mod activity_store;
pub mod daily_activity;
pub mod dashboard;
