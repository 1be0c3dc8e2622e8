pub mod additional_activity;
pub mod daily_activity;
pub mod daily_goal;
pub mod employee;
pub mod planned_activity;
pub mod priority;
pub mod role;
pub mod user;
