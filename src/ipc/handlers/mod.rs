pub mod attendance;
pub mod auth;
pub mod backup_exchange;
pub mod core;
pub mod exams;
pub mod reports;
pub mod roster;
pub mod sections;
pub mod subjects;
pub mod teachers;
