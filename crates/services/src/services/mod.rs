pub mod assistant;
pub mod completion;
pub mod config;
pub mod email;
pub mod notification;
pub mod status;
pub mod task_aggregation;
