pub mod forms;
pub mod sql;
