pub mod api;
pub mod calculations;
pub mod config;
pub mod db_router;
pub mod tasks_queue;
pub mod worker;
