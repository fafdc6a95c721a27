use std::sync::Arc;

use serde::Deserialize;

use crate::config::AppConfig;
use crate::db_router::StoreRegistry;
use crate::tasks_queue::TaskQueue;

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub queue: TaskQueue,
    pub registry: Arc<StoreRegistry>,
}

#[derive(Debug, thiserror::Error)]
#[error("Please enter valid numbers")]
pub struct ValidationError;

/// Raw submission form. Operands stay strings here so a bad value surfaces
/// our validation message instead of a framework deserialization error.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub x: Option<String>,
    pub y: Option<String>,
}

impl SubmitForm {
    /// Parse both operands, treating a missing field as 0.
    pub fn operands(&self) -> Result<(i64, i64), ValidationError> {
        let x = parse_operand(self.x.as_deref())?;
        let y = parse_operand(self.y.as_deref())?;
        Ok((x, y))
    }
}

fn parse_operand(raw: Option<&str>) -> Result<i64, ValidationError> {
    raw.unwrap_or("0").trim().parse().map_err(|_| ValidationError)
}
