#![allow(non_snake_case)]
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::{Role, View, ViewId};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("no view with id {0} in the current frame")]
    UnknownView(ViewId),
    #[error("view {id} ({role:?}) does not accept {action}")]
    NotInteractive {
        id: ViewId,
        role: Role,
        action: &'static str,
    },
    #[error("composition did not settle after {0} passes")]
    RecompositionLimit(usize),
}

#[derive(Clone, Debug)]
pub struct ErrorInfo {
    pub message: String,
    pub component: String,
}

/// Builds `content`; if it panics, renders `fallback` instead.
pub fn ErrorBoundary(
    component: impl Into<String>,
    fallback: impl FnOnce(ErrorInfo) -> View,
    content: impl FnOnce() -> View,
) -> View {
    match catch_unwind(AssertUnwindSafe(content)) {
        Ok(view) => view,
        Err(err) => {
            let message = if let Some(s) = err.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = err.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            let info = ErrorInfo {
                message,
                component: component.into(),
            };
            log::error!("{} failed to build: {}", info.component, info.message);
            fallback(info)
        }
    }
}
