#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
pub mod handler;
mod state;

pub use crate::error::{AppError, ErrorBody, ErrorDetail};
pub use crate::handler::routes;
pub use crate::state::AppState;
