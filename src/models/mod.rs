//! Domain models and request DTOs.

pub mod principal;
pub mod task;
