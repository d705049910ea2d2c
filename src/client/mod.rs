//! Dashboard client: identity, endpoint access, view state and the poll loop.

pub mod api;
pub mod command;
pub mod fence;
pub mod identity;
pub mod render;
pub mod session;
pub mod view;

use crate::services::auth::AuthError;

pub use api::CrudClient;
pub use identity::{IdentityProvider, TokenIdentityProvider};
pub use session::DashboardSession;
pub use view::{DashboardView, UpdateMatch};

/// Errors surfaced to the dashboard user.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Not signed in")]
    SignedOut,

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },
}
