pub mod auth;
pub mod comments;
pub mod convert;
pub mod error;
pub mod extract;
pub mod feed;
pub mod form;
pub mod media;
pub mod notifications;
pub mod posts;
pub mod reports;
pub mod router;
pub mod social;
pub mod state;
pub mod users;

pub use router::router;
pub use state::{AppState, AppStateInner};
