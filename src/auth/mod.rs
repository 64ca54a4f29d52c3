//! Authentication module

pub mod store;

pub use store::{AuthError, AuthState, AuthStore, User};
