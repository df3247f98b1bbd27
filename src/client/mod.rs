//! Pingdom API client and authentication.
//!
//! This module provides the [`PingdomClient`] for interacting with the Pingdom API,
//! along with the [`Auth`] type.

mod auth;
mod pingdom;

pub use auth::Auth;
pub use pingdom::{DEFAULT_API_URL, PingdomClient, default_user_agent};
