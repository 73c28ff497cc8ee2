//! Session/Role provider
//!
//! Tracks the signed-in identity and its role for the lifetime of the client.
//! State is published on a `watch` channel; the route guard and views read it
//! from there.

mod provider;
mod role;
mod state;

pub use provider::SessionProvider;
pub use role::resolve_role;
pub use state::{RoleSource, SessionState};
