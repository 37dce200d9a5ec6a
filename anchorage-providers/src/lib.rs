//! Provider schema catalog for the state store's typed parsing path.
//!
//! Each provider module defines a [`ProviderSchema`] marker plus the four
//! payload record types its provision/configuration steps use. Provider
//! modules are opt-in via cargo features.
//!
//! [`ProviderSchema`]: anchorage_state::ProviderSchema

pub use anchorage_state::ProviderSchema;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "scaleway")]
pub mod scaleway;
