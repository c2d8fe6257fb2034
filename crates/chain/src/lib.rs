//! Typed HTTP+JSON gateway to the Lumen consensus node.
//!
//! Every endpoint is a GET against `{endpoint}/<path>` returning the
//! `{code, msg, data}` envelope; the client unwraps the envelope, decodes
//! the payload into the structs in [`types`], and surfaces everything else
//! as a [`ClientError`].  Consumers depend on the [`ChainReader`] trait so
//! they can be driven by a mock in tests.

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::NodeClient;
pub use error::ClientError;
pub use traits::ChainReader;

#[cfg(feature = "test-utils")]
pub use traits::MockChainReader;
