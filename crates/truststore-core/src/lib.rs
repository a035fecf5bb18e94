//! Core types and errors for the TLS truststore.
//!
//! This crate provides the foundational types shared by the truststore
//! operator and its requirers:
//!
//! - **Types**: requests, issued certificates and the published trust map
//! - **Schemas**: field names and validation for relation databags
//! - **Errors**: the typed failure taxonomy in [`TrustStoreError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use truststore_core::{TrustMap, Result};
//!
//! fn show(map: &TrustMap) -> Result<()> {
//!     println!("{}", map.to_canonical_json()?);
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/truststore-core/0.1.0")]

mod error;
pub mod types;

pub use error::{CardinalityError, ParseError, Result, TransportError, TrustStoreError};
pub use types::*;
