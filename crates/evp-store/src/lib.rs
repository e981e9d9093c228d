//! # evp-store: Content-Addressed Storage
//!
//! The content store holds encrypted payloads and hands back an identifier
//! derived from the bytes. It never sees plaintext or passphrases and it
//! never retries on its own: retry policy belongs to the orchestrator.
//!
//! | Backend | Identifier | Use |
//! |---|---|---|
//! | [`FsContentStore`] | `sha256:<hex>` | local evidence vault |
//! | [`MemoryContentStore`] | `sha256:<hex>` | tests, with fault injection |
//! | [`PinataStore`] | IPFS CIDv0 | public pinning service + gateway |

pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod pinata;
pub mod store;

pub use config::{ConfigError, PinataConfig};
pub use error::StoreError;
pub use fs::FsContentStore;
pub use memory::MemoryContentStore;
pub use pinata::PinataStore;
pub use store::{ContentMetadata, ContentStore};
