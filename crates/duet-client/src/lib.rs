//! Duet client infrastructure layer.
//!
//! Wires the `duet-core` domain types to a remote HTTP backend: the
//! reqwest API client, client configuration, token store implementations,
//! the login flow, and the per-conversation synchronization engine.
//!
//! Typical wiring:
//!
//! ```ignore
//! use duet_client::{ClientConfig, ConversationSync, DuetApiClient};
//! use duet_client::auth::resolve_session;
//! use duet_client::store::FileTokenStore;
//! use duet_core::conversation::Conversation;
//! use std::sync::Arc;
//!
//! let config = ClientConfig::from_env()?;
//! let api = Arc::new(DuetApiClient::new(&config));
//! let store = FileTokenStore::new_default()?;
//! let session = resolve_session(&store).await?;
//!
//! let engine = ConversationSync::new(
//!     api,
//!     session,
//!     Conversation::new("peer-7", "Sam"),
//!     config.poll_interval,
//! )?;
//! let _loop = engine.start();
//! // ... render engine.messages().await, call engine.send(...)
//! engine.shutdown();
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod store;
pub mod sync;

pub use api::{AuthApi, ConversationApi, DuetApiClient};
pub use config::ClientConfig;
pub use sync::{ConversationSync, SendOutcome, SyncPhase};
