//! Request shaping for the Z.ai chat API.
//!
//! This crate provides:
//! - Browser-mimicking header sets (User-Agent / `sec-ch-ua` consistency)
//! - Anonymous and fallback bearer tokens
//! - Legacy and current HMAC request signatures
//! - The upstream chat completion call
//! - A model registry merging static defaults with the live list
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        ZaiClient                         │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────────────┐  │
//! │  │  headers   │  │    auth    │  │      upstream      │  │
//! │  │ (UA pool)  │  │  (tokens)  │  │ (chat completion)  │  │
//! │  └────────────┘  └────────────┘  └────────────────────┘  │
//! │         │               │                 │              │
//! │         └───────► signature ◄─────────────┘              │
//! └──────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                      ModelRegistry                       │
//! │          (static defaults + live model list)             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use zai_client::{ClientConfig, UpstreamMessage, UpstreamRequest, ZaiClient};
//!
//! let client = ZaiClient::new(ClientConfig::default());
//! let token = client.auth_token().await;
//! let request = UpstreamRequest::new(vec![UpstreamMessage::user("Hello!")])
//!     .with_field("model", "GLM-4.5")
//!     .with_field("stream", true);
//! let response = client.call_upstream(&request, "chat-id", &token).await?;
//! ```

mod client;
mod config;
mod error;
mod fallback;

pub mod auth;
pub mod headers;
pub mod registry;
pub mod signature;
pub mod upstream;

pub use auth::AuthToken;
pub use client::{AUTH_TIMEOUT, CHAT_TIMEOUT, MODELS_TIMEOUT, ZaiClient};
pub use config::{
    ClientConfig, DEFAULT_API_ENDPOINT, DEFAULT_MODELS_URL, DEFAULT_ORIGIN, DefaultModelIds,
    ThinkingMode,
};
pub use error::{Error, Result};
pub use fallback::with_fallback;
pub use headers::{BrowserFamily, HeaderSet, build_browser_headers};
pub use registry::{ModelRegistry, ModelSource, ZaiModel};
pub use signature::{SignaturePayload, generate_chat_signature, legacy_signature_headers};
pub use upstream::{UpstreamMessage, UpstreamRequest};
