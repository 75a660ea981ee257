//! Client core for the SinglePlatform publishing API.
//!
//! # Overview
//! Signs requests with the vendor's HMAC-SHA1 scheme, builds `HttpRequest`
//! values for each supported endpoint, and parses `HttpResponse` values.
//! The core never touches the network itself; the optional `blocking`
//! feature adds a `ureq` transport for callers that want one.
//!
//! # Design
//! - `Signer` is a pure function of credentials, method, path, parameters
//!   and timestamp.
//! - `SinglePlatformClient` splits every endpoint into `build_*` and
//!   `parse_*`, so the I/O boundary is explicit.
//! - The `/updated_since/` listing is deliberately absent and the signer
//!   refuses to sign it.
//!
//! # Example
//!
//! ```rust,ignore
//! use singleplatform_core::{ClientConfig, SinglePlatformClient};
//!
//! let client = SinglePlatformClient::new(ClientConfig::from_env()?);
//! let request = client.build_menu("haru-sushi", true)?;
//! let menu = client.parse_menu(singleplatform_core::transport::execute(&request)?)?;
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod signer;
#[cfg(feature = "blocking")]
pub mod transport;
pub mod types;

pub use client::SinglePlatformClient;
pub use config::ClientConfig;
pub use credentials::Credentials;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use signer::{SignedRequest, Signer};
pub use types::{ImageType, PhotoFilter};
