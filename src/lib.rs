//! Storefront Rust Client
//!
//! A Rust client library for the storefront API, with session token storage,
//! bearer-token request wrapping, and token-driven view selection.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_support;

pub use client::StorefrontClient;
pub use config::{ClientConfig, Persistence};
pub use error::{ClientError, Result, TokenError};
pub use gateway::{RequestBody, RequestGateway, RequestOptions};
pub use session::Session;
pub use storage::{LocalStorage, SessionStorage, StorageArea};
pub use token::{decode_payload, TokenPayload};
pub use types::NormalizedResponse;
pub use view::{select_view, Section, View, ViewController, ViewSurface};
