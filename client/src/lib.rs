//! Client library for the ballot backend.
//!
//! - [`ElectionApi`]: the request/response contract of the backend
//! - [`ApiClient`]: its HTTP implementation over `reqwest`
//! - [`ElectionStore`]: the local snapshot of elections and candidates,
//!   refetched after every successful mutation

pub mod api;
pub mod error;
pub mod http;
pub mod store;

pub use api::ElectionApi;
pub use error::ClientError;
pub use http::ApiClient;
pub use store::ElectionStore;
