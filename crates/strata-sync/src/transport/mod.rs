//! HTTP transport: shared client construction, `Link` header parsing, and
//! the repository client.

pub mod http_client;
pub mod link_header;
mod repository;

pub use http_client::HttpClientConfig;
pub use repository::HttpRepository;
