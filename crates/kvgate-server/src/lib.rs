//! HTTP server for kvgate.
//!
//! Maps `GET`, `PUT` and `DELETE` on `/{key}?token=T` onto the chunked-blob
//! engine after the token passes the access gate. Requests without a token
//! or a key get a static landing page.

pub mod config;
pub mod error;
pub mod handler;
pub mod landing;
pub mod router;
pub mod server;

pub use config::{ServerConfig, StorageConfig};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::KvGateServer;
