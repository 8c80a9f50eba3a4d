// * Network layer: HTTP fetch with retry, ban detection and 404 handling

pub mod client;
pub mod errors;

pub use client::FastClient;
pub use errors::NetworkError;
