//! Host APIs for Abaco transports.
//!
//! - [`http`] - reqwest-backed [`Transport`](crate::Transport) with status classification

pub mod http;

pub use http::{HttpTransport, classify_status};
