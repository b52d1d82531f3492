//! HTTP implementation of [`ChatBackend`](crate::ChatBackend) against the
//! pdfchat JSON API.

mod api;
mod client;


pub use client::{HttpBackend, HttpBackendConfig};
