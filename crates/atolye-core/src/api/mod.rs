//! REST API client module for the repair-service backend.
//!
//! `Gateway` standardizes how every outbound call is authenticated; on top
//! of it, `ApiClient` exposes one typed method per backend endpoint:
//! customers, machines, repair tickets with their attached operations,
//! spare parts and change logs, the global price catalogs, and QR codes.
//!
//! The backend uses JWT bearer token authentication obtained through
//! `POST /api/Auth/Login`.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::{Gateway, RequestOptions, UnauthorizedPolicy};
