//! Core library for the atolye repair-service console.
//!
//! All business data (customers, machines, repair tickets, price quotes,
//! QR-coded reports) lives in a remote REST backend; this crate is the
//! client side of that contract:
//!
//! - `api`: the authenticated request gateway and the typed endpoint client
//! - `auth`: session token storage and remembered login credentials
//! - `config`: backend instance selection and persisted settings
//! - `models`: the wire types the backend exchanges
//!
//! The backend authenticates with a JWT bearer token obtained from
//! `POST /api/Auth/Login`; the gateway attaches it to every outbound call.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, Gateway, RequestOptions, UnauthorizedPolicy};
pub use auth::{CredentialStore, Session, SessionData, TokenProvider};
pub use config::Config;
