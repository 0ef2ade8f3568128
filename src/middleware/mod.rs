/*
 * Responsibility
 * - Router-level middleware, applied in app.rs
 * - auth: bearer authentication + allow-list gate
 * - cors / http / security_headers: transport concerns, independent of v1
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
