// handlers/protected/mod.rs - Admin handlers (session required)
//
// Every route in this tier runs behind `middleware::require_admin`, which
// puts the resolved `AuthUser` into the request extensions.

pub mod auth;
pub mod content;
