// handlers/public/mod.rs - Public handlers (no session required)
//
// Login/logout, the public content listings read by the site, and health.

pub mod auth;
pub mod content;
pub mod health;

pub use health::health_get;
