// handlers/mod.rs - two-tier handler layout
//
// Public (no session) → Protected (admin session required). The protected
// tier is wrapped in `middleware::require_admin` by the router.

pub mod form;
pub mod protected;
pub mod public;

pub use form::ContentForm;
