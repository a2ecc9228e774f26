pub mod session;

// Re-export handler functions for use in routing
pub use session::login as session_login;
pub use session::logout as session_logout;
