pub mod list;

// Re-export handler functions for use in routing
pub use list::certificates as certificates_get;
pub use list::projects as projects_get;
