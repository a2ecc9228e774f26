pub mod admin;
pub mod dump;
