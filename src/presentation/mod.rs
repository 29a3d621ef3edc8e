// Presentation layer - HTTP status surface
pub mod app_state;
pub mod handlers;
