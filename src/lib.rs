// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod config;
pub mod export;
pub mod grid;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod stimulus;
pub mod ui;
