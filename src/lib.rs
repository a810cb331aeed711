// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod board;
pub mod celebration;
pub mod clock;
pub mod config;
pub mod corpus;
pub mod game;
pub mod runtime;
pub mod selection;
