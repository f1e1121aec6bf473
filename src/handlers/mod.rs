// handlers/mod.rs - Two-tier handler layout
//
// Public (no token) → Protected (token validated by the OAuth gateway)
pub mod protected;
pub mod public;
