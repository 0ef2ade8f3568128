/*
 * Responsibility
 *  - Bundle core and types
 *  - Decide what handlers get to see
 */
mod core;
mod types;

pub use types::*;
