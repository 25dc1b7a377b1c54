//! Type-safe command argument modules.
//!
//! Each struct here implements `CommandArgs` for one external program and maps
//! Rust fields to the exact flags (and stdin) that program expects.

pub mod account;
pub mod permissions;
