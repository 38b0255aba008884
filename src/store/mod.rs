//! Persisted record of menu and story choices.

pub mod choice;
