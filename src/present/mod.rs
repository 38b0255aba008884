//! The presenter: background pipeline, dialog box and option menu over a virtual clock.

mod background;
pub mod config;
pub mod dialog;
pub mod menu;
pub mod presenter;
