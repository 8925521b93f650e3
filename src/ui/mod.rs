// ui/mod.rs

mod constants;
mod draw;
mod game;
mod menu;
mod persona_select;
mod result;
mod transcripts;
pub mod spinner;
pub mod textarea;

pub use draw::{MIN_HEIGHT, MIN_WIDTH, center_rect, draw};
