pub mod config;
pub mod content;
pub mod events;
pub mod keymap;
pub mod tasks {
    pub mod catalog;
    pub mod controller;
    pub mod input;
}
