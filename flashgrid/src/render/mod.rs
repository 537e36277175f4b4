pub mod grid;
pub mod terminal;
