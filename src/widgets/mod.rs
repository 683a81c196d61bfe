pub mod controls;
pub mod debug;
pub mod filter_panel;
pub mod grid_table;
pub mod text_input;
