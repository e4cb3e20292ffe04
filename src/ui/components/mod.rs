pub mod lock_grid;
pub mod status_bar;
