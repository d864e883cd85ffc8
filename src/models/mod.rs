pub mod entry;
pub mod size;
