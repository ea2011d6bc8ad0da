pub mod panels;
pub mod preview;
