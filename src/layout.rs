pub mod canvas;
pub mod text;
