pub mod app;
pub mod block_tree;
pub mod course;
pub mod editor;
