//! Dioxus shell around the block tree engine.

mod component;
pub mod course_view;
pub mod dom;
pub mod gestures;

pub use component::BlockTreeEditor;
pub use course_view::CourseView;
pub use gestures::{EditorConfig, InputMode};
