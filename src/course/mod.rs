//! Host pages: the authoring view that owns the course tree, and the
//! read-only student route.

mod field_editor;
pub mod page;

pub use page::{CoursePage, StudentPage};
