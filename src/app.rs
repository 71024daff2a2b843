use dioxus::prelude::*;

use crate::course::{CoursePage, StudentPage};

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[route("/")]
    CoursePage {},
    #[route("/student")]
    StudentPage {},
}

#[component]
pub fn App() -> Element {
    rsx! {
        Router::<Route> {}
    }
}
