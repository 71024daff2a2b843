use dioxus::logger::tracing::Level;

use course_editor::app::App;

fn main() {
    if let Err(e) = dioxus::logger::init(Level::INFO) {
        eprintln!("logger already initialized: {e}");
    }
    dioxus::launch(App);
}
