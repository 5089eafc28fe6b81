//! Requests from views to the host window (title and similar chrome).
//!
//! Views and effects record requests here; the platform runner takes them
//! after each frame and applies them to its window.

use std::cell::RefCell;

thread_local! {
    static WINDOW_TITLE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Requests a new window title. The last request before the runner takes it
/// wins.
pub fn set_window_title(title: impl Into<String>) {
    let title = title.into();
    log::trace!("window title requested: {title}");
    WINDOW_TITLE.set(Some(title));
}

pub fn take_window_title() -> Option<String> {
    WINDOW_TITLE.take()
}

/// Host side of the chrome requests.
pub trait WindowChrome {
    fn set_title(&mut self, title: &str);
    fn title(&self) -> &str;
}
