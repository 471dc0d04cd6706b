mod navigator;
mod sessions;

pub use navigator::{Breadcrumb, ChapterNavigator, NavigatorError, ReaderView};
pub use sessions::ReaderSessions;
