pub mod constants;
pub mod html_utils;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use html_utils::{collapse_whitespace, visible_text};
pub use url_utils::{absolute_url, is_valid_url, normalize_path};
