pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{absolutize, build_search_url, canonicalize, extract_domain, is_valid_url};
