pub mod client;
pub mod error;
pub mod types;

pub use client::{PNG_DATA_URI_PREFIX, TableauClient, dashboards_from_search_body, png_data_uri};
pub use error::{GENERIC_UPSTREAM_MESSAGE, TableauError, extract_error_message};
pub use types::*;
