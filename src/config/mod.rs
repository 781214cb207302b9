pub mod models;

pub use models::{ClientConfig, API_KEY_HEADER};
