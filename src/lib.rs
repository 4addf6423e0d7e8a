pub mod core;
pub mod models;
pub mod utils;

// Re-export commonly used types and traits
pub use crate::core::{ContentSource, GraphqlClient, RestClient, Transport, WordPress, WpError};
pub use crate::models::{Config, Page, Post, PostList, SiteInfo, Total};
