pub mod error;
pub mod graphql;
pub mod mapping;
pub mod queries;
pub mod rest;
pub mod server;
pub mod service;
pub mod source;

pub use error::{Result, WpError};
pub use graphql::GraphqlClient;
pub use rest::RestClient;
pub use server::Server;
pub use service::WordPress;
pub use source::{ContentSource, Transport};
