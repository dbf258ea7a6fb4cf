//! User roster backend: a REST CRUD surface over interchangeable storage
//! adapters (flat JSON file or DynamoDB), plus the static web client.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::request_span::RequestSpan;
