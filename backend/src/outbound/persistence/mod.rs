//! Storage adapters implementing the [`UserRepository`] port.
//!
//! Two interchangeable backends exist:
//!
//! - [`JsonFileUserRepository`] keeps the whole collection in one JSON
//!   file, rewritten on every mutation.
//! - [`DynamoDbUserRepository`] stores each user as an independent item in
//!   a DynamoDB table keyed on the user `id`.
//!
//! Adapters are thin: they translate between stored representations and
//! domain types, and map backend failures to
//! [`UserPersistenceError`](crate::domain::ports::UserPersistenceError).
//! No business logic lives here.
//!
//! [`UserRepository`]: crate::domain::ports::UserRepository

mod dynamodb;
mod json_file;

pub use dynamodb::DynamoDbUserRepository;
pub use json_file::JsonFileUserRepository;
