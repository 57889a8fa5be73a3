//! # starwars-graphql
//!
//! The canonical Star Wars GraphQL schema resolved against a document store.
//!
//! ## Features
//!
//! - **Character interface** - `Human` and `Droid` variants dispatched on a stored discriminant
//! - **Document store** - id-addressed documents behind the [`DocumentStore`] trait
//! - **DataLoader** - request-scoped batching for friend fan-out
//! - **Query endpoint** - `{ query, operationName, variables }` over HTTP, plus GraphiQL
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_graphql::Request;
//! use starwars_graphql::{execute, seed, MemoryStore, SharedStore};
//!
//! # async fn example() -> starwars_graphql::Result<()> {
//! let store: SharedStore = Arc::new(MemoryStore::new());
//! seed::seed_characters(store.as_ref()).await?;
//!
//! let response = execute(&store, Request::new("{ hero { name } }")).await;
//! assert!(response.errors.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataloaders;
pub mod handler;
pub mod id;
pub mod model;
pub mod schema;
pub mod seed;
pub mod store;
pub mod types;

pub use dataloaders::{BatchLoader, DataLoader, DocumentLoader};
pub use handler::{create_router, execute, graphql_handler, QueryResponse};
pub use id::DocumentId;
pub use model::{Character, Droid, Human, Variant};
pub use schema::{schema, QueryRoot, StarWarsSchema};
pub use store::{Document, DocumentStore, MemoryStore, SharedStore};
pub use types::Episode;

use thiserror::Error;

/// Errors raised while loading or resolving characters
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Unknown character type: {0}")]
    UnknownVariant(String),

    #[error("Malformed document {id}: {source}")]
    MalformedDocument {
        id: DocumentId,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Friend {friend} of {owner} does not exist")]
    DanglingFriend { owner: DocumentId, friend: DocumentId },

    #[error("More than one {table} matched {field} = {value}")]
    NotUnique {
        table: Variant,
        field: String,
        value: serde_json::Value,
    },

    #[error("secretBackstory is secret.")]
    SecretBackstory,
}

/// Result type for store and resolver operations
pub type Result<T> = std::result::Result<T, Error>;
