/*
 * Database module aggregator providing centralized access to connection management and maintenance utilities.
 * I'm organizing connection pooling, transactions, and schema maintenance into a cohesive interface for the rest of the application.
 */

pub mod connection;

// Re-export commonly used database types and functions
pub use connection::{create_pool, create_pool_with_config, with_transaction, DatabasePool};
