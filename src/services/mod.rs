//! Service clients built on the shared core.
//!
//! - [`conversations`]: Conversation analysis runtime (language service)
//! - [`cosmos_db`]: Cosmos DB restorable accounts
//! - [`machine_learning`]: Machine learning online deployments

pub mod conversations;
pub mod cosmos_db;
pub mod machine_learning;
