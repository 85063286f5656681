pub mod batch;
pub mod client;
pub mod error;
pub mod model;
pub mod traverse;

pub use batch::{BatchConfig, fetch_in_batches, paced};
pub use client::CmsClient;
pub use error::ClientError;
pub use model::{ContentNode, ContentTypeInfo, LanguageBranch, ReferencedContent};
pub use traverse::Traverser;
