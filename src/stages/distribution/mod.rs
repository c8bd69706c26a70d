//! Distribution stage
//!
//! Publishes the persisted dataset to a remote mirror.

pub mod git;
pub mod publisher;
pub mod transport;

pub use git::GitCommandTransport;
pub use publisher::{PublishOutcome, PublishState, SyncPublisher};
pub use transport::{Credential, RemoteTransport};
