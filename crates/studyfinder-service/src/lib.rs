//! StudyFinder Services — the authorization-gated operations over the
//! repository traits: user directory, group lifecycle, membership, and
//! search/listing.
//!
//! Services are generic over the `studyfinder-core` repository traits
//! and carry no database dependency.

pub mod config;
pub mod directory;
pub mod feed;
pub mod groups;
pub mod membership;
pub mod search;
pub mod timefmt;

pub use config::ServiceConfig;
pub use directory::DirectoryService;
pub use feed::Feed;
pub use groups::{CreateGroupInput, GroupService};
pub use membership::MembershipService;
pub use search::SearchService;
