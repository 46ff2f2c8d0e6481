/// Remote collaborators
///
/// - `graphql.rs` - GraphQL-over-HTTP client
/// - `operations.rs` - GetAvatars / UpdateProfileImage / Me behind `ProfileBackend`
/// - `delivery.rs` - image loading, resizing and on-disk cache

pub mod delivery;
pub mod graphql;
pub mod operations;

pub use delivery::ImageDelivery;
pub use graphql::GraphQlClient;
pub use operations::{Ack, ProfileBackend};
