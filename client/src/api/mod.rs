//! Typed wrappers over the admin endpoints.

mod auth;
mod permissions;
mod users;

pub use auth::AuthApi;
pub use permissions::PermissionsApi;
pub use users::UsersApi;
