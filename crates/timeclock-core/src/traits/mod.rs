//! Collaborator traits the request client calls out to.

mod navigator;
mod notifier;
mod scope;

pub use navigator::Navigator;
pub use notifier::PermissionNotifier;
pub use scope::KeyValueScope;
