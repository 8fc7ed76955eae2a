pub mod comments;
pub mod guard;
pub mod hierarchy;
pub mod identity;

pub use comments::CommentEngine;
pub use guard::MembershipGuard;
pub use hierarchy::HierarchyStore;
pub use identity::IdentityDirectory;
