//! The admin area: a user listing and user deletion.
//!
//! There is no role system. The admin is whoever owns the hardcoded admin
//! email address, see [crate::user::ADMIN_EMAIL].

mod delete_endpoint;
mod guard;
mod users_page;

pub use delete_endpoint::{DeleteAdminUserState, delete_user_endpoint};
pub use guard::{AdminGuardState, admin_guard};
pub use users_page::{AdminUsersPageState, get_admin_users_page};
