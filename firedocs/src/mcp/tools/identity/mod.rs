//! Firebase Authentication user tools
//!
//! Each tool lives in its own submodule with its implementation and a
//! `description.md` shown to MCP clients. Requests are defined in
//! `crate::mcp::types` and the backend calls in `crate::mcp::tool_handlers`.
//!
//! ## Tools
//!
//! - **create_user**: new account from email and password
//! - **get_user**: account details by uid
//! - **update_user**: change email, display name or password
//! - **delete_user**: remove an account
//! - **list_users**: uids of every account
//! - **generate_email_verification_link** / **generate_password_reset_link**:
//!   out-of-band action links, returned rather than emailed

pub mod create;
pub mod delete;
pub mod email_verification_link;
pub mod get;
pub mod list;
pub mod password_reset_link;
pub mod update;

use crate::mcp::tool_registry::ToolRegistry;

/// Register all user account tools with the registry
pub fn register_identity_tools(registry: &mut ToolRegistry) {
    registry.register(create::CreateUserTool::new());
    registry.register(get::GetUserTool::new());
    registry.register(update::UpdateUserTool::new());
    registry.register(delete::DeleteUserTool::new());
    registry.register(list::ListUsersTool::new());
    registry.register(email_verification_link::EmailVerificationLinkTool::new());
    registry.register(password_reset_link::PasswordResetLinkTool::new());
}
