// Template context structures for Askama templates, one module per role view.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::take_flash;
use crate::views::Role;

/// Header and notification context shared by both portals.
/// Templates access these as `ctx.username`, `ctx.notice`, etc.
pub struct PageContext {
    pub is_admin: bool,
    pub username: Option<String>,
    /// Blocking notification, shown as an open modal dialog.
    pub notice: Option<String>,
    pub csrf_token: String,
    pub portal_label: &'static str,
    pub subtitle: &'static str,
    pub logout_action: &'static str,
    pub show_logout: bool,
}

impl PageContext {
    pub fn new(role: Role, username: Option<String>, notice: Option<String>, csrf_token: String) -> Self {
        let (portal_label, subtitle, logout_action) = match role {
            Role::Admin => ("ADMIN_PORTAL", "ADMIN PORTAL", "/admin/logout"),
            Role::Student => ("STUDENT_PORTAL", "SUBMIT YOUR VOTES", "/logout"),
        };
        let show_logout = role.is_admin() || username.is_some();
        Self {
            is_admin: role.is_admin(),
            username,
            notice,
            csrf_token,
            portal_label,
            subtitle,
            logout_action,
            show_logout,
        }
    }

    /// Context for a page request: consumes the pending flash notice.
    pub fn build(session: &Session, role: Role, username: Option<String>) -> Self {
        let notice = take_flash(session);
        let csrf_token = csrf::get_or_create_token(session);
        Self::new(role, username, notice, csrf_token)
    }

    /// Replace the notice, for forms re-rendered in place.
    pub fn with_notice(mut self, notice: String) -> Self {
        self.notice = Some(notice);
        self
    }
}

mod admin;
mod student;

pub use self::admin::{AdminCard, AdminTemplate, ConfirmDialog, DetailPanel, DraftForm, OptionRow, ResponseRow, ResultBar, VoteRow};
pub use self::student::{StudentCard, StudentOption, StudentTemplate};
