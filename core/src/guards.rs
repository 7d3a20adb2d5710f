//! Navigation guards evaluated before a route change commits.

use crate::session::Session;

/// Public entry page; also where logout lands.
pub const LANDING_ROUTE: &str = "/";
/// Default page for authenticated users.
pub const HOME_ROUTE: &str = "/inicio";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Any authenticated user may pass. The landing route is always reachable.
pub fn require_auth(session: &Session, target: &str) -> GuardDecision {
    if session.is_authenticated() || target == LANDING_ROUTE {
        GuardDecision::Proceed
    } else {
        GuardDecision::Redirect(LANDING_ROUTE)
    }
}

/// Only admins may pass; everyone else goes home.
pub fn require_admin(session: &Session) -> GuardDecision {
    if session.is_admin() {
        GuardDecision::Proceed
    } else {
        GuardDecision::Redirect(HOME_ROUTE)
    }
}
