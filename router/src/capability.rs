//! Which pages each role may open.

use ballot_types::{Portal, Role, User};

use crate::error::RouteError;
use crate::page::{PageKey, Screen};

const ELECTION_ADMIN: &[PageKey] = &[
    PageKey::AddCandidate,
    PageKey::NewElection,
    PageKey::Results,
];
const ELECTION_VOTER: &[PageKey] = &[
    PageKey::CastVote,
    PageKey::Results,
    PageKey::PendingElections,
];
const DASHBOARD_ONLY: &[PageKey] = &[PageKey::Dashboard];

/// Pages open to `role` on `portal`, default page first. Roles foreign to
/// the portal get nothing.
pub fn allowed_pages(portal: Portal, role: Role) -> &'static [PageKey] {
    match (portal, role) {
        (Portal::Election, Role::Admin) => ELECTION_ADMIN,
        (Portal::Election, Role::Voter) => ELECTION_VOTER,
        (Portal::Insurance, role) if portal.allows(role) => DASHBOARD_ONLY,
        _ => &[],
    }
}

pub fn is_allowed(portal: Portal, role: Role, page: PageKey) -> bool {
    allowed_pages(portal, role).contains(&page)
}

/// The page shown right after login.
pub fn default_page(portal: Portal, role: Role) -> Option<PageKey> {
    allowed_pages(portal, role).first().copied()
}

/// Map session and requested page to a screen.
///
/// No user means the login screen whatever was requested. No page means
/// the role's default.
pub fn resolve(
    portal: Portal,
    user: Option<&User>,
    page: Option<PageKey>,
) -> Result<Screen, RouteError> {
    let Some(user) = user else {
        return Ok(Screen::Login);
    };
    let forbidden = |page| RouteError::Forbidden {
        role: user.role,
        page,
    };
    let page = match page {
        Some(page) => page,
        None => default_page(portal, user.role).ok_or_else(|| forbidden(PageKey::Dashboard))?,
    };
    if !is_allowed(portal, user.role, page) {
        return Err(forbidden(page));
    }
    Ok(Screen::for_page(page, user.role))
}
