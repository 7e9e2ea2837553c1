//! Role gate
//!
//! The authorization decision is a pure function so it can be tested away
//! from the database and the HTTP stack. Fail closed: an unknown caller
//! (no application user record) or a role outside the permitted set is
//! always denied.

use std::collections::HashSet;

/// Decide whether a caller may pass a role-gated route.
///
/// `caller_role` is `None` when no application user record exists for the
/// authenticated subject.
pub fn role_allowed(caller_role: Option<i32>, permitted: &HashSet<i32>) -> bool {
    match caller_role {
        Some(role) => permitted.contains(&role),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permitted(roles: &[i32]) -> HashSet<i32> {
        roles.iter().copied().collect()
    }

    #[test]
    fn allows_role_in_permitted_set() {
        assert!(role_allowed(Some(2), &permitted(&[1, 2, 3])));
    }

    #[test]
    fn denies_role_outside_permitted_set() {
        assert!(!role_allowed(Some(9), &permitted(&[1, 2, 3])));
    }

    #[test]
    fn denies_caller_without_user_record() {
        assert!(!role_allowed(None, &permitted(&[1, 2, 3])));
    }

    #[test]
    fn empty_permitted_set_denies_everyone() {
        assert!(!role_allowed(Some(1), &permitted(&[])));
    }
}
