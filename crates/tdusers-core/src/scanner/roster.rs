//! Roster fetch and active/inactive split.

use std::collections::HashSet;

use crate::error::ApiError;
use crate::model::{User, UserList};
use crate::transport::Transport;

pub const ROSTER_PATH: &str = "v3/user/list";

/// Which side of the split to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Users who ran a job within the window.
    #[default]
    Active,
    /// Everyone else.
    Inactive,
}

impl ScanMode {
    pub fn from_inverse(inverse: bool) -> Self {
        if inverse {
            ScanMode::Inactive
        } else {
            ScanMode::Active
        }
    }
}

/// Single, unpaginated roster request. Blocks the current thread.
pub fn fetch_roster(transport: &dyn Transport) -> Result<Vec<User>, ApiError> {
    let list: UserList = transport.get(ROSTER_PATH, &[])?.json()?;
    Ok(list.users)
}

/// Roster entries whose name is in `active` (or not, for `Inactive`), in roster order.
///
/// Entries without a name are never active.
pub fn filter_roster(roster: &[User], active: &HashSet<String>, mode: ScanMode) -> Vec<User> {
    roster
        .iter()
        .filter(|user| {
            let is_active = user.name().is_some_and(|name| active.contains(name));
            match mode {
                ScanMode::Active => is_active,
                ScanMode::Inactive => !is_active,
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<User> {
        vec![
            User::named("alice"),
            User::named("bob"),
            User::default(),
            User::named("carol"),
        ]
    }

    fn active() -> HashSet<String> {
        ["carol", "alice", "zed"].into_iter().map(String::from).collect()
    }

    fn names(users: &[User]) -> Vec<Option<&str>> {
        users.iter().map(User::name).collect()
    }

    #[test]
    fn active_mode_keeps_roster_order() {
        let out = filter_roster(&roster(), &active(), ScanMode::Active);
        assert_eq!(names(&out), [Some("alice"), Some("carol")]);
    }

    #[test]
    fn inverse_is_roster_minus_active() {
        let out = filter_roster(&roster(), &active(), ScanMode::from_inverse(true));
        assert_eq!(names(&out), [Some("bob"), None]);
    }

    #[test]
    fn split_is_a_partition() {
        let roster = roster();
        let a = filter_roster(&roster, &active(), ScanMode::Active);
        let i = filter_roster(&roster, &active(), ScanMode::Inactive);
        assert_eq!(a.len() + i.len(), roster.len());
        for user in &roster {
            assert!(a.contains(user) != i.contains(user));
        }
    }

    #[test]
    fn empty_active_set() {
        let roster = roster();
        assert!(filter_roster(&roster, &HashSet::new(), ScanMode::Active).is_empty());
        assert_eq!(
            filter_roster(&roster, &HashSet::new(), ScanMode::Inactive),
            roster
        );
    }
}
