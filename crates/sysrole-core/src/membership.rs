//! Pending membership edits for a role.
//!
//! Two disjoint maps track users to add and users to remove. Toggling a user
//! that is already pending in the opposite direction cancels that pending
//! change instead of recording a second one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{User, UserId};

/// Which way a membership toggle goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Add,
    Remove,
}

/// Users pending addition to and removal from a role.
///
/// Invariant: no user id is in both maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipEdits {
    to_add: BTreeMap<UserId, User>,
    to_remove: BTreeMap<UserId, User>,
}

impl MembershipEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue users for addition, cancelling any pending removal of them.
    pub fn add_users<I>(&mut self, users: I)
    where
        I: IntoIterator<Item = User>,
    {
        for user in users {
            if self.to_remove.remove(&user.id).is_none() {
                self.to_add.insert(user.id.clone(), user);
            }
        }
        debug_assert!(self.is_disjoint());
    }

    /// Queue a user for removal, cancelling a pending addition of them.
    pub fn remove_user(&mut self, user: User) {
        if self.to_add.remove(&user.id).is_none() {
            self.to_remove.insert(user.id.clone(), user);
        }
        debug_assert!(self.is_disjoint());
    }

    pub fn toggle(&mut self, user: User, direction: Direction) {
        match direction {
            Direction::Add => self.add_users([user]),
            Direction::Remove => self.remove_user(user),
        }
    }

    pub fn to_add(&self) -> impl Iterator<Item = &User> {
        self.to_add.values()
    }

    pub fn to_remove(&self) -> impl Iterator<Item = &User> {
        self.to_remove.values()
    }

    pub fn add_count(&self) -> usize {
        self.to_add.len()
    }

    pub fn remove_count(&self) -> usize {
        self.to_remove.len()
    }

    pub fn is_pending_add(&self, id: &UserId) -> bool {
        self.to_add.contains_key(id)
    }

    pub fn is_pending_remove(&self, id: &UserId) -> bool {
        self.to_remove.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn clear(&mut self) {
        self.to_add.clear();
        self.to_remove.clear();
    }

    /// Drop a user from the pending additions once their update is durable.
    pub fn settle_add(&mut self, id: &UserId) {
        self.to_add.remove(id);
    }

    /// Drop a user from the pending removals once their update is durable.
    pub fn settle_remove(&mut self, id: &UserId) {
        self.to_remove.remove(id);
    }

    /// The roster as it will look after commit.
    ///
    /// Committed users minus pending removals, then pending additions not
    /// already present.
    pub fn apply_to_roster(&self, committed: &[User]) -> Vec<User> {
        let mut roster: Vec<User> = committed
            .iter()
            .filter(|u| !self.to_remove.contains_key(&u.id))
            .cloned()
            .collect();

        for user in self.to_add.values() {
            if !roster.iter().any(|u| u.id == user.id) {
                roster.push(user.clone());
            }
        }

        roster
    }

    fn is_disjoint(&self) -> bool {
        self.to_add.keys().all(|id| !self.to_remove.contains_key(id))
    }
}
