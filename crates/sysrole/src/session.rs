//! The editing session: one operator editing one role.
//!
//! The session owns the pending permission edits and membership edits, keeps
//! the navigation block in sync with whether anything is unsaved, and commits
//! through [`CommitPlan`].

use std::sync::Arc;

use sysrole_core::{
    aggregate_access, compile, save_needed, AccessLevel, Catalog, CoreError, Direction,
    MembershipEdits, PendingEdits, Role, SectionAccess, Sentinels, SystemSection, User,
};
use sysrole_store::{RoleStore, UserStore};
use tracing::{debug, info, warn};

use crate::commit::{CommitOutcome, CommitPlan, CommitReport, CommitState};
use crate::error::{Result, SessionError};
use crate::navigation::NavigationBlocker;

/// Configuration for editing sessions.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Admin role and super permission names.
    pub sentinels: Sentinels,
    /// Console sections and ancillary table.
    pub catalog: Catalog,
}

impl EngineConfig {
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_admin_role(mut self, name: impl Into<String>) -> Self {
        self.sentinels.admin_role = name.into();
        self
    }

    pub fn with_super_permission(mut self, permission: impl Into<String>) -> Self {
        self.sentinels.super_permission = permission.into();
        self
    }

    /// Default sentinels with a catalog decoded from JSON.
    pub fn from_catalog_json(json: &str) -> Result<Self> {
        Ok(Self::default().with_catalog(Catalog::from_json(json)?))
    }
}

/// An editing session over a single role.
///
/// Edits are mutated through `&mut self`, so nothing can change them while a
/// [`submit`](Self::submit) is awaiting the store.
pub struct EditSession<S, N>
where
    S: RoleStore + UserStore,
    N: NavigationBlocker,
{
    config: EngineConfig,
    store: Arc<S>,
    blocker: N,
    /// Last committed state of the role.
    role: Role,
    edits: PendingEdits,
    membership: MembershipEdits,
    state: CommitState,
    blocked: bool,
}

impl<S, N> EditSession<S, N>
where
    S: RoleStore + UserStore + 'static,
    N: NavigationBlocker,
{
    /// Start a session on an already loaded role.
    pub fn new(config: EngineConfig, store: Arc<S>, blocker: N, role: Role) -> Self {
        blocker.set_blocked(false);
        Self {
            config,
            store,
            blocker,
            role,
            edits: PendingEdits::new(),
            membership: MembershipEdits::new(),
            state: CommitState::Idle,
            blocked: false,
        }
    }

    /// Load `role_name` from the store and start a session on it.
    pub async fn load(
        config: EngineConfig,
        store: Arc<S>,
        blocker: N,
        role_name: &str,
    ) -> Result<Self> {
        let role = store.fetch_role(role_name).await?;
        debug!(role = %role.name, permissions = role.permissions.len(), "role loaded");
        Ok(Self::new(config, store, blocker, role))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn edits(&self) -> &PendingEdits {
        &self.edits
    }

    pub fn membership(&self) -> &MembershipEdits {
        &self.membership
    }

    pub fn state(&self) -> &CommitState {
        &self.state
    }

    /// The admin role's permissions are display-only.
    pub fn is_read_only(&self) -> bool {
        self.config.sentinels.is_admin_role(&self.role.name)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Displayed access for a section.
    pub fn aggregate_access(&self, section: &SystemSection) -> SectionAccess {
        aggregate_access(
            section,
            &self.role.permissions,
            &self.edits,
            &self.config.sentinels,
        )
    }

    /// Displayed access for a section looked up by name in the catalog.
    pub fn section_access(&self, name: &str) -> Result<SectionAccess> {
        let section = self
            .config
            .catalog
            .find(name)
            .ok_or_else(|| CoreError::UnknownSection(name.to_string()))?;
        Ok(self.aggregate_access(section))
    }

    /// Set `level` on every named section.
    ///
    /// Sections with subsections fan out to their enabled subsections. All
    /// names are resolved before anything is recorded, so an unknown name
    /// leaves the edits untouched.
    pub fn apply_pending_edit(&mut self, names: &[&str], level: AccessLevel) -> Result<()> {
        if self.is_read_only() {
            return Err(CoreError::ProtectedRole(self.role.name.clone()).into());
        }

        let mut targets = Vec::new();
        for name in names {
            targets.extend(self.config.catalog.edit_targets(name)?);
        }

        debug!(role = %self.role.name, ?level, sections = ?targets, "applying section edit");
        for target in targets {
            self.edits.set(target, level);
        }

        self.refresh_navigation_block();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Membership edits
    // ─────────────────────────────────────────────────────────────────────────

    pub fn toggle_user_membership(&mut self, user: User, direction: Direction) {
        debug!(role = %self.role.name, user_id = %user.id, ?direction, "membership toggle");
        self.membership.toggle(user, direction);
        self.refresh_navigation_block();
    }

    pub fn add_users(&mut self, users: impl IntoIterator<Item = User>) {
        self.membership.add_users(users);
        self.refresh_navigation_block();
    }

    pub fn remove_user(&mut self, user: User) {
        self.toggle_user_membership(user, Direction::Remove);
    }

    /// Users holding the role once pending membership edits commit.
    pub async fn roster(&self) -> Result<Vec<User>> {
        let committed = self.store.users_in_role(&self.role.name).await?;
        Ok(self.membership.apply_to_roster(&committed))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_save_needed(&self) -> bool {
        save_needed(
            &self.role,
            &self.edits,
            &self.membership,
            &self.config.catalog,
            &self.config.sentinels,
        )
    }

    /// Discard every pending edit.
    pub fn cancel(&mut self) {
        self.edits.clear();
        self.membership.clear();
        self.state = CommitState::Idle;
        self.refresh_navigation_block();
    }

    /// Build the plan a submit would execute.
    pub fn plan(&self) -> CommitPlan {
        let replacement = if self.edits.is_empty() || self.is_read_only() {
            None
        } else {
            let permissions = compile(
                &self.role,
                &self.edits,
                &self.config.catalog,
                &self.config.sentinels,
            );
            Some(self.role.with_permissions(permissions))
        };

        CommitPlan::new(
            &self.role.name,
            replacement,
            self.membership.to_remove(),
            self.membership.to_add(),
        )
    }

    /// Commit pending edits to the store.
    ///
    /// On success every edit is cleared and navigation is unblocked. On
    /// failure only what became durable is cleared; the rest stays for retry
    /// and navigation stays blocked.
    ///
    /// Dropping the returned future discards the outcome, but store requests
    /// already issued run to completion. The session is then left in `Saving`
    /// with its edits intact and may be submitted again.
    pub async fn submit(&mut self) -> Result<CommitReport> {
        if !self.is_save_needed() {
            return Err(SessionError::NothingToSave);
        }

        let plan = self.plan();
        info!(
            role = %self.role.name,
            permissions = plan.replacement().is_some(),
            removals = plan.removals().len(),
            additions = plan.additions().len(),
            "submitting role edit"
        );

        self.state = CommitState::Saving;
        let outcome = plan.execute(&self.store).await;
        self.settle(outcome)
    }

    /// Fold a commit outcome back into the session.
    fn settle(&mut self, outcome: CommitOutcome) -> Result<CommitReport> {
        if let Some(updated) = &outcome.updated_role {
            self.role = updated.clone();
            self.edits.clear();
        }
        for id in &outcome.removed {
            self.membership.settle_remove(id);
        }
        for id in &outcome.added {
            self.membership.settle_add(id);
        }

        match outcome.error {
            None => {
                let report = outcome.report();
                self.edits.clear();
                self.membership.clear();
                self.state = CommitState::Success;
                self.set_blocked(false);
                info!(role = %self.role.name, ?report, "role edit committed");
                Ok(report)
            }
            Some(error) => {
                warn!(
                    role = %self.role.name,
                    stage = %error.stage,
                    failed_requests = error.failed_requests,
                    error = %error,
                    "role edit partially failed"
                );
                self.state = CommitState::PartialFailure(error.clone());
                self.set_blocked(true);
                Err(error.into())
            }
        }
    }

    fn refresh_navigation_block(&mut self) {
        let needed = self.is_save_needed();
        self.set_blocked(needed);
    }

    fn set_blocked(&mut self, blocked: bool) {
        if self.blocked != blocked {
            debug!(role = %self.role.name, blocked, "navigation block changed");
        }
        self.blocked = blocked;
        self.blocker.set_blocked(blocked);
    }
}
