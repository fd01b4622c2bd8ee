//! Staged commit of a role edit.
//!
//! A commit runs up to three stages in a fixed order:
//!
//! 1. **Permissions**: replace the role's permission set.
//! 2. **Removals**: rewrite the role string of every user being removed.
//! 3. **Additions**: rewrite the role string of every user being added.
//!
//! Stage 2 runs even if stage 1 failed. Stage 3 runs only if neither earlier
//! stage failed. Users within a membership stage are updated concurrently and
//! awaited together.
//!
//! Every store request runs as its own task. Dropping a commit part way
//! abandons the results, but requests already issued still settle.
//!
//! ```text
//!   Idle ──submit──▶ Saving ──▶ Success
//!                          └──▶ PartialFailure
//! ```

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use sysrole_core::{Role, User, UserId};
use sysrole_store::{RoleStore, StoreError, UserStore};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::error::{AggregatedError, CommitError};

/// A commit stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Permissions,
    Removals,
    Additions,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Permissions => f.write_str("permissions"),
            Stage::Removals => f.write_str("removals"),
            Stage::Additions => f.write_str("additions"),
        }
    }
}

/// Where a session is in the commit lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommitState {
    #[default]
    Idle,
    Saving,
    Success,
    PartialFailure(AggregatedError),
}

/// Summary of a successful commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub permissions_updated: bool,
    pub users_removed: usize,
    pub users_added: usize,
}

/// Everything a commit will write, computed before any request is issued.
#[derive(Debug, Clone)]
pub struct CommitPlan {
    role_name: String,

    /// Replacement role, `None` when the permission stage is skipped.
    replacement: Option<Role>,

    /// `(user, new role string)` for each removal.
    removals: Vec<(UserId, String)>,

    /// `(user, new role string)` for each addition.
    additions: Vec<(UserId, String)>,
}

impl CommitPlan {
    pub fn new<'a>(
        role_name: &str,
        replacement: Option<Role>,
        to_remove: impl IntoIterator<Item = &'a User>,
        to_add: impl IntoIterator<Item = &'a User>,
    ) -> Self {
        Self {
            role_name: role_name.to_string(),
            replacement,
            removals: to_remove
                .into_iter()
                .map(|u| (u.id.clone(), u.with_role_removed(role_name)))
                .collect(),
            additions: to_add
                .into_iter()
                .map(|u| (u.id.clone(), u.with_role_added(role_name)))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.replacement.is_none() && self.removals.is_empty() && self.additions.is_empty()
    }

    pub fn replacement(&self) -> Option<&Role> {
        self.replacement.as_ref()
    }

    pub fn removals(&self) -> &[(UserId, String)] {
        &self.removals
    }

    pub fn additions(&self) -> &[(UserId, String)] {
        &self.additions
    }

    /// Run every stage against `store`.
    ///
    /// Never returns early; the outcome records what became durable.
    pub async fn execute<S>(&self, store: &Arc<S>) -> CommitOutcome
    where
        S: RoleStore + UserStore + 'static,
    {
        let mut outcome = CommitOutcome::default();
        let mut slot = ErrorSlot::default();

        match &self.replacement {
            Some(role) => match permission_stage(store, role).await {
                Ok(updated) => outcome.updated_role = Some(updated),
                Err(error) => slot.capture(Stage::Permissions, error, 1),
            },
            None => debug!(role = %self.role_name, "permission stage skipped"),
        }

        if self.removals.is_empty() {
            debug!(role = %self.role_name, "removal stage skipped");
        } else {
            let fan = membership_stage(store, Stage::Removals, &self.removals).await;
            outcome.removed = fan.succeeded;
            slot.capture_fan_out(Stage::Removals, fan.failures);
        }

        if self.additions.is_empty() {
            debug!(role = %self.role_name, "addition stage skipped");
        } else if let Some(earlier) = slot.stage() {
            info!(
                role = %self.role_name,
                failed_stage = %earlier,
                pending = self.additions.len(),
                "addition stage not attempted after earlier failure"
            );
            outcome.additions_skipped = true;
        } else {
            let fan = membership_stage(store, Stage::Additions, &self.additions).await;
            outcome.added = fan.succeeded;
            slot.capture_fan_out(Stage::Additions, fan.failures);
        }

        outcome.error = slot.into_error();
        outcome
    }
}

/// What a commit made durable, and the error it reports if any.
#[derive(Debug, Clone, Default)]
pub struct CommitOutcome {
    /// Role as stored after a successful permission stage.
    pub updated_role: Option<Role>,

    /// Users whose removal was applied.
    pub removed: Vec<UserId>,

    /// Users whose addition was applied.
    pub added: Vec<UserId>,

    /// Additions were pending but not attempted.
    pub additions_skipped: bool,

    pub error: Option<AggregatedError>,
}

impl CommitOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn report(&self) -> CommitReport {
        CommitReport {
            permissions_updated: self.updated_role.is_some(),
            users_removed: self.removed.len(),
            users_added: self.added.len(),
        }
    }
}

/// Holds the error of the latest failing stage.
#[derive(Debug, Default)]
struct ErrorSlot {
    captured: Option<AggregatedError>,
}

impl ErrorSlot {
    fn capture(&mut self, stage: Stage, error: CommitError, failed_requests: usize) {
        if let Some(previous) = &self.captured {
            debug!(
                previous_stage = %previous.stage,
                %stage,
                "later stage error replaces earlier one"
            );
        }
        self.captured = Some(AggregatedError {
            stage,
            error,
            failed_requests,
        });
    }

    fn capture_fan_out(&mut self, stage: Stage, failures: Vec<CommitError>) {
        let count = failures.len();
        if let Some(first) = failures.into_iter().next() {
            self.capture(stage, first, count);
        }
    }

    fn stage(&self) -> Option<Stage> {
        self.captured.as_ref().map(|e| e.stage)
    }

    fn into_error(self) -> Option<AggregatedError> {
        self.captured
    }
}

struct FanOut {
    succeeded: Vec<UserId>,
    failures: Vec<CommitError>,
}

/// A request task that panicked or was aborted never reached a verdict.
fn task_failed<T>(error: JoinError) -> Result<T, StoreError> {
    Err(StoreError::Unavailable(format!("request task failed: {error}")))
}

async fn permission_stage<S>(store: &Arc<S>, role: &Role) -> Result<Role, CommitError>
where
    S: RoleStore + 'static,
{
    info!(
        role = %role.name,
        permissions = role.permissions.len(),
        "replacing role permissions"
    );

    let request = {
        let store = Arc::clone(store);
        let role = role.clone();
        tokio::spawn(async move { store.replace_role_permissions(&role).await })
    };

    request
        .await
        .unwrap_or_else(task_failed)
        .map_err(|source| {
            warn!(role = %role.name, error = %source, "permission update failed");
            CommitError::PermissionUpdate {
                role: role.name.clone(),
                source,
            }
        })
}

/// Issue one update per user, all in flight at once, and wait for every one.
///
/// Failures keep the order of `updates`, so the first failure reported is the
/// first failing user in input order.
async fn membership_stage<S>(store: &Arc<S>, stage: Stage, updates: &[(UserId, String)]) -> FanOut
where
    S: UserStore + 'static,
{
    info!(%stage, users = updates.len(), "updating user roles");

    let requests: Vec<_> = updates
        .iter()
        .map(|(user_id, roles)| {
            let store = Arc::clone(store);
            let user_id = user_id.clone();
            let roles = roles.clone();
            tokio::spawn(async move { store.update_user_role_tokens(&user_id, &roles).await })
        })
        .collect();
    let results: Vec<Result<(), StoreError>> = join_all(requests)
        .await
        .into_iter()
        .map(|joined| joined.unwrap_or_else(task_failed))
        .collect();

    let mut fan = FanOut {
        succeeded: Vec::new(),
        failures: Vec::new(),
    };
    for ((user_id, _), result) in updates.iter().zip(results) {
        match result {
            Ok(()) => fan.succeeded.push(user_id.clone()),
            Err(source) => {
                warn!(%stage, %user_id, error = %source, "user role update failed");
                fan.failures.push(CommitError::MembershipUpdate {
                    user_id: user_id.clone(),
                    source,
                });
            }
        }
    }
    fan
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sysrole_store::{MemoryStore, StoreCall};

    use super::*;

    fn store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert_role(Role::new("custom", ["sysconsole_read_plugins"]));
        store.insert_user(User::new("keep", "system_user custom"));
        store.insert_user(User::new("gone", "system_user custom"));
        store.insert_user(User::new("new", "system_user"));
        store
    }

    fn plan(store: &MemoryStore, replace: bool) -> CommitPlan {
        let replacement = replace.then(|| Role::new("custom", ["sysconsole_write_plugins"]));
        let gone = store.user(&"gone".into()).unwrap();
        let new = store.user(&"new".into()).unwrap();
        CommitPlan::new("custom", replacement, [&gone], [&new])
    }

    #[test]
    fn test_plan_computes_role_strings() {
        let store = store();
        let plan = plan(&store, true);
        assert_eq!(
            plan.removals(),
            &[(UserId::new("gone"), "system_user".to_string())]
        );
        assert_eq!(
            plan.additions(),
            &[(UserId::new("new"), "system_user custom".to_string())]
        );
        assert!(!plan.is_empty());
    }

    #[tokio::test]
    async fn test_all_stages_succeed_in_order() {
        let store = store();
        let outcome = plan(&store, true).execute(&store).await;

        assert!(outcome.is_success());
        assert_eq!(
            outcome.report(),
            CommitReport {
                permissions_updated: true,
                users_removed: 1,
                users_added: 1,
            }
        );

        let calls = store.calls();
        assert_eq!(calls[0], StoreCall::ReplaceRole("custom".into()));
        assert!(matches!(&calls[1], StoreCall::UpdateUser { user_id, .. } if user_id.as_str() == "gone"));
        assert!(matches!(&calls[2], StoreCall::UpdateUser { user_id, .. } if user_id.as_str() == "new"));
    }

    #[tokio::test]
    async fn test_permission_failure_still_removes_but_skips_additions() {
        let store = store();
        store.fail_role_update(StoreError::Conflict("stale".into()));

        let outcome = plan(&store, true).execute(&store).await;
        let error = outcome.error.clone().unwrap();

        assert_eq!(error.stage, Stage::Permissions);
        assert_eq!(outcome.removed, vec![UserId::new("gone")]);
        assert!(outcome.added.is_empty());
        assert!(outcome.additions_skipped);
        assert!(!store.user(&"gone".into()).unwrap().has_role("custom"));
        assert!(!store.user(&"new".into()).unwrap().has_role("custom"));
    }

    #[tokio::test]
    async fn test_removal_error_replaces_permission_error() {
        let store = store();
        store.fail_role_update(StoreError::Conflict("stale".into()));
        store.fail_user_update("gone", StoreError::Rejected("locked".into()));

        let outcome = plan(&store, true).execute(&store).await;
        let error = outcome.error.unwrap();

        assert_eq!(error.stage, Stage::Removals);
        assert_eq!(
            error.error,
            CommitError::MembershipUpdate {
                user_id: "gone".into(),
                source: StoreError::Rejected("locked".into()),
            }
        );
        assert!(outcome.additions_skipped);
    }

    #[tokio::test]
    async fn test_addition_failure_reported() {
        let store = store();
        store.fail_user_update("new", StoreError::Unavailable("down".into()));

        let outcome = plan(&store, false).execute(&store).await;
        let error = outcome.error.unwrap();

        assert_eq!(error.stage, Stage::Additions);
        assert!(outcome.updated_role.is_none());
        assert_eq!(outcome.removed.len(), 1);
        assert!(outcome.added.is_empty());
        assert!(!outcome.additions_skipped);
    }

    #[tokio::test]
    async fn test_first_failure_in_input_order_wins() {
        let store = store();
        store.insert_user(User::new("a", "custom"));
        store.insert_user(User::new("b", "custom"));
        store.fail_user_update("a", StoreError::Rejected("first".into()));
        store.fail_user_update("b", StoreError::Rejected("second".into()));

        let a = store.user(&"a".into()).unwrap();
        let b = store.user(&"b".into()).unwrap();
        let keep = store.user(&"keep".into()).unwrap();
        let plan = CommitPlan::new("custom", None, [&a, &keep, &b], None);

        let error = plan.execute(&store).await.error.unwrap();
        assert_eq!(error.failed_requests, 2);
        assert_eq!(
            error.error,
            CommitError::MembershipUpdate {
                user_id: "a".into(),
                source: StoreError::Rejected("first".into()),
            }
        );
        assert!(error.message().ends_with("(and 1 more failed)"));
    }

    #[tokio::test]
    async fn test_membership_requests_overlap() {
        let store = Arc::new(MemoryStore::new().with_latency(Duration::from_millis(20)));
        let users: Vec<User> = (0..4)
            .map(|i| User::new(format!("u{i}"), "system_user"))
            .collect();
        for user in &users {
            store.insert_user(user.clone());
        }

        let plan = CommitPlan::new("custom", None, None, users.iter());
        let outcome = plan.execute(&store).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.added.len(), 4);
        assert_eq!(store.max_in_flight(), 4);
    }

    #[tokio::test]
    async fn test_empty_plan_touches_nothing() {
        let store = store();
        let plan = CommitPlan::new("custom", None, None, None);
        assert!(plan.is_empty());

        let outcome = plan.execute(&store).await;
        assert!(outcome.is_success());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_commit_lets_issued_requests_settle() {
        let store = Arc::new(MemoryStore::new().with_latency(Duration::from_millis(100)));
        store.insert_user(User::new("carol", "system_user"));
        let carol = store.user(&"carol".into()).unwrap();
        let plan = CommitPlan::new("custom", None, None, [&carol]);

        let result = tokio::time::timeout(Duration::from_millis(20), plan.execute(&store)).await;
        assert!(result.is_err());
        assert!(!store.user(&"carol".into()).unwrap().has_role("custom"));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(store.user(&"carol".into()).unwrap().has_role("custom"));
    }
}
