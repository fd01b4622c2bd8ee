//! Whether an editing session has anything to commit.

use crate::access::PendingEdits;
use crate::catalog::Catalog;
use crate::compile::compile;
use crate::membership::MembershipEdits;
use crate::permission::Sentinels;
use crate::types::Role;

/// True when compiling `edits` yields a set different from the committed one.
///
/// Empty edits never count as a change, even if the committed set is not
/// closed under the ancillary table.
pub fn permissions_changed(
    role: &Role,
    edits: &PendingEdits,
    catalog: &Catalog,
    sentinels: &Sentinels,
) -> bool {
    if edits.is_empty() {
        return false;
    }
    compile(role, edits, catalog, sentinels) != role.permissions
}

/// True when a commit would change either membership or permissions.
pub fn save_needed(
    role: &Role,
    edits: &PendingEdits,
    membership: &MembershipEdits,
    catalog: &Catalog,
    sentinels: &Sentinels,
) -> bool {
    !membership.is_empty() || permissions_changed(role, edits, catalog, sentinels)
}
