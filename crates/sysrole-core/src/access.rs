//! Access resolution for console sections.
//!
//! A section's displayed access comes from, in order: the super permission,
//! a pending edit for that section, then the committed permission pair.
//! Sections with subsections aggregate over their enabled subsections and
//! report [`SectionAccess::Mixed`] when those disagree.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::SystemSection;
use crate::error::CoreError;
use crate::permission::{PermissionName, Sentinels};

/// Grantable access to a console section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    None,
    Read,
    Write,
}

/// Displayed access to a section. `Mixed` only ever comes out of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionAccess {
    None,
    Read,
    Write,
    Mixed,
}

impl From<AccessLevel> for SectionAccess {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::None => SectionAccess::None,
            AccessLevel::Read => SectionAccess::Read,
            AccessLevel::Write => SectionAccess::Write,
        }
    }
}

impl TryFrom<SectionAccess> for AccessLevel {
    type Error = CoreError;

    fn try_from(access: SectionAccess) -> Result<Self, Self::Error> {
        match access {
            SectionAccess::None => Ok(AccessLevel::None),
            SectionAccess::Read => Ok(AccessLevel::Read),
            SectionAccess::Write => Ok(AccessLevel::Write),
            SectionAccess::Mixed => Err(CoreError::MixedNotAssignable),
        }
    }
}

/// Sparse per-section access edits for one editing session.
///
/// A section missing from the map keeps whatever the committed role grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingEdits(BTreeMap<String, AccessLevel>);

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit, replacing any earlier edit of the same section.
    pub fn set(&mut self, section: impl Into<String>, level: AccessLevel) {
        self.0.insert(section.into(), level);
    }

    pub fn get(&self, section: &str) -> Option<AccessLevel> {
        self.0.get(section).copied()
    }

    pub fn contains(&self, section: &str) -> bool {
        self.0.contains_key(section)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AccessLevel)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<S: Into<String>> FromIterator<(S, AccessLevel)> for PendingEdits {
    fn from_iter<I: IntoIterator<Item = (S, AccessLevel)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Effective access to a single section name.
pub fn current_access(
    section_name: &str,
    committed: &BTreeSet<String>,
    edits: &PendingEdits,
    sentinels: &Sentinels,
) -> AccessLevel {
    if committed.contains(&sentinels.super_permission) {
        return AccessLevel::Write;
    }

    if let Some(level) = edits.get(section_name) {
        return level;
    }

    if committed.contains(&PermissionName::write(section_name).format()) {
        AccessLevel::Write
    } else if committed.contains(&PermissionName::read(section_name).format()) {
        AccessLevel::Read
    } else {
        AccessLevel::None
    }
}

/// Displayed access for a section, aggregating over enabled leaves.
///
/// Nested subsections are walked down to their leaves, the same leaves a bulk
/// edit of the section writes. A section with no enabled leaf shows `None`.
pub fn aggregate_access(
    section: &SystemSection,
    committed: &BTreeSet<String>,
    edits: &PendingEdits,
    sentinels: &Sentinels,
) -> SectionAccess {
    if section.is_leaf() {
        return current_access(&section.name, committed, edits, sentinels).into();
    }

    let mut distinct = BTreeSet::new();
    collect_leaf_levels(section, committed, edits, sentinels, &mut distinct);

    let mut levels = distinct.into_iter();
    match (levels.next(), levels.next()) {
        (None, _) => SectionAccess::None,
        (Some(level), None) => level.into(),
        (Some(_), Some(_)) => SectionAccess::Mixed,
    }
}

fn collect_leaf_levels(
    section: &SystemSection,
    committed: &BTreeSet<String>,
    edits: &PendingEdits,
    sentinels: &Sentinels,
    out: &mut BTreeSet<AccessLevel>,
) {
    for sub in section.enabled_subsections() {
        if sub.is_leaf() {
            out.insert(current_access(&sub.name, committed, edits, sentinels));
        } else {
            collect_leaf_levels(sub, committed, edits, sentinels, out);
        }
    }
}
