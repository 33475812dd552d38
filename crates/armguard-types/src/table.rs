//! [`JointLimitTable`] – per-joint soft limits and the conservative merge.
//!
//! Every collision model produces a table each cycle; the manager folds them
//! into one with [`JointLimitTable::merge`].  The merge keeps, per joint, the
//! largest concrete lower bound and the smallest concrete upper bound, so it
//! is commutative, associative and idempotent.  A joint absent from a table
//! reads as unconstrained.
//!
//! # Example
//!
//! ```rust
//! use armguard_types::{JointLimitTable, JointRange};
//!
//! let a = JointLimitTable::new().with("arm", JointRange::bounded(0.2, 0.5));
//! let b = JointLimitTable::new().with("arm", JointRange::bounded(0.3, 0.4));
//!
//! let merged = JointLimitTable::merged([&a, &b]);
//! assert_eq!(merged.get("arm"), JointRange::bounded(0.3, 0.4));
//! assert_eq!(merged.get("lift"), JointRange::UNCONSTRAINED);
//! ```

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GuardError;
use crate::range::JointRange;

/// Stable joint identifier, e.g. `"lift"` or `"wrist_yaw"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointId(String);

impl JointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for JointId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JointId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JointId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&JointId> for JointId {
    fn from(id: &JointId) -> Self {
        id.clone()
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from [`JointId`] to [`JointRange`], ordered by joint name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointLimitTable {
    entries: BTreeMap<JointId, JointRange>,
}

impl JointLimitTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with an unconstrained entry for every joint in
    /// `joints`.
    pub fn seeded<I, J>(joints: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: Into<JointId>,
    {
        joints
            .into_iter()
            .map(|j| (j.into(), JointRange::UNCONSTRAINED))
            .collect()
    }

    /// Builder form of [`JointLimitTable::set`].
    pub fn with(mut self, joint: impl Into<JointId>, range: JointRange) -> Self {
        self.set(joint, range);
        self
    }

    /// Insert or replace the range for `joint`.
    pub fn set(&mut self, joint: impl Into<JointId>, range: JointRange) {
        self.entries.insert(joint.into(), range);
    }

    /// Tighten the entry for `joint` by intersecting it with `range`.  An
    /// absent entry starts out unconstrained.
    pub fn constrain(&mut self, joint: impl Into<JointId>, range: JointRange) {
        let entry = self.entries.entry(joint.into()).or_default();
        *entry = entry.intersect(&range);
    }

    /// The range for `joint`; unconstrained when the table has no entry.
    pub fn get(&self, joint: &str) -> JointRange {
        self.entries.get(joint).copied().unwrap_or_default()
    }

    pub fn contains(&self, joint: &str) -> bool {
        self.entries.contains_key(joint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn joints(&self) -> impl Iterator<Item = &JointId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, JointId, JointRange> {
        self.entries.iter()
    }

    /// Fold `other` into `self` with the conservative intersection.
    pub fn merge(&mut self, other: &JointLimitTable) {
        for (joint, range) in other {
            self.constrain(joint, *range);
        }
    }

    /// Merge any number of tables into a fresh one.
    pub fn merged<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a JointLimitTable>,
    {
        let mut out = Self::new();
        for table in tables {
            out.merge(table);
        }
        out
    }

    /// Joints whose range ended up with `lower > upper`.
    pub fn inverted(&self) -> Vec<JointId> {
        self.entries
            .iter()
            .filter(|(_, r)| r.is_inverted())
            .map(|(j, _)| j.clone())
            .collect()
    }

    /// Validate every entry, stopping at the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidRange`] for the first offending joint.
    pub fn validate(&self) -> Result<(), GuardError> {
        for (joint, range) in &self.entries {
            range.validate(joint.as_str())?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a JointLimitTable {
    type Item = (&'a JointId, &'a JointRange);
    type IntoIter = btree_map::Iter<'a, JointId, JointRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<J: Into<JointId>> FromIterator<(J, JointRange)> for JointLimitTable {
    fn from_iter<T: IntoIterator<Item = (J, JointRange)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(j, r)| (j.into(), r)).collect(),
        }
    }
}
