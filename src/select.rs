//! Selection of entities (reaches or nodes) by identifier.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// Boolean selection over an entity dimension. `true` keeps the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask(Vec<bool>);

impl Mask {
    /// Keep all `n` entities.
    pub fn all(n: usize) -> Mask {
        Mask(vec![true; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of selected entities.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|m| **m).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Positions of the selected entities, in increasing order.
    pub fn indices(&self) -> Vec<usize> {
        self.iter()
            .enumerate()
            .filter_map(|(i, m)| m.then_some(i))
            .collect()
    }

    /// Boolean gather: keep the values at selected positions, preserving their
    /// relative order. The caller checks that the lengths agree.
    pub fn gather<'a, T, I>(&self, values: I) -> Vec<T>
    where
        T: Clone + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        values
            .into_iter()
            .zip(&self.0)
            .filter_map(|(v, m)| m.then(|| v.clone()))
            .collect()
    }
}

impl From<Vec<bool>> for Mask {
    fn from(v: Vec<bool>) -> Self {
        Mask(v)
    }
}

/// Compute the selection mask of `entity_ids` given an optional allow-list.
///
/// Without an allow-list every entity is kept. An allow-list applied to an
/// empty identifier set is rejected since it selects a subset of nothing.
pub fn compute_mask(entity_ids: &[i64], allow_list: Option<&HashSet<i64>>) -> Result<Mask> {
    let ids: Vec<Option<i64>> = entity_ids.iter().copied().map(Some).collect();
    compute_nullable_mask(&ids, allow_list)
}

/// As [`compute_mask`], for identifiers that may be missing. A missing
/// identifier is kept without an allow-list and never matches one.
pub fn compute_nullable_mask(
    entity_ids: &[Option<i64>],
    allow_list: Option<&HashSet<i64>>,
) -> Result<Mask> {
    match allow_list {
        None => Ok(Mask::all(entity_ids.len())),
        Some(allow) if entity_ids.is_empty() && !allow.is_empty() => Err(Error::Configuration(
            format!(
                "allow-list of {} identifiers applied to an empty identifier set",
                allow.len()
            ),
        )),
        Some(allow) => Ok(Mask(
            entity_ids
                .iter()
                .map(|id| id.map_or(false, |id| allow.contains(&id)))
                .collect(),
        )),
    }
}
