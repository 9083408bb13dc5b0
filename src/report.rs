//! Diagnostics returned alongside a successful load.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Variables that were not extracted, per scope, in walk order.
///
/// A variable ends up here when its dimensions are not exactly the entity
/// dimension of the load (time series, centerline ranges, ...). This is not
/// an error: such variables are still reachable through
/// [`Session::variable`](crate::source::Session::variable).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    scopes: Vec<(String, Vec<String>)>,
}

impl Report {
    pub fn new() -> Report {
        Report::default()
    }

    /// Record the unextracted variables of `scope`, appending if the scope
    /// was already recorded.
    pub fn insert<S: Into<String>>(&mut self, scope: S, names: Vec<String>) {
        let scope = scope.into();

        match self.scopes.iter_mut().find(|(s, _)| *s == scope) {
            Some((_, v)) => v.extend(names),
            None => self.scopes.push((scope, names)),
        }
    }

    pub fn get(&self, scope: &str) -> Option<&[String]> {
        self.scopes
            .iter()
            .find(|(s, _)| s == scope)
            .map(|(_, v)| v.as_slice())
    }

    pub fn scopes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.scopes.iter().map(|(s, v)| (s.as_str(), v.as_slice()))
    }

    /// Total number of unextracted variables.
    pub fn len(&self) -> usize {
        self.scopes.iter().map(|(_, v)| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (scope, names) in &self.scopes {
            writeln!(f, "{scope:>12}: {}", names.join(", "))?;
        }
        Ok(())
    }
}
