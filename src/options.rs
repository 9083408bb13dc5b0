//! Options controlling what a load extracts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::extract::Naming;
use crate::source::GroupPath;
use crate::walk::{Level, Scope};

/// Kind of file being loaded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// SWORD of Science: base group, `model`, `gbpriors` and gauge overlays.
    #[default]
    Sos,
    /// SWORD river database: base group (and centerlines) only.
    Sword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub level: Level,
    pub product: Product,

    /// Identifiers to keep, matched against `filter_key`. `None` keeps all.
    pub reaches: Option<HashSet<i64>>,

    /// Identifier variable of the base group the allow-list applies to.
    pub filter_key: String,

    /// Column joining overlay networks onto the primary table.
    pub join_key: String,

    /// Group whose sub-groups are overlay networks.
    pub overlay_parent: GroupPath,

    /// Variables never extracted from the base and model groups.
    pub exclude: Vec<String>,

    /// Reconstruct centerline geometries.
    pub geometry: bool,

    /// Fail when the centerline ranges of two selected entities overlap.
    pub reject_overlapping_ranges: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            level: Level::Reaches,
            product: Product::Sos,
            reaches: None,
            filter_key: "reach_id".into(),
            join_key: "reach_id".into(),
            overlay_parent: GroupPath::from("model"),
            exclude: vec!["x".into(), "y".into()],
            geometry: false,
            reject_overlapping_ranges: true,
        }
    }
}

impl LoadOptions {
    pub fn new(level: Level) -> LoadOptions {
        LoadOptions {
            level,
            ..LoadOptions::default()
        }
    }

    /// Options for a SWORD file at `level`.
    pub fn sword(level: Level) -> LoadOptions {
        LoadOptions::new(level).product(Product::Sword)
    }

    #[must_use]
    pub fn product(mut self, product: Product) -> LoadOptions {
        self.product = product;
        self
    }

    /// Keep only the entities whose `filter_key` is in `ids`.
    #[must_use]
    pub fn reaches<I: IntoIterator<Item = i64>>(mut self, ids: I) -> LoadOptions {
        self.reaches = Some(ids.into_iter().collect());
        self
    }

    #[must_use]
    pub fn filter_key(mut self, key: &str) -> LoadOptions {
        self.filter_key = key.into();
        self
    }

    #[must_use]
    pub fn with_geometry(mut self) -> LoadOptions {
        self.geometry = true;
        self
    }

    #[must_use]
    pub fn allow_overlapping_ranges(mut self) -> LoadOptions {
        self.reject_overlapping_ranges = false;
        self
    }

    /// The group scopes walked for this product and level, in order.
    pub fn scopes(&self) -> Vec<Scope> {
        let base = Scope {
            tag: self.level.group().into(),
            path: GroupPath::from(self.level.group()),
            naming: Naming::Raw,
            required: true,
        };

        match self.product {
            Product::Sword => vec![base],
            Product::Sos => vec![
                base,
                Scope {
                    tag: "model".into(),
                    path: GroupPath::from("model"),
                    naming: Naming::Prefix("model".into()),
                    required: true,
                },
                Scope {
                    tag: "gbpriors".into(),
                    path: GroupPath::from("gbpriors").join(self.level.sublevel()),
                    naming: Naming::Prefix("gbpriors".into()),
                    required: false,
                },
            ],
        }
    }
}
