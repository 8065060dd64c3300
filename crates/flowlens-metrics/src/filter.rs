//! Facet filters for the organized buckets.
//!
//! Each dimension (priority, size) compiles to its own predicate and the
//! predicates are AND-ed together. An empty selection on a dimension means
//! that dimension does not restrict anything.

use std::collections::BTreeSet;
use std::fmt;

use flowlens_core::config::SizeConfig;
use flowlens_core::model::WorkItem;
use serde::{Deserialize, Serialize};

/// Ordered t-shirt size buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Xxs,
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
}

impl SizeBucket {
    pub const ALL: [Self; 7] = [
        Self::Xxs,
        Self::Xs,
        Self::S,
        Self::M,
        Self::L,
        Self::Xl,
        Self::Xxl,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Xxs => "xxs",
            Self::Xs => "xs",
            Self::S => "s",
            Self::M => "m",
            Self::L => "l",
            Self::Xl => "xl",
            Self::Xxl => "xxl",
        }
    }

    /// Bucket for `effort` under the configured upper bounds.
    ///
    /// The first bound that `effort` does not exceed selects the bucket;
    /// anything above the last bound is `Xxl`. Non-finite values have no size.
    #[must_use]
    pub fn classify(effort: f64, sizes: &SizeConfig) -> Option<Self> {
        if !effort.is_finite() {
            return None;
        }
        let idx = sizes
            .thresholds
            .iter()
            .position(|&bound| effort <= bound)
            .unwrap_or(sizes.thresholds.len());
        Self::ALL.get(idx).copied()
    }

    /// Bucket for an item, or `None` when it carries no effort value.
    #[must_use]
    pub fn of(item: &WorkItem, sizes: &SizeConfig) -> Option<Self> {
        item.effort.and_then(|effort| Self::classify(effort, sizes))
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Facet values selected by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub priorities: BTreeSet<u8>,
    #[serde(default)]
    pub sizes: BTreeSet<SizeBucket>,
}

impl FilterSelection {
    /// True when no dimension restricts anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.priorities.is_empty() && self.sizes.is_empty()
    }

    /// Compile the selection into one AND-combined predicate.
    #[must_use]
    pub fn compile(&self, sizes: &SizeConfig) -> CompiledFilter {
        let mut predicates: Vec<ItemPredicate> = Vec::new();

        if !self.priorities.is_empty() {
            let allowed = self.priorities.clone();
            predicates.push(Box::new(move |item: &WorkItem| {
                item.priority.is_some_and(|p| allowed.contains(&p))
            }));
        }

        if !self.sizes.is_empty() {
            let allowed = self.sizes.clone();
            let table = sizes.clone();
            predicates.push(Box::new(move |item: &WorkItem| {
                SizeBucket::of(item, &table).is_some_and(|size| allowed.contains(&size))
            }));
        }

        CompiledFilter { predicates }
    }
}

type ItemPredicate = Box<dyn Fn(&WorkItem) -> bool + Send + Sync>;

/// The AND of one predicate per active dimension.
pub struct CompiledFilter {
    predicates: Vec<ItemPredicate>,
}

impl CompiledFilter {
    #[must_use]
    pub fn matches(&self, item: &WorkItem) -> bool {
        self.predicates.iter().all(|p| p(item))
    }

    /// Number of restricting dimensions.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.predicates.len()
    }
}

impl fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("dimensions", &self.predicates.len())
            .finish()
    }
}
