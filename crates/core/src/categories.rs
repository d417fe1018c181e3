//! Item category enrichment from the category tree.
//!
//! Item properties carry a time-stamped `categoryid`; each category is
//! joined with its parent from the tree so downstream models can back off
//! to the coarser category.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::millis_to_seconds;
use crate::split::SplitWindows;

/// Item property holding the category id.
pub const CATEGORY_PROPERTY: &str = "categoryid";

/// Row of the category tree. Root categories have no parent.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTreeRow {
    pub categoryid: u32,
    pub parentid: Option<u32>,
}

/// Row of the item property log. `timestamp` is in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemPropertyRow {
    pub timestamp: u64,
    pub itemid: u32,
    pub property: String,
    pub value: String,
}

/// Output row: an item with its category and that category's parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemCategory {
    pub itemid: u32,
    pub categoryid: u32,
    pub parentid: u32,
}

/// Parent lookup over the category tree.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    parents: HashMap<u32, BTreeSet<u32>>,
}

impl CategoryTree {
    pub fn from_rows(rows: impl IntoIterator<Item = CategoryTreeRow>) -> Self {
        let mut parents: HashMap<u32, BTreeSet<u32>> = HashMap::new();
        for row in rows {
            parents
                .entry(row.categoryid)
                .or_default()
                .insert(row.parentid.unwrap_or(row.categoryid));
        }
        Self { parents }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Parents of a category; unknown and root categories are their own parent.
    pub fn parents_of(&self, categoryid: u32) -> Vec<u32> {
        match self.parents.get(&categoryid) {
            Some(parents) => parents.iter().copied().collect(),
            None => vec![categoryid],
        }
    }
}

/// Joins category properties inside the train window with their parents.
///
/// The result is deduplicated and sorted by `(itemid, categoryid, parentid)`.
pub fn item_categories(
    tree: &CategoryTree,
    properties: impl IntoIterator<Item = ItemPropertyRow>,
    windows: &SplitWindows,
) -> Result<Vec<ItemCategory>> {
    let mut out = BTreeSet::new();

    for (i, row) in properties.into_iter().enumerate() {
        if row.property != CATEGORY_PROPERTY {
            continue;
        }

        let categoryid: u32 = row.value.trim().parse().map_err(|_| {
            Error::schema(format!(
                "row {}: category value {:?} is not an integer",
                i + 1,
                row.value
            ))
        })?;
        let timestamp = millis_to_seconds(row.timestamp)
            .map_err(|e| Error::schema(format!("row {}: {}", i + 1, e)))?;

        if !windows.in_train(timestamp) {
            continue;
        }

        for parentid in tree.parents_of(categoryid) {
            out.insert(ItemCategory {
                itemid: row.itemid,
                categoryid,
                parentid,
            });
        }
    }

    Ok(out.into_iter().collect())
}
