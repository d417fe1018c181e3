//! Category tree, item property and item category files.

use std::path::Path;

use sessions_core::categories::{CategoryTreeRow, ItemCategory, ItemPropertyRow};
use sessions_core::Result;
use tracing::debug;

use crate::files::{create_writer, csv_error, open_reader};

/// Reads `category_tree.csv` (`categoryid,parentid`); root rows leave `parentid` empty.
pub fn read_category_tree(path: &Path) -> Result<Vec<CategoryTreeRow>> {
    let rows = read_csv(path)?;
    debug!(path = %path.display(), count = rows.len(), "Read category tree");
    Ok(rows)
}

/// Reads an item property log (`timestamp,itemid,property,value`).
pub fn read_item_properties(path: &Path) -> Result<Vec<ItemPropertyRow>> {
    let rows = read_csv(path)?;
    debug!(path = %path.display(), count = rows.len(), "Read item properties");
    Ok(rows)
}

/// Writes `itemid,categoryid,parentid` rows.
pub fn write_item_categories(path: &Path, rows: &[ItemCategory]) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(create_writer(path)?);
    if rows.is_empty() {
        writer
            .write_record(["itemid", "categoryid", "parentid"])
            .map_err(|e| csv_error(path, e))?;
    }
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;

    debug!(path = %path.display(), count = rows.len(), "Wrote item categories");
    Ok(rows.len())
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(open_reader(path)?);
    reader
        .deserialize()
        .map(|record| record.map_err(|e| csv_error(path, e)))
        .collect()
}
