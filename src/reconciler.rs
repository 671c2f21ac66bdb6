use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::error::{Result, SicoError};
use crate::models::LongRow;

#[derive(Debug)]
pub struct ReconcileResult {
    pub rows: Vec<LongRow>,
    /// Snapshot entries missing from the new extract and carried over.
    pub reinstated: Vec<LongRow>,
}

type Key = (NaiveDate, String);

fn index_snapshot(snapshot: &[LongRow]) -> Result<BTreeMap<Key, i64>> {
    let mut index = BTreeMap::new();
    for row in snapshot {
        let key = row.key();
        if index.insert(key.clone(), row.total).is_some() {
            return Err(SicoError::DuplicateSnapshotKey {
                date: key.0.to_string(),
                category: key.1,
            });
        }
    }
    Ok(index)
}

/// Merge `fresh` rows with the previously written `snapshot`.
///
/// Every (date, category) key in the snapshot survives: keys the new extract
/// still has keep the new total, the rest are reinstated with the snapshot
/// total. The result is sorted by category, then date.
pub fn reconcile(fresh: Vec<LongRow>, snapshot: &[LongRow]) -> Result<ReconcileResult> {
    let index = index_snapshot(snapshot)?;
    let present: HashSet<Key> = fresh.iter().map(LongRow::key).collect();

    let mut reinstated = Vec::new();
    for key in index.keys().filter(|k| !present.contains(*k)) {
        let total = index.get(key).copied().ok_or_else(|| {
            SicoError::Reconciliation(format!("{} {} not found in snapshot", key.0, key.1))
        })?;
        tracing::info!(date = %key.0, category = %key.1, total, "reinstated from snapshot");
        reinstated.push(LongRow {
            date: key.0,
            category: Some(key.1.clone()),
            total,
        });
    }

    let mut rows = fresh;
    rows.extend(reinstated.iter().cloned());
    rows.sort_by(|a, b| a.category.cmp(&b.category).then(a.date.cmp(&b.date)));

    Ok(ReconcileResult { rows, reinstated })
}
