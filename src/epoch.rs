//! Run epoch: the fixed cutoff timestamp deciding which files are stale for
//! the current run. Persisted in the catalog's meta table so repeated
//! invocations of one run share the same baseline, and deleted exactly once
//! when the run completes.

use anyhow::Result;

use crate::catalog::Catalog;
use crate::util::formatted_datetime;

const EPOCH_KEY: &str = "deploy_epoch";

/// Return the persisted epoch, creating and persisting a fresh "now" value if
/// none exists. Idempotent until [`clear_epoch`] runs: every call within one
/// run returns the identical value.
pub fn get_or_create_epoch(catalog: &Catalog) -> Result<String> {
    if let Some(epoch) = catalog.get_meta(EPOCH_KEY)?
        && !epoch.is_empty()
    {
        return Ok(epoch);
    }
    let epoch = formatted_datetime();
    catalog.set_meta(EPOCH_KEY, &epoch)?;
    Ok(epoch)
}

/// Delete the persisted epoch. Called when a run is determined complete; the
/// next invocation starts a new run with a new baseline.
pub fn clear_epoch(catalog: &Catalog) -> Result<()> {
    catalog.delete_meta(EPOCH_KEY)
}

/// The epoch of the run currently in progress, if any. Read-only: never
/// creates one.
pub fn current_epoch(catalog: &Catalog) -> Result<Option<String>> {
    catalog.get_meta(EPOCH_KEY)
}
