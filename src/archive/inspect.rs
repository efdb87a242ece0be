//! Web Deploy (MSDeploy) package detection.

use std::path::Path;

use super::Archiver;
use crate::error::Result;

const PARAMETERS_ENTRIES: [&str; 2] = ["parameters.xml", "Parameters.xml"];
const SYSTEM_INFO_ENTRIES: [&str; 2] = ["systemInfo.xml", "systeminfo.xml"];

/// True iff the entry list holds both a parameters descriptor and a
/// system-info entry, in either of their known capitalizations.
pub fn entries_look_like_msdeploy<S: AsRef<str>>(entries: &[S]) -> bool {
    let has = |names: &[&str]| entries.iter().any(|e| names.contains(&e.as_ref()));
    has(&PARAMETERS_ENTRIES) && has(&SYSTEM_INFO_ENTRIES)
}

/// Checks whether the archive at `package` is an MSDeploy package.
pub async fn is_msdeploy_package<A: Archiver>(archiver: &A, package: &Path) -> Result<bool> {
    let entries = archiver.list_entries(package).await?;
    let is_msdeploy = entries_look_like_msdeploy(&entries);
    tracing::debug!(package = %package.display(), is_msdeploy, "inspected package");
    Ok(is_msdeploy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_entries_required() {
        assert!(entries_look_like_msdeploy(&["parameters.xml", "systemInfo.xml"]));
        assert!(entries_look_like_msdeploy(&["Content/", "Parameters.xml", "systeminfo.xml"]));
        assert!(!entries_look_like_msdeploy(&["Parameters.xml"]));
        assert!(!entries_look_like_msdeploy(&["systemInfo.xml"]));
        assert!(!entries_look_like_msdeploy::<&str>(&[]));
    }

    #[test]
    fn other_capitalizations_and_nesting_do_not_count() {
        assert!(!entries_look_like_msdeploy(&["PARAMETERS.XML", "SYSTEMINFO.XML"]));
        assert!(!entries_look_like_msdeploy(&["pkg/parameters.xml", "pkg/systemInfo.xml"]));
    }
}
