//! Copy plans handed to the on-disk export collaborator.

use crate::model::Package;
use std::path::{Path, PathBuf};

/// One file to copy: `source` on disk to `destination` inside the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyInstruction {
    pub destination: String,
    pub source: PathBuf,
}

/// One instruction per binary entry that has an on-disk path, in group
/// registration order. The destination is the entry `Uri`, or
/// `content/<id>.<ext>` when it has none.
pub fn export_plan(package: &Package) -> Vec<CopyInstruction> {
    package
        .groups()
        .flat_map(|group| group.binary_objects.iter())
        .filter_map(|object| {
            let source = object.on_disk_path.clone()?;
            let destination = object
                .uri()
                .unwrap_or_else(|| format!("content/{}{}", object.id(), extension_suffix(&source)));
            Some(CopyInstruction {
                destination,
                source,
            })
        })
        .collect()
}

/// `.ext` of `path`, or an empty string.
pub(crate) fn extension_suffix(path: &Path) -> String {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| format!(".{extension}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::export_plan;
    use crate::model::{BinaryDataObject, DataObjectGroup, Package};

    #[test]
    fn plan_prefers_uri_and_skips_objects_without_path() {
        let mut package = Package::new();
        let mut with_uri = BinaryDataObject::new("ID2", "BinaryMaster_1")
            .unwrap()
            .with_path("/data/in/a.pdf");
        with_uri.set_uri("content/a.pdf").unwrap();
        let without_uri = BinaryDataObject::new("ID3", "Dissemination_1")
            .unwrap()
            .with_path("/data/in/b.odt");
        let detached = BinaryDataObject::new("ID4", "TextContent_1").unwrap();
        package
            .register_group(
                DataObjectGroup::new("ID1")
                    .with_binary(with_uri)
                    .with_binary(without_uri)
                    .with_binary(detached),
            )
            .unwrap();

        let plan = export_plan(&package);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].destination, "content/a.pdf");
        assert_eq!(plan[1].destination, "content/ID3.odt");
        assert_eq!(plan[1].source.to_str(), Some("/data/in/b.odt"));
    }
}
