//! Conversion helpers around resource file naming

use std::path::{Path, PathBuf};

/// Resource type from a resource file name, e.g. `TEMP` for
/// `00D5CB7E6D04E32C.TEMP`.
#[must_use]
pub fn resource_type_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && !ext.eq_ignore_ascii_case("json"))
        .map(str::to_ascii_uppercase)
}

/// Output path used when none is given: the resource name plus `.json`.
#[must_use]
pub fn default_output_path(resource: &Path) -> PathBuf {
    let mut name = resource.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

/// Output path for `resource` inside `output_dir`.
#[must_use]
pub fn output_path_in(resource: &Path, output_dir: &Path) -> PathBuf {
    let file_name = resource
        .file_name()
        .map_or_else(|| PathBuf::from("resource"), PathBuf::from);
    default_output_path(&output_dir.join(file_name))
}

/// Output path for a conversion: an explicit `destination` wins, then a
/// file inside `output_dir`, then [`default_output_path`].
#[must_use]
pub fn resolve_output_path(
    resource: &Path,
    destination: Option<&Path>,
    output_dir: Option<&Path>,
) -> PathBuf {
    match (destination, output_dir) {
        (Some(destination), _) => destination.to_path_buf(),
        (None, Some(dir)) => output_path_in(resource, dir),
        (None, None) => default_output_path(resource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_of() {
        assert_eq!(
            resource_type_of(Path::new("00D5CB7E6D04E32C.TEMP")).as_deref(),
            Some("TEMP")
        );
        assert_eq!(
            resource_type_of(Path::new("dir/00D5CB7E6D04E32C.tblu")).as_deref(),
            Some("TBLU")
        );
        assert_eq!(resource_type_of(Path::new("00D5CB7E6D04E32C")), None);
        assert_eq!(resource_type_of(Path::new("out.json")), None);
    }

    #[test]
    fn test_output_paths() {
        assert_eq!(
            default_output_path(Path::new("a/00D5CB7E6D04E32C.TEMP")),
            PathBuf::from("a/00D5CB7E6D04E32C.TEMP.json")
        );
        assert_eq!(
            output_path_in(Path::new("a/X.TBLU"), Path::new("out")),
            PathBuf::from("out/X.TBLU.json")
        );
    }

    #[test]
    fn test_resolve_output_path() {
        let resource = Path::new("a/X.TEMP");
        assert_eq!(
            resolve_output_path(resource, Some(Path::new("b/y.json")), Some(Path::new("out"))),
            PathBuf::from("b/y.json")
        );
        assert_eq!(
            resolve_output_path(resource, None, Some(Path::new("out"))),
            PathBuf::from("out/X.TEMP.json")
        );
        assert_eq!(
            resolve_output_path(resource, None, None),
            PathBuf::from("a/X.TEMP.json")
        );
    }
}
