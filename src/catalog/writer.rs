use super::Catalog;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Serialize a catalog as pretty JSON (two-space indent, non-ASCII kept as-is)
pub fn to_pretty_json(catalog: &Catalog) -> Result<String> {
    serde_json::to_string_pretty(catalog).context("Failed to serialize string catalog")
}

/// Write the catalog next to `path` and rename it over the original.
///
/// Readers see either the previous file or the new one, never a partial write.
pub fn save_atomic(catalog: &Catalog, path: &Path) -> Result<()> {
    let json = to_pretty_json(catalog)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .context("Failed to write string catalog")?;
    tmp.as_file()
        .sync_all()
        .context("Failed to flush string catalog")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace string catalog: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Entry;
    use tempfile::TempDir;

    fn sample_catalog() -> Catalog {
        Catalog::from_json(
            r#"{"sourceLanguage": "en", "strings": {"Zebra": {}, "Apple": {"comment": "fruit"}}, "version": "1.0"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_pretty_json_keeps_key_order_and_unicode() {
        let mut catalog = sample_catalog();
        catalog
            .strings
            .get_mut("Apple")
            .unwrap()
            .set_translation("zh-Hans", "苹果");

        let json = to_pretty_json(&catalog).unwrap();

        assert!(json.contains("苹果"), "non-ASCII must not be escaped: {}", json);
        let zebra = json.find("\"Zebra\"").unwrap();
        let apple = json.find("\"Apple\"").unwrap();
        assert!(zebra < apple, "original key order must be kept");
        assert!(json.find("\"sourceLanguage\"").unwrap() < json.find("\"version\"").unwrap());
        assert!(json.starts_with("{\n  \"sourceLanguage\""));
    }

    #[test]
    fn test_save_atomic_replaces_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("Localizable.xcstrings");
        std::fs::write(&path, "old contents").unwrap();

        let catalog = sample_catalog();
        save_atomic(&catalog, &path).expect("Should save");

        let reloaded = Catalog::load(&path).expect("Should reload");
        assert_eq!(reloaded, catalog);

        // No stray temp files left behind
        let files: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_save_atomic_creates_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("New.xcstrings");

        let mut catalog = sample_catalog();
        catalog.strings.insert("Added".to_string(), Entry::default());
        catalog.save(&path).expect("Should save");

        assert!(path.exists());
        assert!(Catalog::load(&path).unwrap().strings.contains_key("Added"));
    }

    #[test]
    fn test_save_atomic_fails_for_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("missing").join("Localizable.xcstrings");

        assert!(save_atomic(&sample_catalog(), &path).is_err());
    }
}
