// File: src/persistence.rs
use crate::config::ResolverConfig;
use crate::core::engine::AddressResolver;
use crate::core::hierarchy::{ContextualHierarchy, ProvinceRecord};
use crate::core::lexicon::Lexicons;
use crate::error::{ResolveError, Result};
use log::{info, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads a line-delimited name list. A missing or unreadable file yields an
/// empty list and a warning.
pub fn load_names(path: &Path) -> Vec<String> {
    match try_load_names(path) {
        Ok(names) => names,
        Err(e) => {
            warn!("{e}; continuing with an empty list");
            Vec::new()
        }
    }
}

pub fn try_load_names(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|e| ResolveError::io(path, e))?;
    Ok(raw
        .lines()
        .map(|line| line.trim_start_matches('\u{feff}').trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Reads the hierarchy JSON. Missing or malformed data yields an empty
/// hierarchy, which accepts every combination.
pub fn load_hierarchy(path: &Path) -> ContextualHierarchy {
    match try_load_hierarchy(path) {
        Ok(hierarchy) => hierarchy,
        Err(e) => {
            warn!("{e}; hierarchy checks disabled");
            ContextualHierarchy::new()
        }
    }
}

pub fn try_load_hierarchy(path: &Path) -> Result<ContextualHierarchy> {
    let file = File::open(path).map_err(|e| ResolveError::io(path, e))?;
    let records: Vec<ProvinceRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ResolveError::json(path, e))?;
    Ok(ContextualHierarchy::from_records(&records))
}

/// Everything needed to rebuild a resolver without re-deriving variants.
#[derive(serde::Serialize, serde::Deserialize)]
struct Snapshot {
    lexicons: Lexicons,
    hierarchy: ContextualHierarchy,
    config: ResolverConfig,
}

/// Writes the built indexes next to `path` first, then renames over it, so
/// a crash never leaves a truncated snapshot behind.
pub fn save_snapshot(resolver: &AddressResolver, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(|e| ResolveError::io(parent_dir, e))?;

    let snapshot = Snapshot {
        lexicons: resolver.lexicons.clone(),
        hierarchy: resolver.hierarchy.clone(),
        config: resolver.config.clone(),
    };

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| ResolveError::io(parent_dir, e))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush().map_err(|e| ResolveError::io(temp_file.path(), e))?;
    }
    temp_file.persist(path).map_err(|e| ResolveError::io(path, e.error))?;
    info!("saved index snapshot to {}", path.display());
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<AddressResolver> {
    let file = File::open(path).map_err(|e| ResolveError::io(path, e))?;
    let snapshot: Snapshot = bincode::deserialize_from(BufReader::new(file))?;
    snapshot.config.validate()?;
    Ok(AddressResolver::from_parts(snapshot.lexicons, snapshot.hierarchy, snapshot.config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_blank_lines_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\u{feff}Hà Nội\n\n  Đồng Nai \r\nNghệ An\n").unwrap();
        assert_eq!(load_names(file.path()), vec!["Hà Nội", "Đồng Nai", "Nghệ An"]);
    }

    #[test]
    fn missing_files_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_names(&dir.path().join("absent.txt")).is_empty());
        assert!(load_hierarchy(&dir.path().join("absent.json")).is_empty());
    }

    #[test]
    fn malformed_hierarchy_is_a_json_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(try_load_hierarchy(file.path()), Err(ResolveError::Json { .. })));
        assert!(load_hierarchy(file.path()).is_empty());
    }

    #[test]
    fn snapshot_round_trip_preserves_resolution() {
        let mut hierarchy = ContextualHierarchy::new();
        hierarchy.add_ward("Nghệ An", "Cửa Lò", "Nghi Hương");
        let resolver = AddressResolver::from_names(
            &["Nghệ An"],
            &["Cửa Lò"],
            &["Nghi Hương"],
            hierarchy,
            ResolverConfig::default(),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.bin");
        save_snapshot(&resolver, &path).unwrap();
        let restored = load_snapshot(&path).unwrap();

        let input = "P. Nghi Hương Thị xã Cửa Lò, Nghệ An";
        assert_eq!(restored.resolve(input), resolver.resolve(input));
        assert_eq!(restored.hierarchy.ward_count(), 1);
    }

    #[test]
    fn corrupt_snapshot_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff; 7]).unwrap();
        assert!(matches!(load_snapshot(file.path()), Err(ResolveError::Snapshot(_))));
    }
}
