//! RF2 file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{Rf2Files, SnomedError, SnomedResult};

/// Release flavours, in order of preference. A Full release carries every
/// historical version; a Snapshot carries only the latest one per id.
const FLAVOURS: [&str; 2] = ["Full", "Snapshot"];

/// Discovers the concept, description and relationship files of a release.
///
/// `path` may be the `Terminology` directory itself, a release root that
/// contains `Full/Terminology` or `Snapshot/Terminology`, or a directory one
/// level above such a root. Full files are preferred over Snapshot files.
/// Stated relationship files are ignored.
pub fn discover_rf2_files<P: AsRef<Path>>(path: P) -> SnomedResult<Rf2Files> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SnomedError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let terminology_dir = find_terminology_dir(path)?;
    debug!(directory = %terminology_dir.display(), "scanning terminology directory");

    let mut files = Rf2Files::new();
    let mut ranks = [usize::MAX; 3];

    for entry in fs::read_dir(&terminology_dir)? {
        let entry = entry?;
        let filename = entry.file_name();
        let filename_str = filename.to_string_lossy();

        if !filename_str.ends_with(".txt") {
            continue;
        }

        let (slot, prefix) = if filename_str.starts_with("sct2_Concept_") {
            (0, "sct2_Concept_")
        } else if filename_str.starts_with("sct2_Description_") {
            (1, "sct2_Description_")
        } else if filename_str.starts_with("sct2_Relationship_") {
            (2, "sct2_Relationship_")
        } else {
            continue;
        };

        let Some(rank) = flavour_rank(&filename_str[prefix.len()..]) else {
            continue;
        };
        if rank >= ranks[slot] {
            continue;
        }
        ranks[slot] = rank;

        let target = match slot {
            0 => {
                files.release_date = extract_release_date(&filename_str);
                &mut files.concept_file
            }
            1 => &mut files.description_file,
            _ => &mut files.relationship_file,
        };
        *target = Some(entry.path());
    }

    if !files.has_required_files() {
        let missing = files.missing_files();
        return Err(SnomedError::RequiredFileMissing {
            file_type: missing.join(", "),
            directory: terminology_dir.display().to_string(),
        });
    }

    Ok(files)
}

fn flavour_rank(rest: &str) -> Option<usize> {
    FLAVOURS.iter().position(|flavour| rest.starts_with(flavour))
}

/// Finds the Terminology directory within an RF2 release structure.
fn find_terminology_dir(base: &Path) -> SnomedResult<PathBuf> {
    if base.ends_with("Terminology") && base.is_dir() {
        return Ok(base.to_path_buf());
    }

    if let Some(dir) = terminology_under(base) {
        return Ok(dir);
    }

    // Search one level deep for a directory containing the structure
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.path());
        }
    }
    subdirs.sort();

    subdirs
        .iter()
        .find_map(|subdir| terminology_under(subdir))
        .ok_or_else(|| SnomedError::DirectoryNotFound {
            path: format!("Terminology directory not found in {}", base.display()),
        })
}

fn terminology_under(dir: &Path) -> Option<PathBuf> {
    FLAVOURS
        .iter()
        .map(|flavour| dir.join(flavour).join("Terminology"))
        .chain(std::iter::once(dir.join("Terminology")))
        .find(|candidate| candidate.is_dir())
}

/// Extracts release date from RF2 filename.
///
/// RF2 files have names like `sct2_Concept_Full_INT_20160731.txt`
fn extract_release_date(filename: &str) -> Option<String> {
    let without_ext = filename.trim_end_matches(".txt");
    let last = without_ext.rsplit('_').next()?;

    if last.len() == 8 && last.chars().all(|c| c.is_ascii_digit()) {
        Some(last.to_string())
    } else {
        None
    }
}
