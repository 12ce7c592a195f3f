//! Change-aware directory mirroring
//!
//! [`mirror`] makes the destination tree an exact copy of the source tree,
//! deleting destination entries absent from the source. A non-mutating
//! comparison pass runs first; when it finds no differences the destination
//! is left untouched and the call reports no change. Callers use that flag
//! to avoid manufacturing version-control commits out of no-op runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::checksum::compute_file_checksum;
use crate::{Error, Result};

/// Entry kind observed during a tree walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
    Symlink,
}

/// Mirror `source` into `dest`.
///
/// Returns `true` iff `dest` was not already identical to `source`
/// (structure, file contents, symlink targets, unix permission bits).
/// After a successful call `dest` contains exactly the contents of
/// `source`; extraneous destination entries are removed.
///
/// # Errors
///
/// Any failure in either pass propagates; it is never treated as
/// "no change".
pub fn mirror(source: &Path, dest: &Path) -> Result<bool> {
    if !source.is_dir() {
        return Err(Error::NotADirectory {
            path: source.to_path_buf(),
        });
    }

    if trees_identical(source, dest)? {
        tracing::debug!(source = %source.display(), "mirror: trees identical, skipping");
        return Ok(false);
    }

    mirror_tree(source, dest)?;
    Ok(true)
}

/// Walk a tree and record each entry relative to `root`, keyed for
/// deterministic comparison. Symlinks are recorded, not followed.
fn snapshot(root: &Path) -> Result<BTreeMap<PathBuf, EntryKind>> {
    let mut entries = BTreeMap::new();

    for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(io) => Error::io(&path, io),
                None => Error::io(&path, std::io::Error::other("walk error")),
            }
        })?;

        let rel = entry
            .path()
            .strip_prefix(root)
            .expect("walkdir yields paths under its root")
            .to_path_buf();

        let kind = if entry.path_is_symlink() {
            EntryKind::Symlink
        } else if entry.file_type().is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };

        entries.insert(rel, kind);
    }

    Ok(entries)
}

/// Non-mutating comparison of two trees.
fn trees_identical(source: &Path, dest: &Path) -> Result<bool> {
    if !dest.is_dir() {
        return Ok(false);
    }

    let source_entries = snapshot(source)?;
    let dest_entries = snapshot(dest)?;

    if source_entries != dest_entries {
        return Ok(false);
    }

    for (rel, kind) in &source_entries {
        let src_path = source.join(rel);
        let dst_path = dest.join(rel);

        match kind {
            EntryKind::Dir => {
                if !permissions_match(&src_path, &dst_path)? {
                    return Ok(false);
                }
            }
            EntryKind::File => {
                if !permissions_match(&src_path, &dst_path)? {
                    return Ok(false);
                }
                let src_sum =
                    compute_file_checksum(&src_path).map_err(|e| Error::io(&src_path, e))?;
                let dst_sum =
                    compute_file_checksum(&dst_path).map_err(|e| Error::io(&dst_path, e))?;
                if src_sum != dst_sum {
                    return Ok(false);
                }
            }
            EntryKind::Symlink => {
                let src_target = fs::read_link(&src_path).map_err(|e| Error::io(&src_path, e))?;
                let dst_target = fs::read_link(&dst_path).map_err(|e| Error::io(&dst_path, e))?;
                if src_target != dst_target {
                    return Ok(false);
                }
            }
        }
    }

    Ok(true)
}

#[cfg(unix)]
fn permissions_match(a: &Path, b: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let meta_a = fs::symlink_metadata(a).map_err(|e| Error::io(a, e))?;
    let meta_b = fs::symlink_metadata(b).map_err(|e| Error::io(b, e))?;
    Ok(meta_a.permissions().mode() == meta_b.permissions().mode())
}

#[cfg(not(unix))]
fn permissions_match(_a: &Path, _b: &Path) -> Result<bool> {
    Ok(true)
}

/// Mutating mirror pass: copy everything from `source`, then delete
/// destination entries with no source counterpart.
fn mirror_tree(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    let source_entries = snapshot(source)?;

    // Pre-order copy: parents before children.
    for (rel, kind) in &source_entries {
        let src_path = source.join(rel);
        let dst_path = dest.join(rel);

        match kind {
            EntryKind::Dir => {
                remove_if_kind_differs(&dst_path, EntryKind::Dir)?;
                fs::create_dir_all(&dst_path).map_err(|e| Error::io(&dst_path, e))?;
                copy_permissions(&src_path, &dst_path)?;
            }
            EntryKind::File => {
                remove_if_kind_differs(&dst_path, EntryKind::File)?;
                fs::copy(&src_path, &dst_path).map_err(|e| Error::io(&dst_path, e))?;
            }
            EntryKind::Symlink => {
                remove_existing(&dst_path)?;
                let target = fs::read_link(&src_path).map_err(|e| Error::io(&src_path, e))?;
                create_symlink(&target, &dst_path)?;
            }
        }
    }

    // Delete extraneous destination entries, children before parents.
    let dest_entries = snapshot(dest)?;
    for (rel, kind) in dest_entries.iter().rev() {
        if source_entries.contains_key(rel) {
            continue;
        }
        let dst_path = dest.join(rel);
        // A parent directory removal may already have taken descendants.
        if fs::symlink_metadata(&dst_path).is_err() {
            continue;
        }
        match kind {
            EntryKind::Dir => {
                fs::remove_dir_all(&dst_path).map_err(|e| Error::io(&dst_path, e))?;
            }
            EntryKind::File | EntryKind::Symlink => {
                fs::remove_file(&dst_path).map_err(|e| Error::io(&dst_path, e))?;
            }
        }
    }

    Ok(())
}

/// Remove a destination entry whose kind no longer matches the source.
fn remove_if_kind_differs(path: &Path, expected: EntryKind) -> Result<()> {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return Ok(());
    };

    let actual = if meta.file_type().is_symlink() {
        EntryKind::Symlink
    } else if meta.is_dir() {
        EntryKind::Dir
    } else {
        EntryKind::File
    };

    if actual != expected {
        remove_existing(path)?;
    }
    Ok(())
}

/// Remove whatever entry exists at `path`, if anything.
fn remove_existing(path: &Path) -> Result<()> {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return Ok(());
    };

    if meta.is_dir() && !meta.file_type().is_symlink() {
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
    } else {
        fs::remove_file(path).map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}

#[cfg(unix)]
fn copy_permissions(source: &Path, dest: &Path) -> Result<()> {
    let meta = fs::metadata(source).map_err(|e| Error::io(source, e))?;
    fs::set_permissions(dest, meta.permissions()).map_err(|e| Error::io(dest, e))
}

#[cfg(not(unix))]
fn copy_permissions(_source: &Path, _dest: &Path) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::io(link, e))
}

#[cfg(not(unix))]
fn create_symlink(_target: &Path, link: &Path) -> Result<()> {
    Err(Error::io(
        link,
        std::io::Error::other("symlink mirroring is not supported on this platform"),
    ))
}
