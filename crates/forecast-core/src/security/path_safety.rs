//! Path containment check.
//!
//! Both paths are made absolute against the working directory and then walked
//! one component at a time. While the walk stays on existing entries each step
//! is canonicalized, so a symlink is followed before any `..` after it is
//! applied, matching how the kernel resolves the same path. Once a component
//! does not exist the remainder is folded lexically. Only a candidate strictly
//! below the base is safe. Every failure answers `false`.

use std::path::{Component, Path, PathBuf};

/// Whether `candidate` resolves strictly inside `base_dir`.
///
/// Empty paths, paths with NUL bytes, and paths that fail to resolve are
/// never safe. Never panics and never returns an error.
pub fn is_path_safe(base_dir: impl AsRef<Path>, candidate: impl AsRef<Path>) -> bool {
    resolve_within(base_dir, candidate).is_some()
}

/// The fully resolved form of `candidate` if it lies strictly inside
/// `base_dir`. File operations should act on this path, not on the raw input.
pub fn resolve_within(base_dir: impl AsRef<Path>, candidate: impl AsRef<Path>) -> Option<PathBuf> {
    let base = resolve(base_dir.as_ref())?;
    let target = resolve(candidate.as_ref())?;
    (target != base && target.starts_with(&base)).then_some(target)
}

fn resolve(path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() || path.as_os_str().to_string_lossy().contains('\0') {
        return None;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };

    let mut out = PathBuf::new();
    let mut on_disk = true;
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            // `out` holds no symlinks while on disk, so its parent is the real parent.
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => {
                out.push(part);
                if on_disk {
                    match out.canonicalize() {
                        Ok(real) => out = real,
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => on_disk = false,
                        Err(_) => return None,
                    }
                }
            }
        }
    }
    Some(out)
}
