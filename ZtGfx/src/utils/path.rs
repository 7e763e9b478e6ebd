//! Path utilities

use std::path::{Path, PathBuf};

/// Normalize path separators to forward slashes
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Convert a file name stored inside a container (written on Windows, so
/// possibly `\`-separated) into a host path.
pub fn stored_name_to_path(name: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(name)
    } else {
        PathBuf::from(normalize_path(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("objects\\fence\\fence.pal"), "objects/fence/fence.pal");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_stored_name_uses_host_separators() {
        assert_eq!(
            stored_name_to_path("objects\\fence\\fence.pal"),
            PathBuf::from("objects/fence/fence.pal")
        );
    }
}
