use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Sleipnir";
const APPLICATION: &str = "Sleipnir";
const CONFIG_FILE: &str = "sleipnir.toml";

/// `<config_dir>/sleipnir/sleipnir.toml` for the current user, if a home is known.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Picks the configuration file to load.
///
/// An explicit path (flag or `SLEIPNIR_CONFIG`) always wins and must exist;
/// the per-user default is only used when present.
pub fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    default_config_path().filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_even_when_missing() {
        let explicit = Path::new("/definitely/not/here.toml");
        assert_eq!(locate_config(Some(explicit)), Some(explicit.to_path_buf()));
    }

    #[test]
    fn default_path_ends_with_config_file() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(CONFIG_FILE));
        }
    }
}
