//! Source discovery for TCC databases.
//!
//! One fixed system-wide database plus one candidate per entry in the users
//! directory. Missing files and accounts that fail to resolve are normal
//! branches (debug-logged, skipped); only failure to enumerate the users
//! directory itself is an error.

use std::path::PathBuf;

use nix::unistd::User;
use tracing::debug;

use crate::error::CollectError;
use crate::record::Origin;

/// Entry name under the users directory that is never a user account.
pub const SHARED_DIR_NAME: &str = "Shared";

/// Filesystem locations scanned for TCC databases. Constructor-time
/// configuration; tests point these at temp roots.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    /// Machine-wide database
    pub system_db: PathBuf,
    /// Directory whose subdirectories name local accounts
    pub users_dir: PathBuf,
    /// Database location relative to each account's home directory
    pub user_db_rel: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            system_db: PathBuf::from("/Library/Application Support/com.apple.TCC/TCC.db"),
            users_dir: PathBuf::from("/Users"),
            user_db_rel: PathBuf::from("Library/Application Support/com.apple.TCC/TCC.db"),
        }
    }
}

/// One candidate database to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: PathBuf,
    pub origin: Origin,
    /// Empty for the system source
    pub username: String,
}

/// Maps a users-directory entry name to an account home directory.
///
/// The production impl asks the OS; tests substitute a resolver rooted in a
/// temp directory so discovery is deterministic.
pub trait AccountResolver: Send + Sync {
    /// `None` when the name does not resolve to an account.
    fn home_dir(&self, name: &str) -> Option<PathBuf>;
}

/// Resolves accounts through the OS user database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccounts;

impl AccountResolver for SystemAccounts {
    fn home_dir(&self, name: &str) -> Option<PathBuf> {
        match User::from_name(name) {
            Ok(Some(user)) => Some(user.dir),
            Ok(None) => None,
            Err(err) => {
                debug!(account = name, error = %err, "account lookup failed");
                None
            }
        }
    }
}

/// Discovers candidate TCC database files.
pub struct Locator {
    paths: SourcePaths,
    resolver: Box<dyn AccountResolver>,
}

impl Locator {
    pub fn new(paths: SourcePaths, resolver: impl AccountResolver + 'static) -> Self {
        Self {
            paths,
            resolver: Box::new(resolver),
        }
    }

    /// Enumerate all readable-looking sources: the system database first (if
    /// present), then one per resolvable user account whose database file
    /// exists, sorted by account name for deterministic output.
    pub fn discover(&self) -> Result<Vec<Source>, CollectError> {
        let mut sources = Vec::new();

        if self.paths.system_db.is_file() {
            sources.push(Source {
                path: self.paths.system_db.clone(),
                origin: Origin::System,
                username: String::new(),
            });
        } else {
            debug!(path = %self.paths.system_db.display(), "system TCC database not present");
        }

        for name in self.user_entries()? {
            let Some(home) = self.resolver.home_dir(&name) else {
                debug!(account = %name, "no account for users-directory entry");
                continue;
            };
            let path = home.join(&self.paths.user_db_rel);
            if path.is_file() {
                sources.push(Source {
                    path,
                    origin: Origin::User,
                    username: name,
                });
            } else {
                debug!(account = %name, path = %path.display(), "user TCC database not present");
            }
        }

        Ok(sources)
    }

    /// Directory entries that can name accounts: immediate subdirectories,
    /// excluding the shared folder. Sorted by name.
    fn user_entries(&self) -> Result<Vec<String>, CollectError> {
        let users_dir = &self.paths.users_dir;
        let read_err = |err: std::io::Error| CollectError::UsersDir {
            path: users_dir.clone(),
            message: err.to_string(),
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(users_dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if !entry.file_type().map_err(read_err)?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!(path = %entry.path().display(), "skipping non-UTF-8 entry name");
                continue;
            };
            if name == SHARED_DIR_NAME {
                continue;
            }
            names.push(name);
        }
        names.sort_unstable();
        Ok(names)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    /// Resolver that treats every users-directory entry as an account homed
    /// directly under the given root.
    struct TempAccounts {
        root: PathBuf,
    }

    impl AccountResolver for TempAccounts {
        fn home_dir(&self, name: &str) -> Option<PathBuf> {
            let home = self.root.join(name);
            home.is_dir().then_some(home)
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn fixture_paths(root: &Path) -> SourcePaths {
        SourcePaths {
            system_db: root.join("system/TCC.db"),
            users_dir: root.join("Users"),
            user_db_rel: PathBuf::from("Library/Application Support/com.apple.TCC/TCC.db"),
        }
    }

    fn locator(root: &Path) -> Locator {
        Locator::new(
            fixture_paths(root),
            TempAccounts {
                root: root.join("Users"),
            },
        )
    }

    #[test]
    fn system_source_only_when_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Users")).unwrap();

        let sources = locator(dir.path()).discover().unwrap();
        assert!(sources.is_empty());

        touch(&dir.path().join("system/TCC.db"));
        let sources = locator(dir.path()).discover().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].origin, Origin::System);
        assert_eq!(sources[0].username, "");
    }

    #[test]
    fn users_sorted_system_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("system/TCC.db"));
        let rel = "Library/Application Support/com.apple.TCC/TCC.db";
        touch(&dir.path().join("Users/bob").join(rel));
        touch(&dir.path().join("Users/alice").join(rel));

        let sources = locator(dir.path()).discover().unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].origin, Origin::System);
        assert_eq!(sources[1].username, "alice");
        assert_eq!(sources[2].username, "bob");
    }

    #[test]
    fn shared_folder_never_a_source() {
        let dir = tempfile::tempdir().unwrap();
        let rel = "Library/Application Support/com.apple.TCC/TCC.db";
        touch(&dir.path().join("Users/Shared").join(rel));

        let sources = locator(dir.path()).discover().unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn non_directories_and_unresolvable_entries_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let users = dir.path().join("Users");
        fs::create_dir_all(&users).unwrap();
        fs::write(users.join("stray-file"), b"not a home").unwrap();
        // Directory exists but has no database file underneath.
        fs::create_dir_all(users.join("carol")).unwrap();

        let sources = locator(dir.path()).discover().unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn unreadable_users_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = locator(dir.path()).discover().unwrap_err();
        assert!(matches!(err, CollectError::UsersDir { .. }));
    }
}
