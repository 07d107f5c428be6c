//! Destination resolution for daily store files
//!
//! Maps each logical store role to the ordered set of physical paths it
//! must be written to "today": always exactly one primary path under the
//! data directory, plus at most one mirror on removable media when a
//! mount point is discovered. Resolution happens once at startup and once
//! per rotation; mount points are not polled continuously, so media
//! inserted mid-day is picked up at the next rotation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LoggerConfig;

/// Logical role of a daily store file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRole {
    /// Append-only raw CSV
    Raw,
    /// Derived workbook with the minute-average chart
    Aggregate,
}

impl StoreRole {
    /// File extension for this role
    pub fn extension(self) -> &'static str {
        match self {
            Self::Raw => "csv",
            Self::Aggregate => "xlsx",
        }
    }
}

/// Daily file name for a role: `<prefix>_<date>.<ext>`
pub fn daily_filename(prefix: &str, day: &str, role: StoreRole) -> String {
    format!("{}_{}.{}", prefix, day, role.extension())
}

/// Discovery of removable-media mount points
///
/// The resolver only needs "zero or one usable directory"; mounting and
/// unmounting are outside its responsibility.
pub trait MountProvider {
    /// Candidate mount directories, in no particular order
    fn candidate_mounts(&self) -> Vec<PathBuf>;
}

/// Scans removable-media roots for mounted directories
///
/// Each root is expected to hold per-user directories which in turn hold
/// the mounts (`/media/<user>/<label>`). Missing or unreadable roots
/// contribute no candidates; absence of media is not an error.
#[derive(Debug, Clone)]
pub struct MediaScan {
    roots: Vec<PathBuf>,
}

impl MediaScan {
    /// Create a scanner over the given roots
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl MountProvider for MediaScan {
    fn candidate_mounts(&self) -> Vec<PathBuf> {
        let mut mounts = Vec::new();
        for root in &self.roots {
            for user_dir in subdirectories(root) {
                mounts.extend(subdirectories(&user_dir));
            }
        }
        mounts
    }
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect()
}

/// Fixed mount list for tests
#[derive(Debug, Clone, Default)]
pub struct StaticMounts(
    /// The candidate mounts to report
    pub Vec<PathBuf>,
);

impl MountProvider for StaticMounts {
    fn candidate_mounts(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// The physical paths each store role is written to for one day
#[derive(Debug, Clone)]
pub struct DestinationSet {
    raw: Vec<PathBuf>,
    aggregate: Vec<PathBuf>,
}

impl DestinationSet {
    /// Resolve destinations for `day`
    ///
    /// When more than one mount candidate exists, the lexicographically
    /// first is chosen so the pick is deterministic; there are never more
    /// than two destinations per role. Paths are deduplicated in case the
    /// mirror resolves onto the data directory itself.
    pub fn resolve(config: &LoggerConfig, day: &str, mounts: &dyn MountProvider) -> Self {
        let mut candidates = mounts.candidate_mounts();
        candidates.sort();
        let mirror = candidates.into_iter().next();

        Self {
            raw: Self::role_paths(config, day, StoreRole::Raw, mirror.as_deref()),
            aggregate: Self::role_paths(config, day, StoreRole::Aggregate, mirror.as_deref()),
        }
    }

    fn role_paths(
        config: &LoggerConfig,
        day: &str,
        role: StoreRole,
        mirror: Option<&Path>,
    ) -> Vec<PathBuf> {
        let filename = daily_filename(&config.file_prefix, day, role);
        let mut paths = vec![config.data_dir.join(&filename)];
        if let Some(mount) = mirror {
            let mirrored = mount.join(&filename);
            if !paths.contains(&mirrored) {
                paths.push(mirrored);
            }
        }
        paths
    }

    /// All paths for a role, primary first
    pub fn paths(&self, role: StoreRole) -> &[PathBuf] {
        match role {
            StoreRole::Raw => &self.raw,
            StoreRole::Aggregate => &self.aggregate,
        }
    }

    /// The always-present primary path for a role
    pub fn primary(&self, role: StoreRole) -> &Path {
        &self.paths(role)[0]
    }

    /// Whether a removable mirror was resolved
    pub fn has_mirror(&self) -> bool {
        self.raw.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(data_dir: &Path) -> LoggerConfig {
        LoggerConfig {
            data_dir: data_dir.to_path_buf(),
            ..LoggerConfig::default()
        }
    }

    #[test]
    fn primary_only_without_media() {
        let config = config(Path::new("/var/log/presslog"));
        let dest = DestinationSet::resolve(&config, "2024-01-01", &StaticMounts::default());

        assert!(!dest.has_mirror());
        assert_eq!(
            dest.paths(StoreRole::Raw),
            &[PathBuf::from(
                "/var/log/presslog/pressure_readings_2024-01-01.csv"
            )]
        );
        assert_eq!(
            dest.primary(StoreRole::Aggregate),
            Path::new("/var/log/presslog/pressure_readings_2024-01-01.xlsx")
        );
    }

    #[test]
    fn single_mount_becomes_mirror() {
        let config = config(Path::new("/data"));
        let mounts = StaticMounts(vec![PathBuf::from("/media/pi/USB")]);
        let dest = DestinationSet::resolve(&config, "2024-01-01", &mounts);

        assert_eq!(dest.paths(StoreRole::Raw).len(), 2);
        assert_eq!(
            dest.paths(StoreRole::Raw)[1],
            PathBuf::from("/media/pi/USB/pressure_readings_2024-01-01.csv")
        );
    }

    #[test]
    fn ambiguous_mounts_pick_lexicographically_first() {
        let config = config(Path::new("/data"));
        let mounts = StaticMounts(vec![
            PathBuf::from("/media/pi/stick-b"),
            PathBuf::from("/media/pi/stick-a"),
        ]);
        let dest = DestinationSet::resolve(&config, "2024-01-01", &mounts);

        assert_eq!(dest.paths(StoreRole::Raw).len(), 2);
        assert_eq!(
            dest.paths(StoreRole::Raw)[1],
            PathBuf::from("/media/pi/stick-a/pressure_readings_2024-01-01.csv")
        );
    }

    #[test]
    fn mirror_onto_data_dir_deduplicates() {
        let config = config(Path::new("/data"));
        let mounts = StaticMounts(vec![PathBuf::from("/data")]);
        let dest = DestinationSet::resolve(&config, "2024-01-01", &mounts);

        assert!(!dest.has_mirror());
        assert_eq!(dest.paths(StoreRole::Aggregate).len(), 1);
    }

    #[test]
    fn media_scan_walks_user_directories() {
        let root = tempfile::tempdir().unwrap();
        let mount = root.path().join("pi").join("USB");
        std::fs::create_dir_all(&mount).unwrap();
        std::fs::write(root.path().join("pi").join("not-a-dir"), b"x").unwrap();

        let scan = MediaScan::new(vec![root.path().to_path_buf()]);
        assert_eq!(scan.candidate_mounts(), vec![mount]);
    }
}
