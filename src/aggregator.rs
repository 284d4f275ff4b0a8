use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::models::{LicenseBucket, Report};

/// Display name of the bucket holding files with no detected license.
pub const NO_LICENSE_DISPLAY: &str = "NOASSERTION";

#[derive(Debug)]
struct Bucket {
    key: String,
    display_name: String,
    files: BTreeSet<PathBuf>,
}

/// Incremental identifier → files mapping.
///
/// Keys are trimmed and lower-cased; the display name is the first form seen.
/// Buckets keep first-encounter order. The empty key ("no license detected")
/// always exists and comes first.
#[derive(Debug)]
pub struct LicenseAssignment {
    index: HashMap<String, usize>,
    buckets: Vec<Bucket>,
}

impl Default for LicenseAssignment {
    fn default() -> Self {
        Self::new()
    }
}

impl LicenseAssignment {
    pub fn new() -> Self {
        let mut assignment = Self {
            index: HashMap::new(),
            buckets: Vec::new(),
        };
        assignment.bucket_mut("");
        assignment
    }

    pub fn record(&mut self, display_name: &str, path: &Path) {
        self.bucket_mut(display_name).files.insert(path.to_path_buf());
    }

    pub fn record_undetected(&mut self, path: &Path) {
        self.record("", path);
    }

    fn bucket_mut(&mut self, display_name: &str) -> &mut Bucket {
        let display_name = display_name.trim();
        let key = display_name.to_lowercase();
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.buckets.push(Bucket {
                    key: key.clone(),
                    display_name: display_name.to_string(),
                    files: BTreeSet::new(),
                });
                self.index.insert(key, self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[idx]
    }

    pub fn finalize(self) -> Report {
        let total_files = self
            .buckets
            .iter()
            .flat_map(|b| b.files.iter())
            .collect::<HashSet<_>>()
            .len();

        let buckets = self
            .buckets
            .into_iter()
            .map(|b| LicenseBucket {
                display_name: if b.key.is_empty() {
                    NO_LICENSE_DISPLAY.to_string()
                } else {
                    b.display_name
                },
                count: b.files.len(),
                id: b.key,
                files: b.files,
            })
            .collect();

        Report {
            total_files,
            buckets,
        }
    }
}
