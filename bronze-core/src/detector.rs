//! Ecosystem detection from workspace marker files.

use std::path::Path;

use log::{debug, warn};
use tokei::LanguageType;

use crate::domain::{Ecosystem, EcosystemSet};
use crate::fs::FileSystem;

struct Marker {
    ecosystem: Ecosystem,
    manifest: &'static str,
    languages: &'static [LanguageType],
}

const MARKERS: &[Marker] = &[
    Marker {
        ecosystem: Ecosystem::Python,
        manifest: "pyproject.toml",
        languages: &[LanguageType::Python],
    },
    Marker {
        ecosystem: Ecosystem::Cpp,
        manifest: "CMakeLists.txt",
        languages: &[
            LanguageType::C,
            LanguageType::CHeader,
            LanguageType::Cpp,
            LanguageType::CppHeader,
        ],
    },
    Marker {
        ecosystem: Ecosystem::Dart,
        manifest: "pubspec.yaml",
        languages: &[],
    },
    Marker {
        ecosystem: Ecosystem::JavaScript,
        manifest: "package.json",
        languages: &[],
    },
];

/// Detects ecosystems by probing the workspace root for manifests and
/// source-file extensions.
pub struct EcosystemDetector<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> EcosystemDetector<F> {
    /// Create a detector over `fs`.
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Detect the ecosystems present in `root`.
    ///
    /// Only the root itself is inspected. An unreadable root yields the
    /// empty set.
    pub fn detect(&self, root: &Path) -> EcosystemSet {
        let files = match self.fs.list_files(root) {
            Ok(files) => files,
            Err(err) => {
                warn!(
                    "cannot read workspace {}: {err}; assuming no ecosystems",
                    root.display()
                );
                return EcosystemSet::new();
            }
        };

        let languages: Vec<LanguageType> = files
            .iter()
            .filter_map(|path| language_of(path))
            .collect();

        let mut detected = EcosystemSet::new();
        for marker in MARKERS {
            let by_manifest = self.fs.is_file(&root.join(marker.manifest));
            let by_extension = languages
                .iter()
                .any(|language| marker.languages.contains(language));
            if by_manifest || by_extension {
                debug!(
                    "detected {} (manifest: {by_manifest}, sources: {by_extension})",
                    marker.ecosystem
                );
                detected.insert(marker.ecosystem);
            }
        }
        detected
    }
}

/// Classify by extension alone. Files without one are never opened, so a
/// shebang line does not count as a source file.
fn language_of(path: &Path) -> Option<LanguageType> {
    let extension = path.extension()?.to_str()?;
    LanguageType::from_file_extension(extension)
}
