//! Catalog of selectable backgrounds.
//!
//! Entries keep a stable string id so a persisted selection survives
//! reordering; an id that no longer exists resolves to a fixed fallback.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::style::{BackgroundSpec, Color};

/// Id selected when nothing else is configured.
pub const DEFAULT_BACKGROUND_ID: &str = "gradient-sunset";

/// Id of the entry used when a selected id is unknown.
pub const FALLBACK_BACKGROUND_ID: &str = "solid-white";

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Broad category of a background entry, for grouping in a picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    Solid,
    Gradient,
    Image,
}

/// One selectable background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundEntry {
    /// Stable identifier (e.g. `gradient-ocean`, `asset-waves.png`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub spec: BackgroundSpec,
}

impl BackgroundEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, spec: BackgroundSpec) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            spec,
        }
    }

    pub fn kind(&self) -> BackgroundKind {
        match self.spec {
            BackgroundSpec::Solid { .. } => BackgroundKind::Solid,
            BackgroundSpec::Gradient { .. } => BackgroundKind::Gradient,
            BackgroundSpec::Image { .. } => BackgroundKind::Image,
        }
    }

    /// The entry every unknown id resolves to.
    pub fn fallback() -> Self {
        Self::new(
            FALLBACK_BACKGROUND_ID,
            "White",
            BackgroundSpec::Solid {
                color: Color::WHITE,
            },
        )
    }
}

/// Ordered list of backgrounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundCatalog {
    entries: Vec<BackgroundEntry>,
    fallback: BackgroundEntry,
}

impl BackgroundCatalog {
    /// Catalog with only the given entries.
    pub fn new(entries: Vec<BackgroundEntry>) -> Self {
        Self {
            entries,
            fallback: BackgroundEntry::fallback(),
        }
    }

    /// The built-in gradients and solids.
    pub fn builtin() -> Self {
        let gradient = |a: (f64, f64, f64), b: (f64, f64, f64)| BackgroundSpec::Gradient {
            colors: vec![Color::from_unit(a.0, a.1, a.2), Color::from_unit(b.0, b.1, b.2)],
        };

        Self::new(vec![
            BackgroundEntry::new(
                "gradient-sunset",
                "Sunset",
                gradient((0.98, 0.62, 0.45), (0.74, 0.35, 0.85)),
            ),
            BackgroundEntry::new(
                "gradient-ocean",
                "Ocean",
                gradient((0.28, 0.65, 0.96), (0.12, 0.24, 0.62)),
            ),
            BackgroundEntry::new(
                "gradient-forest",
                "Forest",
                gradient((0.29, 0.80, 0.62), (0.16, 0.40, 0.35)),
            ),
            BackgroundEntry::fallback(),
            BackgroundEntry::new(
                "solid-black",
                "Black",
                BackgroundSpec::Solid {
                    color: Color::BLACK,
                },
            ),
        ])
    }

    /// Built-in entries followed by every image found in `dir`.
    ///
    /// An unreadable directory only logs a warning.
    pub fn with_image_dir(dir: &Path) -> Self {
        let mut catalog = Self::builtin();
        catalog.add_image_dir(dir);
        catalog
    }

    /// Append image entries for `jpg`/`jpeg`/`png` files in `dir`, sorted by
    /// file name. Returns how many were added.
    pub fn add_image_dir(&mut self, dir: &Path) -> usize {
        let read = match std::fs::read_dir(dir) {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "Cannot read backgrounds directory"
                );
                return 0;
            }
        };

        let mut paths: Vec<_> = read
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut added = 0;
        for path in paths {
            let (Some(file_name), Some(stem)) = (
                path.file_name().and_then(|n| n.to_str()),
                path.file_stem().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            let id = format!("asset-{file_name}");
            if self.get(&id).is_some() {
                continue;
            }
            self.entries.push(BackgroundEntry::new(
                id,
                display_name(stem),
                BackgroundSpec::Image { path: path.clone() },
            ));
            added += 1;
        }
        tracing::debug!(dir = %dir.display(), added, "Loaded image backgrounds");
        added
    }

    pub fn entries(&self) -> &[BackgroundEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&BackgroundEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entry for `id`, or the fixed fallback entry when it is unknown.
    pub fn resolve(&self, id: &str) -> &BackgroundEntry {
        self.get(id).unwrap_or_else(|| {
            tracing::debug!(id, fallback = %self.fallback.id, "Unknown background id");
            &self.fallback
        })
    }

    /// Validate a persisted selection: the id itself when present, else the
    /// first entry, else the default id.
    pub fn initial_selection(&self, id: &str) -> String {
        if self.get(id).is_some() {
            return id.to_string();
        }
        self.entries
            .first()
            .map(|e| e.id.clone())
            .unwrap_or_else(|| DEFAULT_BACKGROUND_ID.to_string())
    }
}

impl Default for BackgroundCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// `deep-blue_waves` → `Deep Blue_waves`.
fn display_name(stem: &str) -> String {
    stem.replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
