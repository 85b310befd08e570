//! Named collection of map documents.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use tactics_grid_core::MapError;
use tactics_grid_world::{MapLayout, MapSource};
use tracing::debug;

use crate::document::MapDocument;

const DOCUMENT_EXTENSION: &str = "toml";

/// Map documents keyed by their name.
#[derive(Clone, Debug, Default)]
pub struct MapCatalog {
    documents: BTreeMap<String, MapDocument>,
}

impl MapCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document, replacing any previous document of the same name.
    pub fn insert(&mut self, document: MapDocument) -> Option<MapDocument> {
        self.documents.insert(document.name.clone(), document)
    }

    /// Loads every `*.toml` document found directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Fails when the directory or a document cannot be read or parsed, or
    /// when two documents share a name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir)
            .with_context(|| format!("failed to read map directory {}", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to list map directory {}", dir.display()))?
                .path();
            let is_document = path
                .extension()
                .is_some_and(|extension| extension == DOCUMENT_EXTENSION);
            if is_document && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read map document at {}", path.display()))?;
            let document = MapDocument::from_toml(&contents)
                .with_context(|| format!("invalid map document at {}", path.display()))?;
            let name = document.name.clone();
            if catalog.insert(document).is_some() {
                bail!("duplicate map name `{name}` in {}", dir.display());
            }
            debug!(map = %name, path = %path.display(), "map_document_loaded");
        }
        Ok(catalog)
    }

    /// Document registered under `name`, if any.
    #[must_use]
    pub fn document(&self, name: &str) -> Option<&MapDocument> {
        self.documents.get(name)
    }

    /// Registered map names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Number of registered documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Reports whether the catalog holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl MapSource for MapCatalog {
    fn resolve(&self, name: &str) -> Result<MapLayout, MapError> {
        self.document(name)
            .ok_or_else(|| MapError::NotFound {
                name: name.to_owned(),
            })?
            .to_layout()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tactics_grid_world::Topology;

    fn document(name: &str, layout: &str) -> MapDocument {
        MapDocument {
            name: name.to_owned(),
            topology: Topology::Orthogonal.name().to_owned(),
            layout: layout.to_owned(),
            actors: Vec::new(),
        }
    }

    #[test]
    fn unknown_names_are_not_found() {
        let catalog = MapCatalog::new();

        assert_eq!(
            catalog.resolve("missing"),
            Err(MapError::NotFound {
                name: "missing".to_owned()
            })
        );
    }

    #[test]
    fn resolve_converts_the_registered_layout() {
        let mut catalog = MapCatalog::new();
        assert!(catalog.insert(document("strip", "..#")).is_none());

        let layout = catalog.resolve("strip").expect("strip resolves");
        assert_eq!(layout.tiles.len(), 3);
    }

    #[test]
    fn insert_replaces_documents_by_name() {
        let mut catalog = MapCatalog::new();
        assert!(catalog.insert(document("strip", "..")).is_none());

        let previous = catalog.insert(document("strip", "..."));
        assert_eq!(previous.map(|doc| doc.layout), Some("..".to_owned()));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn from_dir_reads_toml_documents_only() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join("b.toml"),
            "name = \"bravo\"\nlayout = \"..\"\n",
        )
        .expect("write bravo");
        fs::write(
            dir.path().join("a.toml"),
            "name = \"alpha\"\nlayout = \".#\"\n",
        )
        .expect("write alpha");
        fs::write(dir.path().join("notes.txt"), "not a map").expect("write notes");

        let catalog = MapCatalog::from_dir(dir.path()).expect("catalog loads");

        assert_eq!(catalog.names().collect::<Vec<_>>(), ["alpha", "bravo"]);
    }

    #[test]
    fn from_dir_rejects_duplicate_names() {
        let dir = tempfile::tempdir().expect("temp dir");
        for file in ["one.toml", "two.toml"] {
            fs::write(dir.path().join(file), "name = \"same\"\nlayout = \".\"\n")
                .expect("write document");
        }

        let error = MapCatalog::from_dir(dir.path()).expect_err("duplicate rejected");
        assert!(error.to_string().contains("duplicate map name `same`"));
    }

    #[test]
    fn from_dir_reports_unparsable_documents() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("broken.toml"), "name = ").expect("write document");

        assert!(MapCatalog::from_dir(dir.path()).is_err());
    }
}
