#![doc = include_str!("../readme.md")]

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// a resolved package, identified by its canonical purl.
///
/// no identity beyond the string; equality is string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Package(String);

impl Package {
    pub fn new(purl: impl Into<String>) -> Self {
        Package(purl.into())
    }

    pub fn purl(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// how a dependency relates to the analyzed project.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Direct,
    Indirect,
}

/// source file reference carried by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestFile {
    pub source_location: String,
}

/// named two-tier dependency collection for one analyzed document.
///
/// A purl lives in exactly one of the two sets. Direct wins the tie-break:
/// adding a purl as direct evicts it from the indirect set, and adding it as
/// indirect is a no-op while it is held as direct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    name: String,
    file: Option<ManifestFile>,
    direct: BTreeSet<Package>,
    indirect: BTreeSet<Package>,
}

impl Manifest {
    pub fn new(name: impl Into<String>) -> Self {
        Manifest {
            name: name.into(),
            file: None,
            direct: BTreeSet::new(),
            indirect: BTreeSet::new(),
        }
    }

    /// creates a manifest that records the file it was built from.
    pub fn with_file(name: impl Into<String>, source_location: impl Into<String>) -> Self {
        let mut manifest = Manifest::new(name);
        manifest.file = Some(ManifestFile {
            source_location: source_location.into(),
        });
        manifest
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> Option<&ManifestFile> {
        self.file.as_ref()
    }

    pub fn add_direct_dependency(&mut self, package: Package) {
        self.indirect.remove(&package);
        self.direct.insert(package);
    }

    pub fn add_indirect_dependency(&mut self, package: Package) {
        if !self.direct.contains(&package) {
            self.indirect.insert(package);
        }
    }

    /// inserts under the given relationship, preserving the direct-wins rule.
    pub fn add_dependency(&mut self, package: Package, relationship: Relationship) {
        match relationship {
            Relationship::Direct => self.add_direct_dependency(package),
            Relationship::Indirect => self.add_indirect_dependency(package),
        }
    }

    pub fn direct_dependencies(&self) -> &BTreeSet<Package> {
        &self.direct
    }

    pub fn indirect_dependencies(&self) -> &BTreeSet<Package> {
        &self.indirect
    }

    /// total number of resolved dependencies (the sets are disjoint).
    pub fn len(&self) -> usize {
        self.direct.len() + self.indirect.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.indirect.is_empty()
    }
}

#[derive(Serialize)]
struct ResolvedEntry<'a> {
    package_url: &'a str,
    relationship: Relationship,
}

impl Serialize for Manifest {
    /// wire shape: `{"name", "file": {"source_location"}, "resolved": {purl: entry}}`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut resolved: IndexMap<&str, ResolvedEntry<'_>> = IndexMap::new();
        for package in &self.direct {
            resolved.insert(
                package.purl(),
                ResolvedEntry {
                    package_url: package.purl(),
                    relationship: Relationship::Direct,
                },
            );
        }
        for package in &self.indirect {
            resolved.insert(
                package.purl(),
                ResolvedEntry {
                    package_url: package.purl(),
                    relationship: Relationship::Indirect,
                },
            );
        }

        let mut state = serializer.serialize_struct("Manifest", 3)?;
        state.serialize_field("name", &self.name)?;
        if let Some(file) = &self.file {
            state.serialize_field("file", file)?;
        }
        state.serialize_field("resolved", &resolved)?;
        state.end()
    }
}

/// identity of the tool that produced a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detector {
    pub name: String,
    pub version: String,
    pub url: String,
}

/// correlates a snapshot with the run that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: String,
    pub correlator: String,
}

/// top-level submission unit: run metadata plus one manifest per input file.
///
/// Manifests are keyed by their `source_location` (falling back to the
/// manifest name) and kept in insertion order, so output is reproducible for
/// a given input file order.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub version: u64,
    pub job: Job,
    pub sha: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub detector: Detector,
    pub scanned: DateTime<Utc>,
    manifests: IndexMap<String, Manifest>,
}

impl Snapshot {
    /// snapshot schema version accepted by the ingestion endpoint.
    pub const VERSION: u64 = 0;

    pub fn new(
        detector: Detector,
        job: Job,
        sha: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Snapshot {
            version: Self::VERSION,
            job,
            sha: sha.into(),
            git_ref: git_ref.into(),
            detector,
            scanned: Utc::now(),
            manifests: IndexMap::new(),
        }
    }

    pub fn add_manifest(&mut self, manifest: Manifest) {
        let key = manifest
            .file()
            .map(|f| f.source_location.clone())
            .unwrap_or_else(|| manifest.name().to_string());
        self.manifests.insert(key, manifest);
    }

    pub fn manifests(&self) -> &IndexMap<String, Manifest> {
        &self.manifests
    }
}
