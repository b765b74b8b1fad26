#![doc = include_str!("../readme.md")]

use depgraph_model::{Manifest, Package, Relationship};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// SPDX id of the synthetic root package. Edges originating here describe the
/// project's own direct dependencies and do not make a package transitive.
pub const ROOT_PACKAGE_ID: &str = "SPDXRef-RootPackage";

const DEPENDS_ON: &str = "DEPENDS_ON";

/// Errors that can occur when reading SPDX documents.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not valid JSON or its top level is not an object.
    #[error("SPDX parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// An I/O error occurred while reading the input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One parsed SPDX document.
///
/// Deliberately loose: apart from the top level being a JSON object, every
/// field may be absent. Absent `packages`/`relationships` behave as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub packages: Vec<SpdxPackage>,
    #[serde(default)]
    pub relationships: Vec<SpdxRelationship>,
}

/// One SBOM package entry. Identifier fields may be absent, malformed, or
/// inconsistently encoded; purl resolution absorbs all of that.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxPackage {
    #[serde(rename = "SPDXID", default)]
    pub spdx_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub package_version: Option<String>,
    /// native purl field, SPDX 2.3 and later.
    #[serde(default)]
    pub purl: Option<String>,
    #[serde(default)]
    pub external_refs: Vec<ExternalRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRef {
    #[serde(default)]
    pub reference_category: String,
    #[serde(default)]
    pub reference_type: String,
    #[serde(default)]
    pub reference_locator: String,
}

/// One relationship edge. Duplicate or contradictory edges are tolerated;
/// classification only needs existence of a matching edge.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxRelationship {
    #[serde(default)]
    pub spdx_element_id: String,
    #[serde(default)]
    pub related_spdx_element: String,
    #[serde(default)]
    pub relationship_type: String,
}

/// Selects one canonical purl for a package. Never fails.
///
/// Precedence: the native `purl` field (when present and non-empty), then the
/// first `PACKAGE-MANAGER`/`purl` external reference, then a synthesized
/// `pkg:generic/<name>@<version>` (empty version segment when the package
/// carries no version). The winner is passed through [`fix_purl_encoding`].
pub fn resolve_purl(package: &SpdxPackage) -> String {
    let candidate = package
        .purl
        .as_deref()
        .filter(|purl| !purl.is_empty())
        .map(str::to_owned)
        .or_else(|| {
            package
                .external_refs
                .iter()
                .find(|r| r.reference_category == "PACKAGE-MANAGER" && r.reference_type == "purl")
                .map(|r| r.reference_locator.clone())
        })
        .unwrap_or_else(|| {
            format!(
                "pkg:generic/{}@{}",
                package.name,
                package.package_version.as_deref().unwrap_or_default()
            )
        });

    fix_purl_encoding(candidate)
}

/// Repairs the `@`/`%40` escaping mix-ups some SBOM generators emit, yielding
/// one canonical form: npm scope separator `%40`, version separator `@`.
pub fn fix_purl_encoding(purl: String) -> String {
    let mut purl = purl;

    // scoped npm purl whose scope separator survived unescaped: escape only
    // that first `@`.
    if let Some(rest) = purl.strip_prefix("pkg:npm/@") {
        purl = format!("pkg:npm/%40{rest}");
    }

    // no `@` left anywhere: reinterpret the last `%40` as the version
    // separator. A string that still holds an `@` needs no inference.
    if !purl.contains('@') {
        if let Some(idx) = purl.rfind("%40") {
            if idx > 0 {
                purl.replace_range(idx..idx + 3, "@");
            }
        }
    }

    purl
}

/// Classifies a package as a direct or indirect dependency of the root.
///
/// Indirect iff at least one `DEPENDS_ON` edge targets the package from a
/// non-root element. This inspects single edges only, not a transitive
/// closure: a package that is both a root dependency and depended upon by
/// another package comes out Indirect.
pub fn classify(package: &SpdxPackage, relationships: &[SpdxRelationship]) -> Relationship {
    let has_non_root_dependent = relationships.iter().any(|rel| {
        rel.related_spdx_element == package.spdx_id
            && rel.relationship_type == DEPENDS_ON
            && rel.spdx_element_id != ROOT_PACKAGE_ID
    });

    if has_non_root_dependent {
        Relationship::Indirect
    } else {
        Relationship::Direct
    }
}

/// Builds one manifest from a parsed document.
///
/// The manifest is named after the document, falling back to `source` when
/// the document carries no name; `source` also becomes the manifest's file
/// location. Every package yields exactly one classification and one set
/// insertion (duplicate purls collapse under set semantics).
pub fn build_manifest(document: &SpdxDocument, source: &str) -> Manifest {
    let name = document.name.as_deref().unwrap_or(source);
    let mut manifest = Manifest::with_file(name, source);

    for package in &document.packages {
        let purl = resolve_purl(package);
        let relationship = classify(package, &document.relationships);
        manifest.add_dependency(Package::new(purl), relationship);
    }

    manifest
}

/// Reader turning SPDX JSON inputs into manifests.
pub struct ManifestReader;

impl ManifestReader {
    /// Parses one SPDX JSON document and builds its manifest.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use depgraph_spdx::ManifestReader;
    /// use std::fs::File;
    ///
    /// let file = File::open("app.spdx.json").unwrap();
    /// let manifest = ManifestReader::read_json(file, "app.spdx.json").unwrap();
    /// ```
    pub fn read_json<R: Read>(reader: R, source: &str) -> Result<Manifest, Error> {
        let document: SpdxDocument = serde_json::from_reader(reader)?;
        Ok(build_manifest(&document, source))
    }

    /// Reads an ordered list of files into an ordered list of manifests.
    ///
    /// Fail-fast: the first I/O or parse error aborts the whole batch, and no
    /// manifests are returned for any file.
    pub fn read_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Manifest>, Error> {
        let mut manifests = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let file = File::open(path)?;
            manifests.push(Self::read_json(file, &path.display().to_string())?);
        }
        Ok(manifests)
    }
}
