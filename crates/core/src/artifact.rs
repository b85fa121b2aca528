// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendered artifacts and the archive that bundles them.

use crate::record::ResolvedRecord;
use crate::request::DocumentRequest;
use std::path::{Path, PathBuf};

/// Which renderer produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Page-oriented primary document.
    Document,
    /// Structured export of the same record.
    Export,
}

impl ArtifactKind {
    /// File extension used for this kind of artifact.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Document => "pdf",
            ArtifactKind::Export => "xml",
        }
    }
}

/// A rendered file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl Artifact {
    /// Artifact of `kind` at `base` plus the kind's extension.
    ///
    /// `base` is a path without extension, e.g. `/out/<request>/A_42_uuid`.
    pub fn at(kind: ArtifactKind, base: &Path) -> Self {
        let mut path = base.as_os_str().to_owned();
        path.push(".");
        path.push(kind.extension());
        Self {
            kind,
            path: PathBuf::from(path),
        }
    }
}

/// Packaged artifacts ready to stream to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    file_name: String,
    content: Vec<u8>,
}

impl Archive {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    /// Name the caller should save the archive under, e.g. `A_42_uuid.zip`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Raw archive bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Base name shared by every artifact of one request: `{series}_{folio}_{unique_id}`.
pub fn artifact_base_name(request: &DocumentRequest, record: &ResolvedRecord) -> String {
    format!("{}_{}_{}", request.series, request.folio, record.unique_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_joins_series_folio_and_unique_id() {
        let request = DocumentRequest {
            kind: "Invoice".to_string(),
            series: "A".to_string(),
            tax_id: "XYZ010101AAA".to_string(),
            folio: 42,
        };
        let record = ResolvedRecord {
            entry_id: 7,
            unique_id: "uuid-42".to_string(),
        };
        assert_eq!(artifact_base_name(&request, &record), "A_42_uuid-42");
    }

    #[test]
    fn artifact_path_appends_extension_without_replacing_dots() {
        let artifact = Artifact::at(ArtifactKind::Export, Path::new("/out/A_1_uuid.v2"));
        assert_eq!(artifact.path, PathBuf::from("/out/A_1_uuid.v2.xml"));
        assert_eq!(artifact.kind, ArtifactKind::Export);
    }

    #[test]
    fn extensions() {
        assert_eq!(ArtifactKind::Document.extension(), "pdf");
        assert_eq!(ArtifactKind::Export.extension(), "xml");
    }
}
