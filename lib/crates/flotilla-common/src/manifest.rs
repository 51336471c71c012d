use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transfer direction of a document, seen from the orchestrator's side.
///
/// Wire names are part of the manifest schema and never change, even though
/// the Rust variants follow normal casing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    /// Staged into the object store by the orchestrator; instances pull it
    /// before running any command.
    #[serde(rename = "LocalToAWS")]
    LocalToAws,
    /// Produced on an instance; pushed back to the object store after the
    /// last command finishes.
    #[serde(rename = "AWSToLocal")]
    AwsToLocal,
    /// Already present in the object store; pulled like `LocalToAws` but
    /// never pushed back.
    #[serde(rename = "Static")]
    Static,
}

impl Direction {
    /// Whether an instance pulls this document during its download phase.
    #[must_use]
    pub fn is_downloaded(self) -> bool {
        matches!(self, Direction::LocalToAws | Direction::Static)
    }

    /// Whether an instance pushes this document during its upload phase.
    #[must_use]
    pub fn is_uploaded(self) -> bool {
        matches!(self, Direction::AwsToLocal)
    }
}

/// One external command: a program and its literal argument vector.
///
/// Commands run without a shell; arguments are passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Single-line rendering for logs and error messages.
    #[must_use]
    pub fn display_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// A named artifact with the path it occupies on an instance and the
/// direction it travels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSpec {
    /// Unique name, also the basis of the artifact's object-store key.
    pub name: String,
    /// Where the document lives on the instance (file or directory).
    pub local_path: PathBuf,
    pub direction: Direction,
}

/// The unit of work assigned to a single instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub instance_id: u32,
    /// Names resolved against [`Manifest::documents`].
    #[serde(default)]
    pub required_documents: Vec<String>,
    /// Run in order; the first failure aborts the job.
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

/// Declarative description of one fleet run: every job, every document,
/// and the object-store namespace they share.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Object-store prefix under which all keys for this run are built.
    pub key_prefix: String,
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub documents: Vec<DocumentSpec>,
}

/// Failures while parsing, validating, or querying a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate document name '{name}' in manifest")]
    DuplicateDocument { name: String },

    #[error("duplicate instance id {instance_id} in manifest")]
    DuplicateJob { instance_id: u32 },

    #[error("job {instance_id} requires unknown document '{name}'")]
    UnresolvedRequirement { instance_id: u32, name: String },

    #[error("no job with instance id {instance_id} in manifest")]
    UnknownJob { instance_id: u32 },

    #[error("document name '{name}' matched {matches} descriptors, expected exactly one")]
    DocumentLookup { name: String, matches: usize },
}

impl Manifest {
    /// Parse a manifest from raw JSON bytes and validate its internal
    /// references.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for malformed JSON, or any of the
    /// validation errors from [`Manifest::validate`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_slice(bytes)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check internal consistency: unique document names, unique instance
    /// ids, and every job requirement resolvable.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut names = HashSet::new();
        for doc in &self.documents {
            if !names.insert(doc.name.as_str()) {
                return Err(ManifestError::DuplicateDocument {
                    name: doc.name.clone(),
                });
            }
        }

        let mut ids = HashSet::new();
        for job in &self.jobs {
            if !ids.insert(job.instance_id) {
                return Err(ManifestError::DuplicateJob {
                    instance_id: job.instance_id,
                });
            }
            for name in &job.required_documents {
                if !names.contains(name.as_str()) {
                    return Err(ManifestError::UnresolvedRequirement {
                        instance_id: job.instance_id,
                        name: name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Look up the job assigned to `instance_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnknownJob`] when no job carries that id.
    pub fn job(&self, instance_id: u32) -> Result<&Job, ManifestError> {
        self.jobs
            .iter()
            .find(|job| job.instance_id == instance_id)
            .ok_or(ManifestError::UnknownJob { instance_id })
    }

    /// Look up a document by name, requiring exactly one match.
    ///
    /// Zero matches and multiple matches are both reported as
    /// [`ManifestError::DocumentLookup`] with the observed count; a silent
    /// pick among duplicates would hide a corrupted manifest.
    pub fn document(&self, name: &str) -> Result<&DocumentSpec, ManifestError> {
        let matches: Vec<&DocumentSpec> = self
            .documents
            .iter()
            .filter(|doc| doc.name == name)
            .collect();
        match matches.as_slice() {
            [doc] => Ok(doc),
            _ => Err(ManifestError::DocumentLookup {
                name: name.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// Resolve every document a job requires, in the job's declared order.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::DocumentLookup`] for any unresolvable name.
    pub fn documents_for(&self, job: &Job) -> Result<Vec<&DocumentSpec>, ManifestError> {
        job.required_documents
            .iter()
            .map(|name| self.document(name))
            .collect()
    }
}
