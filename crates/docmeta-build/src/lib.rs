//! docmeta-build: Build pipeline for documentation metamodels
//!
//! This crate drives one documentation build end to end:
//! - Loading a JSON source index into an entity model
//! - Parsing every raw comment in parallel
//! - Resolving, mapping and classifying members into a document
//! - Writing the document as XML or JSON along with a warnings report
//!
//! This crate is designed to be used by various interfaces (CLI, IDE
//! integrations, build plugins).

pub mod index;

pub use index::{MemberRecord, MemberShape, ParameterRecord, SourceIndex, TypeNameRecord, TypeRecord};

use doc_tags::{TagSet, Warnings, parse_at};
use docmeta_core::{
    Conventions, ConverterOptions, EntityModel, Generated, Generator, HiddenMembers, ModelError,
    TypeMappingCache,
};
use docmeta_tree::{Document, WriteError, WriterOptions, document_to_json, document_to_xml};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Errors that can occur during a build
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid source index {file}: {source}")]
    Index {
        file: PathBuf,
        source: serde_json::Error,
    },

    #[error("Source index not found: {0}")]
    IndexNotFound(PathBuf),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("Build cancelled")]
    Cancelled,
}

/// Result type for build operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Options for one build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Categories to emit, in this order (None = every category present)
    pub categories: Option<Vec<String>>,
    /// Emit deprecated types and members (default: true)
    pub include_deprecated: bool,
    /// Map types by short name or public name (default: true)
    pub partial_type_match: bool,
    /// Map undocumented types onto documented subtypes (default: true)
    pub infer_undocumented_types: bool,
    /// Forget discovered type mappings at the start of the build (default: true)
    pub reset_type_cache: bool,
    /// Members to hide, as `Type#officialName`
    pub hidden_members: Vec<String>,
    /// Number of parallel parse jobs (None = use all CPUs)
    pub parallel_jobs: Option<usize>,
    pub conventions: Conventions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            categories: None,
            include_deprecated: true,
            partial_type_match: true,
            infer_undocumented_types: true,
            reset_type_cache: true,
            hidden_members: Vec::new(),
            parallel_jobs: None,
            conventions: Conventions::default(),
        }
    }
}

impl BuildOptions {
    fn converter_options(&self) -> ConverterOptions {
        ConverterOptions {
            categories: self.categories.clone(),
            include_deprecated: self.include_deprecated,
            partial_type_match: self.partial_type_match,
            infer_undocumented_types: self.infer_undocumented_types,
        }
    }
}

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

/// Result of a build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub document: Document,
    pub warnings: Warnings,
}

impl BuildOutput {
    /// Serialize the document
    pub fn render(&self, format: OutputFormat, writer: &WriterOptions) -> Result<String> {
        let rendered = match format {
            OutputFormat::Xml => document_to_xml(&self.document, writer)?,
            OutputFormat::Json => document_to_json(&self.document)?,
        };
        Ok(rendered)
    }

    /// Serialize the document into a file, creating parent directories
    pub fn write_to(&self, path: &Path, format: OutputFormat, writer: &WriterOptions) -> Result<()> {
        let rendered = self.render(format, writer)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, rendered)?;
        Ok(())
    }

    /// One line per warning
    pub fn warnings_report(&self) -> String {
        self.warnings.report()
    }
}

/// Read a source index from a JSON file
pub fn load_index(path: &Path) -> Result<SourceIndex> {
    if !path.is_file() {
        return Err(BuildError::IndexNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    SourceIndex::from_json(&content).map_err(|source| BuildError::Index {
        file: path.to_path_buf(),
        source,
    })
}

/// Runs builds and owns the state kept between them
///
/// The type mapping cache outlives a single build; whether discovered
/// mappings survive into the next build is decided by
/// [`BuildOptions::reset_type_cache`].
///
/// # Example
///
/// ```
/// use docmeta_build::{BuildOptions, Builder, SourceIndex};
///
/// let index = SourceIndex::from_json(
///     r#"{"types": [{"qualifiedName": "a.Pen", "category": "tools", "members": [
///         {"kind": "method", "name": "jsFunction_write", "comment": "Writes."}
///     ]}]}"#,
/// )
/// .unwrap();
///
/// let output = Builder::new(BuildOptions::default()).build(index).unwrap();
/// let pen = output.document.types().next().unwrap();
/// assert_eq!(pen.members().next().unwrap().name, "write");
/// ```
pub struct Builder {
    options: BuildOptions,
    tags: TagSet,
    cache: TypeMappingCache,
    cancel: Arc<AtomicBool>,
}

impl Builder {
    pub fn new(options: BuildOptions) -> Self {
        if let Some(n) = options.parallel_jobs {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build_global()
                .ok();
        }
        Self {
            options,
            tags: TagSet::default(),
            cache: TypeMappingCache::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_cache(mut self, cache: TypeMappingCache) -> Self {
        self.cache = cache;
        self
    }

    /// Setting the flag stops a running build between member resolutions
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cache(&self) -> &TypeMappingCache {
        &self.cache
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a document from a source index
    pub fn build(&mut self, index: SourceIndex) -> Result<BuildOutput> {
        if self.options.reset_type_cache {
            self.cache.reset();
        }

        let mut model = index.into_model(&self.options.conventions)?;
        debug!(types = model.len(), "model loaded");

        parse_comments(&mut model, &self.tags);
        if self.cancel.load(Ordering::Relaxed) {
            return Err(BuildError::Cancelled);
        }

        let hidden = HiddenMembers::new(self.options.hidden_members.iter().cloned());
        let converter_options = self.options.converter_options();
        let mut generator = Generator::new(
            &model,
            &self.options.conventions,
            &converter_options,
            &mut self.cache,
        )
        .with_oracle(&hidden);

        for id in model.member_ids() {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(BuildError::Cancelled);
            }
            generator.resolve(id);
        }

        let Generated { document, warnings } = generator.finish();
        debug!(
            types = document.types().count(),
            warnings = warnings.len(),
            "build finished"
        );
        Ok(BuildOutput { document, warnings })
    }
}

/// Parse every raw comment of the model
///
/// Comments are independent of each other, so they are parsed in
/// parallel and attached back in declaration order.
fn parse_comments(model: &mut EntityModel, tags: &TagSet) {
    let jobs = model.comment_jobs();
    debug!(comments = jobs.len(), "parsing comments");

    let parsed: Vec<_> = jobs
        .par_iter()
        .map(|job| parse_at(&job.text, tags, &job.location))
        .collect();

    for (job, comment) in jobs.into_iter().zip(parsed) {
        model.attach(job.target, comment);
    }
}
