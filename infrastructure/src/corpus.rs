use anyhow::{bail, Context};
use memmap2::Mmap;
use rayon::prelude::*;
use shared::types::Result;
use shared::utils::{decode_latin1, is_supported_file};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct CorpusDocument {
    /// Path relative to the corpus root.
    pub path: String,
    pub text: String,
}

/// Documents in index order. Document `i` is reported as index `i`.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<CorpusDocument>,
    fingerprint: String,
}

impl Corpus {
    pub fn from_documents(documents: Vec<CorpusDocument>) -> Self {
        let mut ctx = md5::Context::new();
        for doc in &documents {
            ctx.consume(doc.path.as_bytes());
            ctx.consume([0u8]);
            ctx.consume(doc.text.as_bytes());
            ctx.consume([0u8]);
        }
        let fingerprint = format!("{:x}", ctx.compute());
        Self {
            documents,
            fingerprint,
        }
    }

    pub fn documents(&self) -> &[CorpusDocument] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&CorpusDocument> {
        self.documents.get(index)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// md5 over every path and text; changes whenever the corpus does.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

pub struct CorpusScanner {
    root_path: PathBuf,
    ignored_dirs: HashSet<String>,
    max_file_bytes: u64,
}

impl CorpusScanner {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ignored_dirs: [".git", "target", "node_modules", ".cache", "__pycache__"]
                .into_iter()
                .map(String::from)
                .collect(),
            // Newsgroup posts are a few KB; anything this large is not a post.
            max_file_bytes: 4 * 1024 * 1024,
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Every candidate file under the root, sorted so that document indices
    /// are stable between runs.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.collect_files_recursive(&self.root_path, &mut files)
            .with_context(|| format!("failed to scan corpus at {}", self.root_path.display()))?;
        files.sort();
        Ok(files)
    }

    pub fn load(&self) -> Result<Corpus> {
        let files = self.collect_files()?;
        tracing::info!(files = files.len(), root = %self.root_path.display(), "reading corpus");

        let loaded: Vec<Result<Option<CorpusDocument>>> = files
            .par_iter()
            .map(|path| self.load_document(path))
            .collect();
        let mut documents = Vec::with_capacity(loaded.len());
        for doc in loaded {
            if let Some(doc) = doc? {
                documents.push(doc);
            }
        }

        if documents.is_empty() {
            bail!(
                "corpus at {} contains no documents",
                self.root_path.display()
            );
        }
        Ok(Corpus::from_documents(documents))
    }

    fn collect_files_recursive(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if self.ignored_dirs.contains(name) || name.starts_with('.') {
                        continue;
                    }
                }
                self.collect_files_recursive(&path, files)?;
            } else if is_supported_file(&path) {
                files.push(path);
            }
        }
        Ok(())
    }

    fn load_document(&self, path: &Path) -> Result<Option<CorpusDocument>> {
        let meta = path.metadata()?;
        if meta.len() == 0 {
            return Ok(None);
        }
        if meta.len() > self.max_file_bytes {
            tracing::warn!(path = %path.display(), bytes = meta.len(), "skipping oversized file");
            return Ok(None);
        }
        let file = File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mmap = unsafe { Mmap::map(&file)? };
        let relative = path
            .strip_prefix(&self.root_path)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        Ok(Some(CorpusDocument {
            path: relative,
            text: decode_latin1(&mmap),
        }))
    }
}
