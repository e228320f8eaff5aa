//! Step-wise scan driver.
//!
//! A scan is an explicit state machine advanced one bounded unit of work per
//! [`Scanner::step`] call: the initial manifest search, one manifest, or one
//! source file. Between steps the index is always consistent, so a host loop can
//! interleave other work, report progress, or cancel at any boundary.
//!
//! ```text
//! Idle -start-> Preparing -> EnumeratingManifests <-> EnumeratingSources -> Finishing -> Idle
//! ```

use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::{RootFolders, ScanConfig};
use crate::error::{IndexError, ScanError};
use crate::extractor::extract_namespaces_from_file;
use crate::index::{NamespaceIndex, OwnershipOrigin};
use crate::locator::{enumerate_sources, locate_manifests};
use crate::manifest::read_manifest;
use crate::paths::parent_dir;
use crate::resolver::OwnershipResolver;
use crate::store::IndexStore;

/// Scan driver state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Idle,
    Preparing,
    EnumeratingManifests,
    EnumeratingSources,
    Finishing,
}

impl ScanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::EnumeratingManifests => "enumerating manifests",
            Self::EnumeratingSources => "enumerating sources",
            Self::Finishing => "finishing",
        }
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scan ended. Cancellation still persists everything resolved so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed,
    Cancelled,
}

/// Counters and current position of the running (or last) scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanProgress {
    pub state: ScanState,
    pub manifests_processed: usize,
    pub manifests_total: usize,
    pub files_processed: usize,
    pub files_total: usize,
    pub current_manifest: Option<String>,
    pub current_file: Option<String>,
}

impl ScanProgress {
    /// Fraction of known source files processed, `0.0` while none are known.
    pub fn fraction(&self) -> f64 {
        if self.files_total == 0 {
            0.0
        } else {
            self.files_processed as f64 / self.files_total as f64
        }
    }

    pub fn status_line(&self) -> String {
        format!(
            "Asmdefs: {}/{}\nFiles: {}/{}",
            self.manifests_processed, self.manifests_total, self.files_processed, self.files_total
        )
    }
}

/// Final report of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub outcome: ScanOutcome,
    pub manifests_processed: usize,
    pub manifests_total: usize,
    pub files_processed: usize,
    pub files_total: usize,
    pub namespaces: usize,
}

/// Progress callback, invoked after every step.
pub type ProgressCallback = Box<dyn FnMut(&ScanProgress)>;

/// Assembly a queued source file belongs to. Shared by every file of one manifest.
#[derive(Debug)]
struct SourceOwner {
    assembly_name: String,
    manifest_path: String,
    origin: OwnershipOrigin,
}

#[derive(Debug)]
struct PendingSource {
    path: String,
    owner: Rc<SourceOwner>,
}

/// Drives scans over a project and owns the resolver and its store.
pub struct Scanner {
    config: ScanConfig,
    resolver: OwnershipResolver,
    store: IndexStore,
    state: ScanState,
    roots: Vec<String>,
    manifest_queue: VecDeque<String>,
    source_queue: VecDeque<PendingSource>,
    progress: ScanProgress,
    cancel_requested: bool,
    last_summary: Option<ScanSummary>,
}

impl Scanner {
    /// A scanner seeded with `resolver` that persists to the index path named by `config`.
    pub fn new(config: ScanConfig, resolver: OwnershipResolver) -> Self {
        let store = IndexStore::new(config.resolved_index_path());
        Self {
            config,
            resolver,
            store,
            state: ScanState::Idle,
            roots: Vec::new(),
            manifest_queue: VecDeque::new(),
            source_queue: VecDeque::new(),
            progress: ScanProgress::default(),
            cancel_requested: false,
            last_summary: None,
        }
    }

    /// Open the store named by `config` and continue from whatever it holds.
    pub fn open(config: ScanConfig) -> Result<Self, IndexError> {
        let mut scanner = Self::new(config, OwnershipResolver::new());
        let index = scanner.store.load()?;
        log::debug!("loaded {} namespaces from {}", index.len(), scanner.store.path().display());
        scanner.resolver = OwnershipResolver::with_index(index);
        Ok(scanner)
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != ScanState::Idle
    }

    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }

    pub fn index(&self) -> &NamespaceIndex {
        self.resolver.index()
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn last_summary(&self) -> Option<&ScanSummary> {
        self.last_summary.as_ref()
    }

    pub fn into_parts(self) -> (OwnershipResolver, IndexStore) {
        (self.resolver, self.store)
    }

    /// Begin a scan over `roots`.
    ///
    /// Refused while another scan is running or when `roots` is empty; in both
    /// cases nothing changes.
    pub fn start(&mut self, roots: &RootFolders) -> Result<(), ScanError> {
        if self.is_running() {
            return Err(ScanError::AlreadyRunning);
        }
        if roots.is_empty() {
            return Err(ScanError::NoRoots);
        }

        self.roots = roots.as_slice().to_vec();
        self.manifest_queue.clear();
        self.source_queue.clear();
        self.progress = ScanProgress {
            state: ScanState::Preparing,
            ..Default::default()
        };
        self.cancel_requested = false;
        self.state = ScanState::Preparing;
        log::info!("scan started over {} root folder(s)", self.roots.len());
        Ok(())
    }

    /// Ask the running scan to stop. Honored at the next step.
    pub fn cancel(&mut self) {
        if self.is_running() {
            self.cancel_requested = true;
        }
    }

    /// Perform one unit of work and return the state the driver is now in.
    ///
    /// Only a persistence failure while finishing is reported as an error; the
    /// driver is back in [`ScanState::Idle`] afterwards regardless.
    pub fn step(&mut self) -> Result<ScanState, ScanError> {
        let next = match self.state {
            ScanState::Idle => ScanState::Idle,
            _ if self.cancel_requested && self.state != ScanState::Finishing => {
                log::info!("scan cancelled");
                ScanState::Finishing
            }
            ScanState::Preparing => self.prepare(),
            ScanState::EnumeratingManifests | ScanState::EnumeratingSources => self.advance(),
            ScanState::Finishing => return self.finish(),
        };
        self.set_state(next);
        Ok(next)
    }

    /// Drive a scan over `roots` until it returns to idle.
    ///
    /// `should_cancel` is consulted before every step and `progress_callback` is
    /// invoked after every step.
    pub fn run(
        &mut self,
        roots: &RootFolders,
        mut progress_callback: Option<ProgressCallback>,
        mut should_cancel: impl FnMut(&ScanProgress) -> bool,
    ) -> Result<ScanSummary, ScanError> {
        self.start(roots)?;

        while self.is_running() {
            if !self.cancel_requested && should_cancel(&self.progress) {
                self.cancel();
            }
            let stepped = self.step();
            if let Some(ref mut cb) = progress_callback {
                cb(&self.progress);
            }
            stepped?;
        }

        let summary = self.last_summary.clone().unwrap_or_else(|| self.summary(ScanOutcome::Completed));
        Ok(summary)
    }

    fn set_state(&mut self, state: ScanState) {
        self.state = state;
        self.progress.state = state;
    }

    fn prepare(&mut self) -> ScanState {
        let manifests = locate_manifests(
            &self.config.project_root,
            &self.roots,
            &self.config.manifest_extension,
        );
        log::info!("found {} manifest(s)", manifests.len());

        self.progress.manifests_total = manifests.len();
        self.manifest_queue = manifests.into();

        if self.manifest_queue.is_empty() {
            ScanState::Finishing
        } else {
            ScanState::EnumeratingManifests
        }
    }

    fn advance(&mut self) -> ScanState {
        if let Some(pending) = self.source_queue.pop_front() {
            self.process_source(pending);
        } else if let Some(manifest_path) = self.manifest_queue.pop_front() {
            self.process_manifest(manifest_path);
        } else {
            return ScanState::Finishing;
        }

        if self.source_queue.is_empty() {
            ScanState::EnumeratingManifests
        } else {
            ScanState::EnumeratingSources
        }
    }

    fn process_manifest(&mut self, manifest_path: String) {
        self.progress.manifests_processed += 1;
        self.progress.current_manifest = Some(manifest_path.clone());
        log::debug!("manifest {manifest_path}");

        let abs_path = self.config.project_root.join(&manifest_path);
        let manifest = match read_manifest(&abs_path, &manifest_path) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("{e}");
                return;
            }
        };

        if !manifest.is_registrable() {
            log::debug!("skipping unnamed manifest {manifest_path}");
            return;
        }

        let origin = OwnershipOrigin::classify(&manifest_path, &self.config.vendored_root);
        let sources = enumerate_sources(
            &self.config.project_root,
            parent_dir(&manifest_path),
            &self.config.source_extension,
        );
        self.progress.files_total += sources.len();

        let owner = Rc::new(SourceOwner {
            assembly_name: manifest.name,
            manifest_path,
            origin,
        });
        self.source_queue
            .extend(sources.into_iter().map(|path| PendingSource {
                path,
                owner: Rc::clone(&owner),
            }));
    }

    fn process_source(&mut self, pending: PendingSource) {
        self.progress.files_processed += 1;
        self.progress.current_file = Some(pending.path.clone());

        let abs_path = self.config.project_root.join(&pending.path);
        let namespaces = match extract_namespaces_from_file(&abs_path, &pending.path) {
            Ok(ns) => ns,
            Err(e) => {
                log::warn!("{e}");
                return;
            }
        };

        let owner = &pending.owner;
        for namespace in &namespaces {
            self.resolver.register(
                namespace,
                &owner.assembly_name,
                &owner.manifest_path,
                owner.origin,
            );
        }
    }

    fn finish(&mut self) -> Result<ScanState, ScanError> {
        self.resolver.normalize_paths();

        let outcome = if self.cancel_requested {
            ScanOutcome::Cancelled
        } else {
            ScanOutcome::Completed
        };
        let summary = self.summary(outcome);

        self.manifest_queue.clear();
        self.source_queue.clear();
        self.cancel_requested = false;
        self.set_state(ScanState::Idle);

        log::info!(
            "scan {}: {}/{} manifests, {}/{} files, {} namespaces",
            if outcome == ScanOutcome::Cancelled { "cancelled" } else { "complete" },
            summary.manifests_processed,
            summary.manifests_total,
            summary.files_processed,
            summary.files_total,
            summary.namespaces
        );
        self.last_summary = Some(summary);

        self.store.save(self.resolver.index())?;
        Ok(ScanState::Idle)
    }

    fn summary(&self, outcome: ScanOutcome) -> ScanSummary {
        ScanSummary {
            outcome,
            manifests_processed: self.progress.manifests_processed,
            manifests_total: self.progress.manifests_total,
            files_processed: self.progress.files_processed,
            files_total: self.progress.files_total,
            namespaces: self.resolver.len(),
        }
    }
}
