//! Archive repository handle

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{IndexAddOption, Oid, Repository, Signature};

use crate::commits::{CommitInfo, list_recent_commits};
use crate::{Error, Result};

/// Fallback committer identity when the repository has no configured user
const FALLBACK_NAME: &str = "Agent Vault";
const FALLBACK_EMAIL: &str = "agentvault@localhost";

/// Handle to the archive repository's version-control state.
///
/// All operations are scoped to the repository root supplied at
/// construction time.
pub struct ArchiveRepo {
    root: PathBuf,
    repo: Repository,
}

impl ArchiveRepo {
    /// Open the repository at `root`, initializing it if none exists.
    pub fn open_or_init(root: &Path) -> Result<Self> {
        let repo = match Repository::open(root) {
            Ok(repo) => repo,
            Err(_) => {
                tracing::info!(root = %root.display(), "initializing archive repository");
                Repository::init(root)?
            }
        };

        Ok(Self {
            root: root.to_path_buf(),
            repo,
        })
    }

    /// Open an existing repository at `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let repo = Repository::open(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            repo,
        })
    }

    /// The repository root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stage every pending change in the working tree and create one commit.
    ///
    /// Commits with the current HEAD as parent, or as a root commit when the
    /// repository has no history yet. An unchanged tree still commits; the
    /// caller decides whether a commit is warranted.
    pub fn commit_all(&self, message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.signature()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(|e| Error::CommitFailed {
                message: e.message().to_string(),
            })?;

        tracing::debug!(oid = %oid, message, "created archive commit");
        Ok(oid)
    }

    /// List the most recent commits reachable from HEAD.
    ///
    /// Returns an empty list for a repository with no commits yet.
    pub fn history(&self, max_count: usize) -> Result<Vec<CommitInfo>> {
        if self.repo.head().is_err() {
            return Ok(Vec::new());
        }
        list_recent_commits(&self.repo, max_count)
    }

    /// Check out the tree of `reference` (any revision expression), forcing
    /// the working tree to match and leaving HEAD detached at that commit.
    pub fn checkout(&self, reference: &str) -> Result<()> {
        let object = self
            .repo
            .revparse_single(reference)
            .map_err(|_| Error::ReferenceNotFound {
                reference: reference.to_string(),
            })?;

        let commit = object.peel_to_commit()?;
        self.repo
            .checkout_tree(&object, Some(CheckoutBuilder::default().force()))?;
        self.repo.set_head_detached(commit.id())?;

        tracing::info!(reference, oid = %commit.id(), "checked out archive revision");
        Ok(())
    }

    /// Committer signature: the repository's configured identity, or a
    /// fixed fallback when none is configured.
    fn signature(&self) -> Result<Signature<'_>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
        }
    }
}
