//! Disaster-recovery scenarios
//!
//! Backs up agents through the real engine, destroys the live trees, and
//! verifies restore brings back exact content, including point-in-time
//! recovery at an older commit and the credential-overwrite refusal.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use vault_core::{BackupEngine, RestoreEngine, RestoreOptions, RunConfig};
use vault_fs::ArchiveLayout;
use vault_git::ArchiveRepo;
use vault_roster::{AgentBinding, RosterSource};

struct StaticRoster(Vec<AgentBinding>);

impl RosterSource for StaticRoster {
    fn discover(&self) -> vault_roster::Result<Vec<AgentBinding>> {
        Ok(self.0.clone())
    }
}

struct Fixture {
    _temp: TempDir,
    config: RunConfig,
    roster: StaticRoster,
}

impl Fixture {
    fn workspace(&self, id: &str) -> PathBuf {
        self.config.workspace_root.join(id)
    }

    fn agent_dir(&self, id: &str) -> PathBuf {
        self.config
            .workspace_root
            .parent()
            .unwrap()
            .join("agents")
            .join(id)
    }

    fn backup(&self) {
        let result = BackupEngine::new(&self.config, &self.roster).run();
        assert!(result.success, "{:?}", result);
    }

    fn restore(&self, options: RestoreOptions) -> vault_core::RestoreResult {
        RestoreEngine::new(&self.config, options).run()
    }
}

fn setup(agents: &[(&str, bool)]) -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    let mut bindings = Vec::new();
    for (id, with_auth) in agents {
        let workspace = root.join("workspaces").join(id);
        let agent_dir = root.join("agents").join(id);
        fs::create_dir_all(&workspace).unwrap();
        fs::create_dir_all(&agent_dir).unwrap();
        fs::write(workspace.join("notes.md"), format!("# {id}")).unwrap();
        fs::write(
            agent_dir.join("state.json"),
            format!(r#"{{"agent":"{id}"}}"#),
        )
        .unwrap();
        if *with_auth {
            fs::write(agent_dir.join("auth-profiles.json"), r#"{"token":"s"}"#).unwrap();
        }

        bindings.push(AgentBinding {
            id: id.to_string(),
            name: format!("Agent {id}"),
            workspace: workspace.to_string_lossy().into_owned(),
            agent_dir: agent_dir.to_string_lossy().into_owned(),
            model: "claude".to_string(),
            bindings: 1,
            is_default: false,
            routes: vec![],
        });
    }

    Fixture {
        config: RunConfig::from_parts(
            root.join("archive"),
            root.join("workspaces"),
            "recovery-passphrase",
            vec![],
        ),
        roster: StaticRoster(bindings),
        _temp: temp,
    }
}

fn wipe(path: &Path) {
    fs::remove_dir_all(path).unwrap();
    fs::create_dir_all(path).unwrap();
}

#[test]
fn restore_after_total_loss_recovers_every_agent() {
    let fixture = setup(&[("alpha", false), ("beta", false)]);
    fixture.backup();

    for id in ["alpha", "beta"] {
        wipe(&fixture.workspace(id));
        wipe(&fixture.agent_dir(id));
    }

    let result = fixture.restore(RestoreOptions::default());
    assert!(result.success, "{:?}", result);
    assert_eq!(result.restored, 2);

    for id in ["alpha", "beta"] {
        assert_eq!(
            fs::read_to_string(fixture.workspace(id).join("notes.md")).unwrap(),
            format!("# {id}")
        );
        assert_eq!(
            fs::read_to_string(fixture.agent_dir(id).join("state.json")).unwrap(),
            format!(r#"{{"agent":"{id}"}}"#)
        );
        // No artifacts leak into the live tree
        assert!(!fixture.agent_dir(id).join("state.json.enc").exists());
    }
}

#[test]
fn point_in_time_restore_at_an_older_commit() {
    let fixture = setup(&[("alpha", false)]);
    fixture.backup();

    fs::write(fixture.workspace("alpha").join("notes.md"), "# ruined").unwrap();
    fs::write(
        fixture.agent_dir("alpha").join("state.json"),
        r#"{"agent":"alpha","corrupt":true}"#,
    )
    .unwrap();
    fixture.backup();

    let repo = ArchiveRepo::open(&fixture.config.archive_root).unwrap();
    let history = repo.history(10).unwrap();
    assert_eq!(history.len(), 2);
    let first_backup = history.last().unwrap().hash.clone();

    let result = fixture.restore(RestoreOptions {
        reference: Some(first_backup),
        confirm_auth_overwrite: false,
    });
    assert!(result.success, "{:?}", result);

    assert_eq!(
        fs::read_to_string(fixture.workspace("alpha").join("notes.md")).unwrap(),
        "# alpha"
    );
    assert_eq!(
        fs::read_to_string(fixture.agent_dir("alpha").join("state.json")).unwrap(),
        r#"{"agent":"alpha"}"#
    );
}

#[test]
fn credential_archives_block_unconfirmed_restore() {
    let fixture = setup(&[("alpha", false), ("beta", true)]);
    fixture.backup();

    fs::write(fixture.workspace("alpha").join("notes.md"), "# live edit").unwrap();

    let refused = fixture.restore(RestoreOptions::default());
    assert!(!refused.success);
    assert!(refused.auth_overwrite_warning);
    assert_eq!(refused.restored, 0);

    // The refusal happened before the first mutation
    assert_eq!(
        fs::read_to_string(fixture.workspace("alpha").join("notes.md")).unwrap(),
        "# live edit"
    );

    let confirmed = fixture.restore(RestoreOptions {
        reference: None,
        confirm_auth_overwrite: true,
    });
    assert!(confirmed.success, "{:?}", confirmed);
    assert_eq!(confirmed.restored, 2);
    assert_eq!(
        fs::read_to_string(fixture.agent_dir("beta").join("auth-profiles.json")).unwrap(),
        r#"{"token":"s"}"#
    );
}

#[test]
fn restore_destinations_come_from_archived_metadata() {
    let fixture = setup(&[("alpha", false)]);
    fixture.backup();

    // Metadata in the archive records absolute destinations; restore must
    // honor them even after the live trees vanish entirely.
    let layout = ArchiveLayout::new(&fixture.config.archive_root);
    assert!(layout.metadata_path("alpha").unwrap().is_file());

    fs::remove_dir_all(fixture.workspace("alpha")).unwrap();
    fs::remove_dir_all(fixture.agent_dir("alpha")).unwrap();

    let result = fixture.restore(RestoreOptions::default());
    assert!(result.success, "{:?}", result);
    assert!(fixture.workspace("alpha").join("notes.md").is_file());
}

#[test]
fn wrong_passphrase_restores_nothing_usable() {
    let fixture = setup(&[("alpha", false)]);
    fixture.backup();

    let bad_config = RunConfig::from_parts(
        fixture.config.archive_root.clone(),
        fixture.config.workspace_root.clone(),
        "not-the-passphrase",
        vec![],
    );
    let result = RestoreEngine::new(&bad_config, RestoreOptions::default()).run();

    assert!(!result.success);
    assert_eq!(result.restored, 0);
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn backup_after_checkout_restore_continues_history() {
    let fixture = setup(&[("alpha", false)]);
    fixture.backup();

    fs::write(fixture.workspace("alpha").join("notes.md"), "# v2").unwrap();
    fixture.backup();

    let repo = ArchiveRepo::open(&fixture.config.archive_root).unwrap();
    let first_backup = repo.history(10).unwrap().last().unwrap().hash.clone();

    let rollback = fixture.restore(RestoreOptions {
        reference: Some(first_backup),
        confirm_auth_overwrite: false,
    });
    assert!(rollback.success, "{:?}", rollback);

    // A fresh backup run after the rollback commits on top of the
    // checked-out revision
    fixture.backup();
    let repo = ArchiveRepo::open(&fixture.config.archive_root).unwrap();
    assert!(!repo.history(10).unwrap().is_empty());
}
