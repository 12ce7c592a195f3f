//! End-to-end backup lifecycle
//!
//! Exercises the complete flow with a subprocess roster, exactly as a
//! scheduled run would: discovery -> mirror -> encrypt -> commit.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use vault_core::{BackupEngine, RunConfig};
use vault_git::ArchiveRepo;
use vault_roster::CommandRoster;

/// Live trees for one agent plus a roster command that reports it.
struct Fixture {
    _temp: TempDir,
    root: PathBuf,
    config: RunConfig,
    roster: CommandRoster,
}

fn setup(agent_ids: &[&str]) -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();

    let mut bindings = Vec::new();
    for id in agent_ids {
        let workspace = root.join(format!("workspaces/{id}"));
        let agent_dir = root.join(format!("agents/{id}"));
        fs::create_dir_all(&workspace).unwrap();
        fs::create_dir_all(agent_dir.join("sessions")).unwrap();
        fs::write(workspace.join("notes.md"), format!("# {id}")).unwrap();
        fs::write(
            agent_dir.join("state.json"),
            format!(r#"{{"agent":"{id}"}}"#),
        )
        .unwrap();
        fs::write(agent_dir.join("sessions/last.log"), "session log").unwrap();

        bindings.push(serde_json::json!({
            "id": id,
            "name": format!("Agent {id}"),
            "workspace": workspace.to_string_lossy(),
            "agentDir": agent_dir.to_string_lossy(),
            "model": "claude",
        }));
    }

    // Roster served by a real subprocess, as in production
    let roster_file = root.join("roster.json");
    fs::write(
        &roster_file,
        serde_json::to_string(&serde_json::Value::Array(bindings)).unwrap(),
    )
    .unwrap();
    let roster = CommandRoster::new(
        "cat",
        vec![roster_file.to_string_lossy().into_owned()],
    );

    let config = RunConfig::from_parts(
        root.join("archive"),
        root.join("workspaces"),
        "integration-passphrase",
        vec![],
    );

    Fixture {
        _temp: temp,
        root,
        config,
        roster,
    }
}

fn workspace_of(fixture: &Fixture, id: &str) -> PathBuf {
    fixture.root.join(format!("workspaces/{id}"))
}

fn agent_dir_of(fixture: &Fixture, id: &str) -> PathBuf {
    fixture.root.join(format!("agents/{id}"))
}

fn archive_of(fixture: &Fixture, id: &str) -> PathBuf {
    fixture.config.archive_root.join("archives").join(id)
}

#[test]
fn full_backup_builds_archive_and_commits() {
    let fixture = setup(&["alpha", "beta"]);

    let result = BackupEngine::new(&fixture.config, &fixture.roster).run();
    assert!(result.success, "{:?}", result);
    assert_eq!(result.processed, 2);

    for id in ["alpha", "beta"] {
        let archive = archive_of(&fixture, id);
        assert!(archive.join("agent.json").is_file());
        assert!(archive.join("workspace/notes.md").is_file());
        assert!(archive.join("agentDir/state.json.enc").is_file());
        assert!(archive.join("agentDir/sessions/last.log.enc").is_file());

        // Nothing in the archived agent directory is plaintext
        assert!(!archive.join("agentDir/state.json").exists());
        assert!(!archive.join("agentDir/sessions/last.log").exists());

        // The metadata carries the binding and a timestamp
        let metadata: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(archive.join("agent.json")).unwrap())
                .unwrap();
        assert_eq!(metadata["id"], id);
        assert!(metadata["backedUpAt"].is_string());
    }

    // Workspace content is archived as plaintext
    assert_eq!(
        fs::read_to_string(archive_of(&fixture, "alpha").join("workspace/notes.md")).unwrap(),
        "# alpha"
    );

    let repo = ArchiveRepo::open(&fixture.config.archive_root).unwrap();
    let history = repo.history(10).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].message.starts_with("Backup: "));
}

#[test]
fn archived_artifacts_decrypt_to_live_content() {
    let fixture = setup(&["alpha"]);
    BackupEngine::new(&fixture.config, &fixture.roster).run();

    let artifact = archive_of(&fixture, "alpha").join("agentDir/state.json.enc");
    let plaintext =
        vault_crypto::decrypt(&fs::read(artifact).unwrap(), "integration-passphrase").unwrap();
    assert_eq!(plaintext, br#"{"agent":"alpha"}"#);
}

#[test]
fn unchanged_rerun_keeps_ciphertext_stable() {
    let fixture = setup(&["alpha"]);
    let engine = BackupEngine::new(&fixture.config, &fixture.roster);

    engine.run();
    let artifact = archive_of(&fixture, "alpha").join("agentDir/state.json.enc");
    let before = fs::read(&artifact).unwrap();

    let second = engine.run();
    assert!(second.success);
    assert!(!second.changes[0].workspace_changed);
    assert!(!second.changes[0].agent_dir_changed);
    assert_eq!(fs::read(&artifact).unwrap(), before);
}

#[test]
fn edits_land_in_the_next_commit() {
    let fixture = setup(&["alpha"]);
    let engine = BackupEngine::new(&fixture.config, &fixture.roster);
    engine.run();

    fs::write(workspace_of(&fixture, "alpha").join("notes.md"), "# edited").unwrap();
    fs::write(
        agent_dir_of(&fixture, "alpha").join("state.json"),
        r#"{"agent":"alpha","run":2}"#,
    )
    .unwrap();

    let result = engine.run();
    assert!(result.changes[0].workspace_changed);
    assert!(result.changes[0].agent_dir_changed);

    let repo = ArchiveRepo::open(&fixture.config.archive_root).unwrap();
    assert_eq!(repo.history(10).unwrap().len(), 2);

    let artifact = archive_of(&fixture, "alpha").join("agentDir/state.json.enc");
    let plaintext =
        vault_crypto::decrypt(&fs::read(artifact).unwrap(), "integration-passphrase").unwrap();
    assert_eq!(plaintext, br#"{"agent":"alpha","run":2}"#);
}

#[test]
fn deleted_live_files_disappear_from_the_archive() {
    let fixture = setup(&["alpha"]);
    let engine = BackupEngine::new(&fixture.config, &fixture.roster);
    engine.run();

    fs::remove_file(agent_dir_of(&fixture, "alpha").join("sessions/last.log")).unwrap();
    let result = engine.run();
    assert!(result.changes[0].agent_dir_changed);

    assert!(
        !archive_of(&fixture, "alpha")
            .join("agentDir/sessions/last.log.enc")
            .exists()
    );
}

#[test]
fn commit_history_is_inspectable_with_plain_git() {
    let fixture = setup(&["alpha"]);
    BackupEngine::new(&fixture.config, &fixture.roster).run();

    // The archive is an ordinary repository
    let repo = git2::Repository::open(&fixture.config.archive_root).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert!(head.message().unwrap().starts_with("Backup: "));
    assert_eq!(head.parent_count(), 0);
}
