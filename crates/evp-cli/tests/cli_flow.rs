//! Drives the subcommand handlers against a filesystem deployment.

use std::path::Path;

use evp_cli::config::{KdfProfile, StoreBackend, Timeouts};
use evp_cli::evidence::{
    run_list, run_retrieve, run_resume, run_submit, ListArgs, ResumeArgs, RetrieveArgs, SubmitArgs,
};
use evp_cli::journal::{run_verify_journal, VerifyJournalArgs};
use evp_cli::keygen::{run_keygen, KeygenArgs};
use evp_cli::CliConfig;

fn deployment(dir: &Path) -> CliConfig {
    CliConfig {
        store: StoreBackend::Fs {
            path: dir.join("store"),
        },
        journal: dir.join("ledger.jsonl"),
        key_file: dir.join("signing.key"),
        kdf: KdfProfile::Interactive,
        timeouts: Timeouts::default(),
    }
}

#[tokio::test]
async fn keygen_submit_list_retrieve_verify() {
    let dir = tempfile::tempdir().unwrap();
    let config = deployment(dir.path());
    std::env::set_var("EVP_CLI_FLOW_PASSPHRASE", "correct horse");

    run_keygen(&KeygenArgs { out: None, force: false }, &config.key_file).unwrap();

    let doc = dir.path().join("statement.txt");
    std::fs::write(&doc, b"witness statement").unwrap();
    let submitted = run_submit(
        &SubmitArgs {
            file: doc,
            passphrase_env: "EVP_CLI_FLOW_PASSPHRASE".into(),
        },
        &config,
    )
    .await
    .unwrap();
    assert_eq!(submitted, 0);

    assert_eq!(run_list(&ListArgs { json: true }, &config).await.unwrap(), 0);

    let out = dir.path().join("recovered.txt");
    let code = run_retrieve(
        &RetrieveArgs {
            id: 1,
            out: Some(out.clone()),
            force: false,
            passphrase_env: "EVP_CLI_FLOW_PASSPHRASE".into(),
        },
        &config,
    )
    .await
    .unwrap();
    assert_eq!(code, 0);
    assert_eq!(std::fs::read(&out).unwrap(), b"witness statement");

    let verify = VerifyJournalArgs { path: None };
    assert_eq!(run_verify_journal(&verify, &config).await.unwrap(), 0);
}

#[tokio::test]
async fn retrieve_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = deployment(dir.path());
    std::env::set_var("EVP_CLI_UNKNOWN_PASSPHRASE", "pw");

    let result = run_retrieve(
        &RetrieveArgs {
            id: 7,
            out: Some(dir.path().join("never")),
            force: false,
            passphrase_env: "EVP_CLI_UNKNOWN_PASSPHRASE".into(),
        },
        &config,
    )
    .await;
    assert!(result.is_err());
    assert!(!dir.path().join("never").exists());
}

#[tokio::test]
async fn submit_without_key_file_fails_before_storing() {
    let dir = tempfile::tempdir().unwrap();
    let config = deployment(dir.path());
    std::env::set_var("EVP_CLI_NOKEY_PASSPHRASE", "pw");
    let doc = dir.path().join("doc.bin");
    std::fs::write(&doc, b"data").unwrap();

    let result = run_submit(
        &SubmitArgs {
            file: doc,
            passphrase_env: "EVP_CLI_NOKEY_PASSPHRASE".into(),
        },
        &config,
    )
    .await;
    assert!(result.is_err());
    assert!(!dir.path().join("store").exists());
}

#[tokio::test]
async fn resume_rejects_malformed_content_id() {
    let dir = tempfile::tempdir().unwrap();
    let config = deployment(dir.path());
    run_keygen(&KeygenArgs { out: None, force: false }, &config.key_file).unwrap();

    let args = ResumeArgs {
        content_id: "has whitespace".into(),
    };
    assert!(run_resume(&args, &config).await.is_err());
}

#[tokio::test]
async fn tampered_journal_exits_with_failure_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = deployment(dir.path());
    std::env::set_var("EVP_CLI_TAMPER_PASSPHRASE", "pw");
    run_keygen(&KeygenArgs { out: None, force: false }, &config.key_file).unwrap();

    for body in ["first", "second"] {
        let doc = dir.path().join(body);
        std::fs::write(&doc, body).unwrap();
        run_submit(
            &SubmitArgs {
                file: doc,
                passphrase_env: "EVP_CLI_TAMPER_PASSPHRASE".into(),
            },
            &config,
        )
        .await
        .unwrap();
    }

    // Drop the first record; the chain no longer links.
    let text = std::fs::read_to_string(&config.journal).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let edited = format!("{}\n{}\n", lines[0], lines[2]);
    std::fs::write(&config.journal, edited).unwrap();

    let verify = VerifyJournalArgs {
        path: Some(config.journal.clone()),
    };
    assert_eq!(run_verify_journal(&verify, &config).await.unwrap(), 2);
}
