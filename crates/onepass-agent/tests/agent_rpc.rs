//! Agent lifecycle tests: a real server on a scratch socket, a blocking
//! client driven from worker threads.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use onepass_agent::{Agent, AgentClient, AgentError};
use onepass_vault::{Vault, VaultSecurity};

const MASTER_PWD: &str = "test-pwd";

async fn start_agent(socket: PathBuf) {
    let connect_path = socket.clone();
    tokio::spawn(async move {
        Agent::new().serve(&socket).await.expect("agent serve");
    });
    // wait for the socket to accept connections
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if std::os::unix::net::UnixStream::connect(&connect_path).is_ok() {
            return;
        }
    }
    panic!("agent did not come up");
}

fn make_vault(dir: &Path) -> PathBuf {
    let path = dir.join("vault.agilekeychain");
    Vault::create(
        &path,
        &VaultSecurity {
            master_password: MASTER_PWD.to_owned(),
            iterations: 100,
        },
    )
    .expect("create vault");
    path
}

async fn connect(socket: &Path, vault: &Path) -> Arc<AgentClient> {
    let socket = socket.to_owned();
    let vault = vault.to_owned();
    tokio::task::spawn_blocking(move || {
        Arc::new(AgentClient::connect(&socket, &vault).expect("connect"))
    })
    .await
    .expect("join")
}

async fn blocking<T: Send + 'static>(
    client: &Arc<AgentClient>,
    op: impl FnOnce(Arc<AgentClient>) -> T + Send + 'static,
) -> T {
    let client = Arc::clone(client);
    tokio::task::spawn_blocking(move || op(client)).await.expect("join")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lock_unlock_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("agent.sock");
    let vault = make_vault(dir.path());
    start_agent(socket.clone()).await;
    let client = connect(&socket, &vault).await;

    assert!(blocking(&client, |c| c.vault_is_locked()).await.unwrap());

    blocking(&client, |c| c.unlock(MASTER_PWD, Duration::from_secs(60)))
        .await
        .unwrap();
    assert!(!blocking(&client, |c| c.vault_is_locked()).await.unwrap());

    blocking(&client, |c| c.lock_vault()).await.unwrap();
    assert!(blocking(&client, |c| c.vault_is_locked()).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn encrypt_decrypt_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("agent.sock");
    let vault = make_vault(dir.path());
    start_agent(socket.clone()).await;
    let client = connect(&socket, &vault).await;

    blocking(&client, |c| c.unlock(MASTER_PWD, Duration::from_secs(60)))
        .await
        .unwrap();

    let encrypted = blocking(&client, |c| c.encrypt_data("SL5", b"hello world"))
        .await
        .unwrap();
    assert!(encrypted.starts_with(b"Salted__"));
    let decrypted = blocking(&client, move |c| c.decrypt_data("SL5", &encrypted))
        .await
        .unwrap();
    assert_eq!(decrypted, b"hello world");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn wrong_password_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("agent.sock");
    let vault = make_vault(dir.path());
    start_agent(socket.clone()).await;
    let client = connect(&socket, &vault).await;

    let err = blocking(&client, |c| c.unlock("wrong", Duration::from_secs(60)))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::BadMasterPassword));
    assert!(blocking(&client, |c| c.vault_is_locked()).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unknown_key_level_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("agent.sock");
    let vault = make_vault(dir.path());
    start_agent(socket.clone()).await;
    let client = connect(&socket, &vault).await;

    blocking(&client, |c| c.unlock(MASTER_PWD, Duration::from_secs(60)))
        .await
        .unwrap();
    let err = blocking(&client, |c| c.encrypt_data("SL3", b"data"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::NoSuchKey));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn auto_lock_fires_and_later_calls_see_no_such_vault() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("agent.sock");
    let vault = make_vault(dir.path());
    start_agent(socket.clone()).await;
    let client = connect(&socket, &vault).await;

    blocking(&client, |c| c.unlock(MASTER_PWD, Duration::from_secs(1)))
        .await
        .unwrap();
    assert!(!blocking(&client, |c| c.vault_is_locked()).await.unwrap());

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert!(blocking(&client, |c| c.vault_is_locked()).await.unwrap());
    let err = blocking(&client, |c| c.encrypt_data("SL5", b"late"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::NoSuchVault));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refresh_extends_the_auto_lock() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("agent.sock");
    let vault = make_vault(dir.path());
    start_agent(socket.clone()).await;
    let client = connect(&socket, &vault).await;

    blocking(&client, |c| c.unlock(MASTER_PWD, Duration::from_secs(1)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    blocking(&client, |c| c.refresh_access(Duration::from_secs(3)))
        .await
        .unwrap();

    // past the original deadline, kept alive by the refresh
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert!(!blocking(&client, |c| c.vault_is_locked()).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refresh_on_a_locked_vault_fails() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("agent.sock");
    let vault = make_vault(dir.path());
    start_agent(socket.clone()).await;
    let client = connect(&socket, &vault).await;

    let err = blocking(&client, |c| c.refresh_access(Duration::from_secs(60)))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::NotUnlocked));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn info_reports_this_process() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("agent.sock");
    let vault = make_vault(dir.path());
    start_agent(socket.clone()).await;
    let client = connect(&socket, &vault).await;

    // the test runs the agent in-process, so the handshake already carries
    // our own pid and binary stamp
    assert_eq!(client.info().pid, std::process::id());
    assert_eq!(client.info().binary_version, onepass_agent::binary_version());
}
