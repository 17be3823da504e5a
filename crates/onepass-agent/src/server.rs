use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use onepass_vault::{EncryptionKeyFile, KeyDict, VaultError, DATA_DIR};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::protocol::{binary_version, AgentInfo, Request, Response, WireErrorKind};

struct VaultData {
    keys: KeyDict,
    /// Bumped on every unlock/refresh; an auto-lock timer only fires if its
    /// generation still matches, so stale timers cancelled by a later
    /// unlock cannot lock the vault.
    generation: u64,
    autolock: JoinHandle<()>,
}

impl Drop for VaultData {
    fn drop(&mut self) {
        self.autolock.abort();
    }
}

type VaultMap = Arc<Mutex<HashMap<PathBuf, VaultData>>>;

/// The agent: a map from vault path to its decrypted keys, behind one lock,
/// served over a Unix socket. Every RPC except `Info` serializes on that
/// lock, which is what makes a late `Encrypt` racing an auto-lock observe
/// the locked state.
pub struct Agent {
    vaults: VaultMap,
    generations: Arc<AtomicU64>,
    info: AgentInfo,
}

impl Default for Agent {
    fn default() -> Self {
        Agent::new()
    }
}

impl Agent {
    pub fn new() -> Agent {
        Agent {
            vaults: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
            info: AgentInfo {
                pid: std::process::id(),
                binary_version: binary_version(),
            },
        }
    }

    /// Bind the socket (replacing any stale file) and serve until the
    /// process exits.
    pub async fn serve(self, socket_path: &Path) -> io::Result<()> {
        match std::fs::remove_file(socket_path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        let listener = UnixListener::bind(socket_path)?;
        info!(socket = %socket_path.display(), "agent listening");

        let agent = Arc::new(self);
        loop {
            let (stream, _) = listener.accept().await?;
            let agent = Arc::clone(&agent);
            tokio::spawn(async move {
                if let Err(err) = agent.handle_connection(stream).await {
                    warn!(error = %err, "agent connection failed");
                }
            });
        }
    }

    async fn handle_connection(&self, stream: UnixStream) -> io::Result<()> {
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => self.dispatch(request).await,
                Err(err) => Response::Error {
                    kind: WireErrorKind::Internal,
                    message: format!("bad request: {err}"),
                },
            };
            let mut payload = serde_json::to_vec(&response)?;
            payload.push(b'\n');
            write_half.write_all(&payload).await?;
        }
        Ok(())
    }

    async fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::Info => Response::Info { info: self.info },
            Request::Unlock {
                vault_path,
                master_password,
                expire_after_secs,
            } => {
                self.unlock(vault_path, master_password, expire_after_secs)
                    .await
            }
            Request::Lock { vault_path } => {
                self.lock(&vault_path);
                Response::Unit
            }
            Request::IsLocked { vault_path } => Response::Bool {
                value: !self.vaults.lock().expect("agent lock").contains_key(&vault_path),
            },
            Request::Encrypt {
                vault_path,
                key_level,
                data,
            } => self.crypt(&vault_path, &key_level, &data, true),
            Request::Decrypt {
                vault_path,
                key_level,
                data,
            } => self.crypt(&vault_path, &key_level, &data, false),
            Request::RefreshAccess {
                vault_path,
                expire_after_secs,
            } => self.refresh(&vault_path, expire_after_secs),
        }
    }

    async fn unlock(
        &self,
        vault_path: PathBuf,
        master_password: String,
        expire_after_secs: u64,
    ) -> Response {
        // key derivation is CPU-heavy; keep it off the reactor and out of
        // the state lock
        let data_dir = vault_path.join(DATA_DIR);
        let unlocked = tokio::task::spawn_blocking(move || {
            EncryptionKeyFile::load(&data_dir)?.unlock(&master_password)
        })
        .await;

        let keys = match unlocked {
            Ok(Ok(keys)) => keys,
            Ok(Err(VaultError::BadMasterPassword)) => {
                warn!(vault = %vault_path.display(), "unlock failed: bad master password");
                return Response::Error {
                    kind: WireErrorKind::BadMasterPassword,
                    message: "incorrect master password".to_owned(),
                };
            }
            Ok(Err(err)) => {
                warn!(vault = %vault_path.display(), error = %err, "unlock failed");
                return Response::Error {
                    kind: WireErrorKind::Internal,
                    message: err.to_string(),
                };
            }
            Err(join_err) => {
                return Response::Error {
                    kind: WireErrorKind::Internal,
                    message: join_err.to_string(),
                };
            }
        };

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let autolock = self.arm_autolock(
            vault_path.clone(),
            generation,
            Duration::from_secs(expire_after_secs),
        );
        self.vaults.lock().expect("agent lock").insert(
            vault_path.clone(),
            VaultData {
                keys,
                generation,
                autolock,
            },
        );
        info!(vault = %vault_path.display(), "unlocked vault");
        Response::Bool { value: true }
    }

    fn lock(&self, vault_path: &Path) {
        if self
            .vaults
            .lock()
            .expect("agent lock")
            .remove(vault_path)
            .is_some()
        {
            info!(vault = %vault_path.display(), "locked vault");
        }
    }

    fn crypt(&self, vault_path: &Path, key_level: &str, data: &[u8], encrypt: bool) -> Response {
        let vaults = self.vaults.lock().expect("agent lock");
        let Some(vault) = vaults.get(vault_path) else {
            return Response::Error {
                kind: WireErrorKind::NoSuchVault,
                message: "no such vault".to_owned(),
            };
        };
        let Some(key) = vault.keys.get(key_level) else {
            return Response::Error {
                kind: WireErrorKind::NoSuchKey,
                message: format!("no key with level '{key_level}'"),
            };
        };
        let result = if encrypt {
            key.encrypt_data(data)
        } else {
            key.decrypt_data(data)
        };
        match result {
            Ok(data) => Response::Data { data },
            Err(err) => Response::Error {
                kind: WireErrorKind::Crypto,
                message: err.to_string(),
            },
        }
    }

    fn refresh(&self, vault_path: &Path, expire_after_secs: u64) -> Response {
        let mut vaults = self.vaults.lock().expect("agent lock");
        let Some(vault) = vaults.get_mut(vault_path) else {
            return Response::Error {
                kind: WireErrorKind::NotUnlocked,
                message: "vault is not unlocked".to_owned(),
            };
        };
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        vault.generation = generation;
        vault.autolock.abort();
        vault.autolock = self.arm_autolock(
            vault_path.to_owned(),
            generation,
            Duration::from_secs(expire_after_secs),
        );
        Response::Unit
    }

    fn arm_autolock(
        &self,
        vault_path: PathBuf,
        generation: u64,
        expire_after: Duration,
    ) -> JoinHandle<()> {
        let vaults = Arc::clone(&self.vaults);
        tokio::spawn(async move {
            tokio::time::sleep(expire_after).await;
            let mut vaults = vaults.lock().expect("agent lock");
            let current = vaults.get(&vault_path).map(|data| data.generation);
            if current == Some(generation) {
                vaults.remove(&vault_path);
                info!(vault = %vault_path.display(), "auto-locked vault");
            }
        })
    }
}
