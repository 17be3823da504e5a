use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use onepass_vault::{CryptoAgent, VaultError};
use tracing::debug;

use crate::protocol::{binary_version, AgentInfo, Request, Response, WireErrorKind};
use crate::{AgentError, AGENT_SUBCOMMAND};

const START_POLL_ATTEMPTS: u32 = 100;
const START_POLL_INTERVAL: Duration = Duration::from_millis(10);

struct Connection {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
}

/// Blocking client for one vault's operations against a running agent.
///
/// Implements [`CryptoAgent`], so a [`onepass_vault::Vault`] can delegate
/// all item encryption to the agent process.
pub struct AgentClient {
    conn: Mutex<Connection>,
    vault_path: PathBuf,
    info: AgentInfo,
}

impl AgentClient {
    /// Dial the agent socket and perform the `Info` handshake.
    pub fn connect(socket_path: &Path, vault_path: &Path) -> Result<AgentClient, AgentError> {
        let stream = UnixStream::connect(socket_path)
            .map_err(|err| AgentError::Unavailable(err.to_string()))?;
        let reader = BufReader::new(
            stream
                .try_clone()
                .map_err(|err| AgentError::Unavailable(err.to_string()))?,
        );
        let client = AgentClient {
            conn: Mutex::new(Connection {
                reader,
                writer: stream,
            }),
            vault_path: vault_path.to_owned(),
            info: AgentInfo {
                pid: 0,
                binary_version: 0,
            },
        };
        let info = client.fetch_info()?;
        Ok(AgentClient { info, ..client })
    }

    pub fn info(&self) -> AgentInfo {
        self.info
    }

    fn call(&self, request: &Request) -> Result<Response, AgentError> {
        let mut conn = self.conn.lock().expect("client connection lock");
        let mut line = serde_json::to_string(request)
            .map_err(|err| AgentError::Protocol(err.to_string()))?;
        line.push('\n');
        conn.writer.write_all(line.as_bytes())?;

        let mut response_line = String::new();
        if conn.reader.read_line(&mut response_line)? == 0 {
            return Err(AgentError::Unavailable("agent closed connection".to_owned()));
        }
        serde_json::from_str(&response_line).map_err(|err| AgentError::Protocol(err.to_string()))
    }

    fn call_checked(&self, request: &Request) -> Result<Response, AgentError> {
        match self.call(request)? {
            Response::Error { kind, message } => Err(match kind {
                WireErrorKind::NoSuchVault => AgentError::NoSuchVault,
                WireErrorKind::NoSuchKey => AgentError::NoSuchKey,
                WireErrorKind::NotUnlocked => AgentError::NotUnlocked,
                WireErrorKind::BadMasterPassword => AgentError::BadMasterPassword,
                WireErrorKind::Crypto => AgentError::Crypto(message),
                WireErrorKind::Internal => AgentError::Remote(message),
            }),
            ok => Ok(ok),
        }
    }

    fn fetch_info(&self) -> Result<AgentInfo, AgentError> {
        match self.call_checked(&Request::Info)? {
            Response::Info { info } => Ok(info),
            other => Err(AgentError::Protocol(format!(
                "unexpected response to Info: {other:?}"
            ))),
        }
    }

    /// Unlock this client's vault in the agent, arming the auto-lock timer.
    pub fn unlock(&self, master_password: &str, expire_after: Duration) -> Result<(), AgentError> {
        self.call_checked(&Request::Unlock {
            vault_path: self.vault_path.clone(),
            master_password: master_password.to_owned(),
            expire_after_secs: expire_after.as_secs(),
        })?;
        Ok(())
    }

    /// Drop this vault's keys from the agent.
    pub fn lock_vault(&self) -> Result<(), AgentError> {
        self.call_checked(&Request::Lock {
            vault_path: self.vault_path.clone(),
        })?;
        Ok(())
    }

    pub fn vault_is_locked(&self) -> Result<bool, AgentError> {
        match self.call_checked(&Request::IsLocked {
            vault_path: self.vault_path.clone(),
        })? {
            Response::Bool { value } => Ok(value),
            other => Err(AgentError::Protocol(format!(
                "unexpected response to IsLocked: {other:?}"
            ))),
        }
    }

    /// Push the auto-lock deadline out again.
    pub fn refresh_access(&self, expire_after: Duration) -> Result<(), AgentError> {
        self.call_checked(&Request::RefreshAccess {
            vault_path: self.vault_path.clone(),
            expire_after_secs: expire_after.as_secs(),
        })?;
        Ok(())
    }

    pub fn encrypt_data(&self, key_level: &str, data: &[u8]) -> Result<Vec<u8>, AgentError> {
        self.crypt(Request::Encrypt {
            vault_path: self.vault_path.clone(),
            key_level: key_level.to_owned(),
            data: data.to_vec(),
        })
    }

    pub fn decrypt_data(&self, key_level: &str, data: &[u8]) -> Result<Vec<u8>, AgentError> {
        self.crypt(Request::Decrypt {
            vault_path: self.vault_path.clone(),
            key_level: key_level.to_owned(),
            data: data.to_vec(),
        })
    }

    fn crypt(&self, request: Request) -> Result<Vec<u8>, AgentError> {
        match self.call_checked(&request)? {
            Response::Data { data } => Ok(data),
            other => Err(AgentError::Protocol(format!(
                "unexpected crypto response: {other:?}"
            ))),
        }
    }
}

impl CryptoAgent for AgentClient {
    fn encrypt(&self, key_level: &str, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        self.encrypt_data(key_level, data)
            .map_err(|err| into_vault_error(err, key_level))
    }

    fn decrypt(&self, key_level: &str, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        self.decrypt_data(key_level, data)
            .map_err(|err| into_vault_error(err, key_level))
    }

    fn lock(&mut self) -> Result<(), VaultError> {
        self.lock_vault().map_err(VaultError::from)
    }

    fn is_locked(&self) -> bool {
        self.vault_is_locked().unwrap_or(true)
    }
}

fn into_vault_error(err: AgentError, key_level: &str) -> VaultError {
    match err {
        AgentError::NoSuchKey => VaultError::UnknownKeyLevel(key_level.to_owned()),
        other => other.into(),
    }
}

/// Connect to the agent, restarting it when it is missing or was built from
/// a different binary.
///
/// 1. Dial the socket; the connect handshake fetches the agent's version.
/// 2. A version mismatch means a stale agent from a previous install: it is
///    told to terminate and a fresh one is spawned.
/// 3. When unreachable, the current executable is re-invoked with the agent
///    subcommand and the socket is polled for about a second.
pub fn connect_or_start(socket_path: &Path, vault_path: &Path) -> Result<AgentClient, AgentError> {
    match AgentClient::connect(socket_path, vault_path) {
        Ok(client) if client.info.binary_version == binary_version() => return Ok(client),
        Ok(stale) => {
            debug!(pid = stale.info.pid, "terminating agent with mismatched version");
            terminate(stale.info.pid);
        }
        Err(AgentError::Unavailable(_)) => {}
        Err(err) => return Err(err),
    }

    spawn_agent()?;
    for _ in 0..START_POLL_ATTEMPTS {
        std::thread::sleep(START_POLL_INTERVAL);
        match AgentClient::connect(socket_path, vault_path) {
            Ok(client) if client.info.binary_version == binary_version() => return Ok(client),
            Ok(_) | Err(AgentError::Unavailable(_)) => continue,
            Err(err) => return Err(err),
        }
    }
    Err(AgentError::Unavailable(
        "timed out waiting for the agent to start".to_owned(),
    ))
}

fn spawn_agent() -> Result<(), AgentError> {
    let exe = std::env::current_exe()?;
    std::process::Command::new(exe)
        .arg(AGENT_SUBCOMMAND)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()?;
    Ok(())
}

fn terminate(pid: u32) {
    // best effort; a dead pid or one owned by someone else is ignored
    unsafe {
        libc::kill(pid as libc::pid_t, libc::SIGTERM);
    }
}
