//! Session management for Telegram client
//!
//! Provides:
//! - File-based session locking to prevent parallel execution
//! - Client creation over the persisted SQLite session
//! - Interactive login when the session is not yet authorized

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use grammers_client::client::updates::UpdatesLike;
use grammers_client::{Client, SignInError};
use grammers_mtsender::{SenderPool, SenderPoolHandle};
use grammers_session::storages::SqliteSession;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::{session_file, Credentials, LOCK_FILE};
use crate::error::{Error, Result};

/// Session lock guard that ensures exclusive access to the Telegram session.
pub struct SessionLock {
    lock_file: Option<File>,
    lock_path: PathBuf,
}

impl SessionLock {
    /// Acquire an exclusive lock on the session.
    pub fn acquire() -> Result<Self> {
        Self::acquire_with_base_dir(Path::new("."))
    }

    pub fn acquire_with_base_dir(base_dir: &Path) -> Result<Self> {
        let lock_path = base_dir.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| Error::LockError(format!("Failed to open lock file: {}", e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                lock_file: Some(lock_file),
                lock_path,
            }),
            Err(_) => {
                eprintln!(
                    r#"
⚠️  The Telegram session is already in use by another process.

Wait for the other run to finish and try again.
"#
                );
                Err(Error::SessionLocked)
            }
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        if let Some(ref file) = self.lock_file {
            let _ = file.unlock();
        }
        self.lock_file = None;
        let _ = std::fs::remove_file(&self.lock_path);
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// How the client got authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// The persisted session was still valid
    Resumed,
    /// A login code (and possibly a password) was entered
    LoggedIn,
}

/// Source of the verification code and two-step password.
pub trait LoginPrompt {
    fn read_code(&mut self) -> Result<String>;
    fn read_password(&mut self, hint: Option<&str>) -> Result<String>;
}

/// Reads login input from the terminal.
pub struct StdinPrompt;

impl StdinPrompt {
    fn ask(label: &str) -> Result<String> {
        print!("{}", label);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl LoginPrompt for StdinPrompt {
    fn read_code(&mut self) -> Result<String> {
        Self::ask("Enter the code you received in Telegram: ")
    }

    fn read_password(&mut self, hint: Option<&str>) -> Result<String> {
        match hint {
            Some(hint) => Self::ask(&format!("Enter your 2FA password (hint: {}): ", hint)),
            None => Self::ask("Enter your 2FA password: "),
        }
    }
}

/// Holder for SenderPool components and Client
pub struct TelegramClient {
    pub client: Client,
    pub handle: SenderPoolHandle,
    // Never read, held so the runner keeps an open update channel.
    _updates: mpsc::UnboundedReceiver<UpdatesLike>,
    runner: tokio::task::JoinHandle<()>,
}

impl TelegramClient {
    /// Open the persisted session and start the connection runner.
    pub async fn connect(api_id: i32) -> Result<Self> {
        let path = session_file();
        let session = SqliteSession::open(&path)
            .map_err(|e| Error::Authorization(format!("Failed to open session {}: {}", path, e)))?;
        let pool = SenderPool::new(Arc::new(session), api_id);

        let client = Client::new(&pool);

        let SenderPool {
            runner,
            updates,
            handle,
        } = pool;

        let runner = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(Self {
            client,
            handle,
            _updates: updates,
            runner,
        })
    }

    /// Make sure the session is authorized, logging in interactively if needed.
    pub async fn authorize<P: LoginPrompt>(
        &self,
        credentials: &Credentials,
        prompt: &mut P,
    ) -> Result<AuthState> {
        let authorized = self
            .client
            .is_authorized()
            .await
            .map_err(|e| Error::Authorization(e.to_string()))?;
        if authorized {
            info!("Resumed existing Telegram session");
            return Ok(AuthState::Resumed);
        }

        info!("Session not authorized, requesting login code for {}", credentials.phone);
        let token = self
            .client
            .request_login_code(&credentials.phone, &credentials.api_hash)
            .await
            .map_err(|e| Error::Authorization(format!("Failed to request code: {}", e)))?;

        let code = prompt.read_code()?;

        match self.client.sign_in(&token, &code).await {
            Ok(_) => Ok(AuthState::LoggedIn),
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = prompt.read_password(password_token.hint())?;
                self.client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(|e| Error::Authorization(format!("Failed to check password: {}", e)))?;
                Ok(AuthState::LoggedIn)
            }
            Err(e) => Err(Error::Authorization(format!("Failed to sign in: {}", e))),
        }
    }

    /// Close the connection and wait for the runner to stop.
    pub async fn disconnect(self) {
        self.handle.quit();
        if let Err(err) = self.runner.await {
            tracing::warn!("Telegram runner ended abnormally: {}", err);
        }
        info!("Telegram client disconnected");
    }
}
