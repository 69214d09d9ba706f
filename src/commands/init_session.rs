//! Session initialization command
//!
//! Logs in once so later scraping runs can resume the persisted session
//! without prompting.

use crate::config::{session_file, Credentials};
use crate::error::Result;
use crate::session::{AuthState, SessionLock, StdinPrompt, TelegramClient};

pub async fn run() -> Result<AuthState> {
    let credentials = Credentials::load()?;
    let _lock = SessionLock::acquire()?;

    println!("🔄 Connecting to Telegram as {}...", credentials.phone);
    let client = TelegramClient::connect(credentials.api_id).await?;

    let state = client.authorize(&credentials, &mut StdinPrompt).await;
    client.disconnect().await;
    let state = state?;

    match state {
        AuthState::Resumed => println!("✅ Session '{}' is already authorized.", session_file()),
        AuthState::LoggedIn => println!(
            "✅ Session created: {}\n   Keep this file private, it grants access to the account.",
            session_file()
        ),
    }

    Ok(state)
}
