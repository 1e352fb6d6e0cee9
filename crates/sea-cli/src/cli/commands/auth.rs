//! Auth command handlers.

use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result};
use sea_core::api::SeaClient;
use sea_core::session::mask_token;

pub async fn login(client: &SeaClient, email: &str, password: Option<String>) -> Result<()> {
    if let Some(existing) = client.token() {
        println!(
            "Replacing existing session (token: {})",
            mask_token(&existing)
        );
    }

    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    let user = client
        .authenticate(email, &password)
        .await
        .with_context(|| format!("log in as {email}"))?;

    println!("Logged in as {}", user.display_name);
    Ok(())
}

/// Reads the password, hidden when stdin is a terminal.
fn read_password() -> Result<String> {
    let stdin = io::stdin();
    let password = if stdin.is_terminal() {
        rpassword::prompt_password("Password: ").context("read password from terminal")?
    } else {
        read_password_line(stdin.lock())?
    };

    if password.is_empty() {
        anyhow::bail!("No password given. Use --password, SEA_PASSWORD, or stdin.");
    }
    Ok(password)
}

/// Reads a single line from piped input, without its line ending.
fn read_password_line(mut reader: impl BufRead) -> Result<String> {
    let mut input = String::new();
    reader
        .read_line(&mut input)
        .context("read password from stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

pub fn logout(client: &SeaClient) {
    if !client.is_authenticated() {
        println!("Not logged in.");
        return;
    }

    client.clear_token();
    println!("Logged out.");
}

pub fn status(client: &SeaClient) {
    match client.token() {
        Some(token) => println!("Logged in (token: {})", mask_token(&token)),
        None => println!("Not logged in"),
    }
}
