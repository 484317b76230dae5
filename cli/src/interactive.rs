use anyhow::Result;
use inquire::{Confirm, Password, Text};
use roaya_types::LoginCredentials;

pub fn prompt_credentials(email: Option<String>) -> Result<LoginCredentials> {
    let email = match email {
        Some(email) => email,
        None => Text::new("Email:").prompt()?,
    };
    let password = Password::new("Password:")
        .without_confirmation()
        .prompt()?;
    Ok(LoginCredentials { email, password })
}

pub fn confirm_delete(what: &str) -> Result<bool> {
    let confirmed = Confirm::new(&format!("Delete {what}?"))
        .with_default(false)
        .prompt()?;
    Ok(confirmed)
}
