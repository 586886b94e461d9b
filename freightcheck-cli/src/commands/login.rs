//! `freightcheck login` command handler

use std::io::Write;

use serde::Serialize;

use freightcheck_core::auth::CredentialCache;
use freightcheck_core::role::Role;
use freightcheck_core::transport::Transport;

use crate::cli::LoginArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `login` command.
pub async fn execute<T: Transport>(
    args: LoginArgs,
    cache: &CredentialCache<T>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = login(cache, Role::from(args.role)).await?;
    writer.render(&report)?;
    Ok(())
}

/// Logs in and builds the report; the token itself never leaves this function.
pub async fn login<T: Transport>(
    cache: &CredentialCache<T>,
    role: Role,
) -> Result<LoginReport, CliError> {
    let credential = cache.get_credential(role).await?;
    Ok(LoginReport {
        role,
        role_id: credential.role_id,
        token: "***REDACTED***".to_owned(),
    })
}

#[derive(Debug, Serialize)]
pub struct LoginReport {
    pub role: Role,
    pub role_id: i64,
    pub token: String,
}

impl Render for LoginReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Login: {}", self.role.key().bold())?;
        writeln!(w, "  Result:  {}", "OK".green().bold())?;
        writeln!(w, "  Role id: {}", self.role_id)?;
        writeln!(w, "  Token:   {}", self.token)?;
        Ok(())
    }
}
