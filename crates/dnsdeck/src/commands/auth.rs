//! Sign-in, sign-out, and identity command handlers.

use std::io::{self, BufRead, Write};

use secrecy::{ExposeSecret, SecretString};

use dnsdeck_core::{Console, User};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

const PASSWORD_ENV: &str = "DNSDECK_PASSWORD";
const MIN_USERNAME_LEN: usize = 3;

// ── Input ───────────────────────────────────────────────────────────

/// Check credentials before anything is sent to the server.
pub fn validate_credentials(username: &str, password: &SecretString) -> Result<(), CliError> {
    let invalid = |field: &str, reason: &str| CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    };
    if username.trim().is_empty() {
        return Err(invalid("username", "Username is required"));
    }
    if password.expose_secret().is_empty() {
        return Err(invalid("password", "Password is required"));
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(invalid(
            "username",
            "Username must be at least 3 characters",
        ));
    }
    Ok(())
}

fn read_line(mut input: impl BufRead) -> Result<String, CliError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}

fn prompt_username() -> Result<String, CliError> {
    let mut stderr = io::stderr();
    write!(stderr, "Username: ")?;
    stderr.flush()?;
    read_line(io::stdin().lock())
}

/// Password from the environment, stdin, or an interactive prompt, in
/// that order.
fn read_password(from_stdin: bool) -> Result<SecretString, CliError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(password));
    }
    let password = if from_stdin {
        read_line(io::stdin().lock())?
    } else {
        rpassword::prompt_password("Password: ")?
    };
    Ok(SecretString::from(password))
}

fn user_detail(user: &User) -> String {
    let mut lines = vec![
        format!("Username: {}", user.username),
        format!("Role:     {}", user.role),
    ];
    for (key, value) in &user.extra {
        let value = value
            .as_str()
            .map_or_else(|| value.to_string(), str::to_owned);
        lines.push(format!("{key}: {value}"));
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn login(
    console: &Console,
    args: LoginArgs,
    global: &GlobalOpts,
    profile: &str,
) -> Result<(), CliError> {
    let username = match args.username {
        Some(username) => username,
        None => prompt_username()?,
    };
    let password = read_password(args.password_stdin)?;
    validate_credentials(&username, &password)?;

    let user = console
        .login(&username, &password)
        .await
        .map_err(|e| CliError::from_core(e, profile))?;

    let out = output::render_single(&global.output, &user, user_detail, |u| u.username.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn logout(console: &Console) {
    console.logout();
}

pub fn whoami(console: &Console, global: &GlobalOpts, profile: &str) -> Result<(), CliError> {
    let session = console.session().snapshot();
    let user = match session.user {
        Some(ref user) if session.is_authenticated() => user,
        _ => {
            return Err(CliError::NotAuthenticated {
                profile: profile.into(),
            });
        }
    };

    let out = output::render_single(&global.output, user, user_detail, |u| u.username.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
