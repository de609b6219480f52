//! 账号命令

use crate::backends::{AuthBackend, RemoteStore};
use crate::models::SignUpOutcome;
use crate::services::AuthService;
use anyhow::Result;
use std::io::Write;

pub const CONFIRM_EMAIL: &str =
    "Please check your email to confirm your account before signing in.";

pub async fn signup<A, W>(
    auth: &mut AuthService<A>,
    email: &str,
    password: &str,
    confirm_password: &str,
    out: &mut W,
) -> Result<()>
where
    A: AuthBackend + ?Sized,
    W: Write,
{
    match auth.sign_up(email, password, confirm_password).await? {
        SignUpOutcome::SignedIn(session) => {
            let email = session.user.email.as_deref().unwrap_or(email);
            writeln!(out, "Account created. Signed in as {email}.")?;
        }
        SignUpOutcome::ConfirmationRequired(_) => writeln!(out, "{CONFIRM_EMAIL}")?,
    }
    Ok(())
}

pub async fn login<A, W>(
    auth: &mut AuthService<A>,
    email: &str,
    password: &str,
    out: &mut W,
) -> Result<()>
where
    A: AuthBackend + ?Sized,
    W: Write,
{
    let session = auth.sign_in(email, password).await?;
    let shown = session.user.email.as_deref().unwrap_or(&session.user.id);
    writeln!(out, "Signed in as {shown}.")?;
    Ok(())
}

pub async fn logout<A, W>(auth: &mut AuthService<A>, out: &mut W) -> Result<()>
where
    A: AuthBackend + ?Sized,
    W: Write,
{
    auth.sign_out().await?;
    writeln!(out, "Signed out.")?;
    Ok(())
}

pub async fn whoami<A, W>(auth: &mut AuthService<A>, out: &mut W) -> Result<()>
where
    A: AuthBackend + ?Sized,
    W: Write,
{
    let user = auth.fetch_user().await?;
    writeln!(out, "Email: {}", user.email.as_deref().unwrap_or("-"))?;
    writeln!(out, "User ID: {}", user.id)?;
    Ok(())
}

pub async fn passwd<A, W>(
    auth: &AuthService<A>,
    new_password: &str,
    confirm_password: &str,
    out: &mut W,
) -> Result<()>
where
    A: AuthBackend + ?Sized,
    W: Write,
{
    let message = auth.change_password(new_password, confirm_password).await?;
    writeln!(out, "{message}")?;
    Ok(())
}

/// Destructive: only runs when `yes` is set or `confirm` agrees.
pub async fn delete_account<A, R, W, C>(
    auth: &mut AuthService<A>,
    remote: &R,
    yes: bool,
    confirm: C,
    out: &mut W,
) -> Result<()>
where
    A: AuthBackend + ?Sized,
    R: RemoteStore + ?Sized,
    W: Write,
    C: FnOnce(&str) -> Result<bool>,
{
    auth.require_session()?;
    if !yes && !confirm("Are you sure you want to permanently delete your account?")? {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }
    auth.delete_account(remote).await?;
    writeln!(out, "Account deleted.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryStore;
    use std::sync::Arc;

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_login_whoami_logout() {
        let backend =
            Arc::new(MemoryStore::new().with_user("user-1", "ada@example.com", "secret1"));
        let mut auth = AuthService::new(backend.clone());

        let mut out = Vec::new();
        login(&mut auth, "ada@example.com", "secret1", &mut out)
            .await
            .unwrap();
        assert_eq!(output(out).trim(), "Signed in as ada@example.com.");

        let mut out = Vec::new();
        whoami(&mut auth, &mut out).await.unwrap();
        assert!(output(out).contains("User ID: user-1"));

        let mut out = Vec::new();
        logout(&mut auth, &mut out).await.unwrap();
        assert_eq!(output(out).trim(), "Signed out.");

        let err = whoami(&mut auth, &mut Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Not signed in");
    }

    #[tokio::test]
    async fn test_signup_confirmation_message() {
        let backend = Arc::new(MemoryStore::new().with_email_confirmation());
        let mut auth = AuthService::new(backend);
        let mut out = Vec::new();
        signup(&mut auth, "bob@example.com", "secret1", "secret1", &mut out)
            .await
            .unwrap();
        assert_eq!(output(out).trim(), CONFIRM_EMAIL);
    }

    #[tokio::test]
    async fn test_passwd() {
        let backend =
            Arc::new(MemoryStore::new().with_user("user-1", "ada@example.com", "secret1"));
        let mut auth = AuthService::new(backend.clone());
        auth.sign_in("ada@example.com", "secret1").await.unwrap();

        let mut out = Vec::new();
        passwd(&auth, "secret9", "secret9", &mut out).await.unwrap();
        assert_eq!(output(out).trim(), "Password updated successfully");

        let err = passwd(&auth, "secret9", "secret8", &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[tokio::test]
    async fn test_delete_account_confirmation() {
        let backend =
            Arc::new(MemoryStore::new().with_user("user-1", "ada@example.com", "secret1"));
        let mut auth = AuthService::new(backend.clone());
        auth.sign_in("ada@example.com", "secret1").await.unwrap();

        let mut out = Vec::new();
        delete_account(&mut auth, backend.as_ref(), false, |_| Ok(false), &mut out)
            .await
            .unwrap();
        assert_eq!(output(out).trim(), "Cancelled.");
        assert!(backend.has_profile("user-1"));

        let mut out = Vec::new();
        delete_account(&mut auth, backend.as_ref(), true, |_| Ok(false), &mut out)
            .await
            .unwrap();
        assert_eq!(output(out).trim(), "Account deleted.");
        assert!(!backend.has_profile("user-1"));
        assert!(auth.current_session().is_none());
    }

    #[tokio::test]
    async fn test_delete_account_confirmation_error_keeps_account() {
        let backend =
            Arc::new(MemoryStore::new().with_user("user-1", "ada@example.com", "secret1"));
        let mut auth = AuthService::new(backend.clone());
        auth.sign_in("ada@example.com", "secret1").await.unwrap();

        let result = delete_account(
            &mut auth,
            backend.as_ref(),
            false,
            |_| Err(anyhow::anyhow!("not a terminal")),
            &mut Vec::new(),
        )
        .await;
        assert!(result.is_err());
        assert!(backend.has_profile("user-1"));
        assert!(auth.current_session().is_some());
    }
}
