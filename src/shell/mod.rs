//! Interactive menu loop.
//!
//! Owns the [`SessionContext`]: the menu shown depends on whether a user is
//! logged in, and a session-expired error from any call drops back to the
//! signed-out menu.

pub mod render;

use anyhow::Result;
use colored::*;
use dialoguer::{Confirm, Input, Password, Select};
use url_shortener_client::ApiClient;
use url_shortener_client::ApiError;
use url_shortener_client::api::dto::{LoginCredentials, SignupData, UpdateProfile};
use url_shortener_client::domain::entities::UrlSort;
use url_shortener_client::domain::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    LogIn,
    SignUp,
    Shorten,
    ShortenCustom,
    Resolve,
    ListUrls,
    Analytics,
    DeleteUrl,
    EditProfile,
    LogOut,
    Quit,
}

impl Action {
    const SIGNED_OUT: [Self; 5] = [
        Self::LogIn,
        Self::SignUp,
        Self::Shorten,
        Self::Resolve,
        Self::Quit,
    ];

    const SIGNED_IN: [Self; 9] = [
        Self::Shorten,
        Self::ShortenCustom,
        Self::Resolve,
        Self::ListUrls,
        Self::Analytics,
        Self::DeleteUrl,
        Self::EditProfile,
        Self::LogOut,
        Self::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::LogIn => "Log in",
            Self::SignUp => "Sign up",
            Self::Shorten => "Shorten a URL",
            Self::ShortenCustom => "Shorten with a custom ID",
            Self::Resolve => "Look up a short link",
            Self::ListUrls => "My URLs",
            Self::Analytics => "Visit analytics",
            Self::DeleteUrl => "Delete a URL",
            Self::EditProfile => "Edit profile",
            Self::LogOut => "Log out",
            Self::Quit => "Quit",
        }
    }

    fn menu(signed_in: bool) -> &'static [Self] {
        if signed_in {
            &Self::SIGNED_IN
        } else {
            &Self::SIGNED_OUT
        }
    }
}

/// Runs the menu loop until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read from. API failures are
/// reported inline and never end the loop.
pub async fn run(client: &ApiClient) -> Result<()> {
    let mut session = SessionContext::new();

    println!("{}", "URL Shortener".bright_blue().bold());
    sync_session(client, &mut session).await;

    loop {
        greet(&session);

        let action = choose_action(session.is_authenticated())?;
        if action == Action::Quit {
            break;
        }

        if let Err(err) = perform(client, &mut session, action).await {
            match err.downcast::<ApiError>() {
                Ok(api_err) => report(&mut session, &api_err),
                Err(other) => return Err(other),
            }
        }
        println!();
    }

    println!("{}", "Bye!".bright_white());
    Ok(())
}

fn greet(session: &SessionContext) {
    match session.user() {
        Some(user) => println!(
            "{} {} <{}>",
            "Logged in as".bright_white(),
            user.name.bright_green().bold(),
            user.email.cyan()
        ),
        None => println!("{}", "Not logged in".yellow()),
    }
}

fn choose_action(signed_in: bool) -> Result<Action> {
    let actions = Action::menu(signed_in);
    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

    let selection = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels[..])
        .default(0)
        .interact()?;

    Ok(actions[selection])
}

async fn perform(client: &ApiClient, session: &mut SessionContext, action: Action) -> Result<()> {
    match action {
        Action::LogIn => log_in(client, session).await,
        Action::SignUp => sign_up(client, session).await,
        Action::Shorten => shorten(client).await,
        Action::ShortenCustom => shorten_custom(client).await,
        Action::Resolve => resolve(client).await,
        Action::ListUrls => list_urls(client).await,
        Action::Analytics => show_analytics(client).await,
        Action::DeleteUrl => delete_url(client).await,
        Action::EditProfile => edit_profile(client, session).await,
        Action::LogOut => log_out(client, session).await,
        Action::Quit => Ok(()),
    }
}

/// Aligns the local session with the server's view of the cookies.
async fn sync_session(client: &ApiClient, session: &mut SessionContext) {
    match client.auth().get_current_user().await {
        Ok(Some(user)) => session.set_session(user),
        Ok(None) => session.clear_session(),
        Err(err) => {
            tracing::warn!(error = %err, "Could not determine the current user");
            println!("{} {}", "⚠️ ".yellow(), err.message.yellow());
        }
    }
}

fn report(session: &mut SessionContext, err: &ApiError) {
    if err.is_session_expired() {
        session.clear_session();
        println!("{} {}", "🔒".yellow(), err.message.yellow().bold());
    } else {
        println!("{} {}", "✗".red().bold(), err.message.red());
    }
}

async fn log_in(client: &ApiClient, session: &mut SessionContext) -> Result<()> {
    let credentials = LoginCredentials {
        email: Input::<String>::new().with_prompt("Email").interact_text()?,
        password: Password::new().with_prompt("Password").interact()?,
    };

    match client.auth().login(&credentials).await? {
        Some(user) => session.set_session(user),
        None => sync_session(client, session).await,
    }

    if session.is_authenticated() {
        println!("{}", "✓ Logged in".green().bold());
    }
    Ok(())
}

async fn sign_up(client: &ApiClient, session: &mut SessionContext) -> Result<()> {
    let data = SignupData {
        name: Input::<String>::new().with_prompt("Name").interact_text()?,
        email: Input::<String>::new().with_prompt("Email").interact_text()?,
        password: Password::new()
            .with_prompt("Password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?,
    };

    client.auth().signup(&data).await?;
    println!("{}", "✓ Account created".green().bold());

    let credentials = LoginCredentials {
        email: data.email,
        password: data.password,
    };
    match client.auth().login(&credentials).await? {
        Some(user) => session.set_session(user),
        None => sync_session(client, session).await,
    }
    Ok(())
}

async fn shorten(client: &ApiClient) -> Result<()> {
    let url: String = Input::new().with_prompt("Long URL").interact_text()?;

    let short_id = client.urls().generate_random_short_id(&url).await?;
    render::print_created(client, &short_id);
    Ok(())
}

async fn shorten_custom(client: &ApiClient) -> Result<()> {
    let url: String = Input::new().with_prompt("Long URL").interact_text()?;
    let custom: String = Input::new().with_prompt("Custom short ID").interact_text()?;

    let short_id = client.urls().generate_custom_short_id(&url, &custom).await?;
    render::print_created(client, &short_id);
    Ok(())
}

async fn resolve(client: &ApiClient) -> Result<()> {
    let short_id: String = Input::new().with_prompt("Short ID").interact_text()?;

    let destination = client.urls().resolve_short_id(&short_id).await?;
    println!("{} {}", "→".bright_white(), destination.cyan());
    Ok(())
}

async fn list_urls(client: &ApiClient) -> Result<()> {
    let labels: Vec<&str> = UrlSort::ALL.iter().map(|s| s.label()).collect();
    let selection = Select::new()
        .with_prompt("Sort by")
        .items(&labels[..])
        .default(0)
        .interact()?;

    let urls = client.users().list_urls_sorted(UrlSort::ALL[selection]).await?;
    render::print_urls(client, &urls);
    Ok(())
}

async fn show_analytics(client: &ApiClient) -> Result<()> {
    let short_id: String = Input::new().with_prompt("Short ID").interact_text()?;

    let visits = client.urls().get_analytics(&short_id).await?;
    render::print_visits(&short_id, &visits);
    Ok(())
}

async fn delete_url(client: &ApiClient) -> Result<()> {
    let short_id: String = Input::new().with_prompt("Short ID").interact_text()?;

    let confirmed = Confirm::new()
        .with_prompt(format!("Delete '{}'? This cannot be undone", short_id.trim()))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}", "Cancelled".yellow());
        return Ok(());
    }

    client.urls().delete_url(&short_id).await?;
    println!("{}", "✓ Deleted".green().bold());
    Ok(())
}

async fn edit_profile(client: &ApiClient, session: &mut SessionContext) -> Result<()> {
    println!("{}", "Leave a field empty to keep it unchanged.".bright_black());

    let name: String = Input::new()
        .with_prompt("New name")
        .allow_empty(true)
        .interact_text()?;
    let email: String = Input::new()
        .with_prompt("New email")
        .allow_empty(true)
        .interact_text()?;
    let password = Password::new()
        .with_prompt("New password")
        .allow_empty_password(true)
        .interact()?;

    let update = UpdateProfile {
        name: filled(name),
        email: filled(email),
        password: (!password.is_empty()).then_some(password),
    };
    if update.is_empty() {
        println!("{}", "Nothing to update".yellow());
        return Ok(());
    }

    match client.auth().update_profile(&update).await? {
        Some(user) => session.set_session(user),
        None => sync_session(client, session).await,
    }
    println!("{}", "✓ Profile updated".green().bold());
    Ok(())
}

async fn log_out(client: &ApiClient, session: &mut SessionContext) -> Result<()> {
    client.logout().await?;
    session.clear_session();
    println!("{}", "✓ Logged out".green().bold());
    Ok(())
}

fn filled(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menus() {
        assert_eq!(Action::menu(false).first(), Some(&Action::LogIn));
        assert!(!Action::menu(false).contains(&Action::LogOut));

        let signed_in = Action::menu(true);
        assert!(signed_in.contains(&Action::LogOut));
        assert!(!signed_in.contains(&Action::LogIn));
        assert_eq!(signed_in.last(), Some(&Action::Quit));
    }

    #[test]
    fn test_filled() {
        assert_eq!(filled("  Bob ".to_string()), Some("Bob".to_string()));
        assert_eq!(filled("   ".to_string()), None);
    }
}
