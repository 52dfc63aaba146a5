use jotwall_core::auth::{Session, SignUpOutcome};

use crate::auth::clear_stored_session;
use crate::cli::AuthCommands;
use crate::commands::common::{build_hub, open_hub};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login {
            profile,
            email,
            password,
        } => {
            let (hub, profile_name) = build_hub(profile.as_deref().or(global_profile))?;
            let session = hub.sign_in(&email, &password).await?;
            println!(
                "Signed in profile '{profile_name}' as {} ({} notes)",
                email_label(&session),
                hub.store().len()
            );
            Ok(())
        }
        AuthCommands::Signup {
            profile,
            email,
            password,
        } => {
            let (hub, profile_name) = build_hub(profile.as_deref().or(global_profile))?;
            match hub.sign_up(&email, &password).await? {
                SignUpOutcome::SignedIn(session) => {
                    println!(
                        "Created account and signed in profile '{profile_name}' as {}",
                        email_label(&session)
                    );
                }
                SignUpOutcome::ConfirmationRequired => {
                    println!("Check your email for the confirmation link, then run `jotwall auth login`.");
                }
            }
            Ok(())
        }
        AuthCommands::Status { profile } => {
            let (hub, profile_name) = open_hub(profile.as_deref().or(global_profile)).await?;
            if let Some(session) = hub.current() {
                println!(
                    "Profile '{}' is signed in as {} (expires_at={}, {} notes)",
                    profile_name,
                    email_label(&session),
                    session.expires_at,
                    hub.store().len()
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout { profile } => {
            let (hub, profile_name) = build_hub(profile.as_deref().or(global_profile))?;
            let signed_out = match hub.initialize().await {
                Ok(Some(_)) => hub.sign_out().await,
                Ok(None) => Ok(()),
                Err(error) => Err(error),
            };
            if let Err(error) = signed_out {
                tracing::warn!("Remote sign-out failed, clearing local session: {}", error);
                clear_stored_session(&profile_name)?;
            }

            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}

fn email_label(session: &Session) -> &str {
    session.user.email.as_deref().unwrap_or("(no email)")
}
