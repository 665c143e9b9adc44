use clap::Subcommand;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::utils::{output_error, output_notices, output_success, read_password};
use crate::cli::OutputFormat;
use crate::error::ApiError;
use crate::views::{LoginView, RegisterView};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out")]
    Logout,

    #[command(about = "Show the signed-in user")]
    Whoami,

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Renew the session now")]
    Refresh,
}

pub async fn handle(cmd: AuthCommands, ctx: &AppContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let mut view = LoginView::new(ctx);
            view.form.email = email;
            view.form.password = read_password(password, "Password")?;

            match view.submit().await {
                Some(identity) => output_success(
                    &output_format,
                    &format!("Signed in as {} ({})", identity.username, identity.role),
                    Some(json!({ "user": identity })),
                ),
                None => Err(anyhow::anyhow!("{}", joined(view.take_notices()))),
            }
        }
        AuthCommands::Logout => {
            ctx.logout().await;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Whoami => match ctx.identity() {
            Some(identity) => output_success(
                &output_format,
                &format!("{} <{}> ({})", identity.username, identity.email, identity.role),
                Some(json!({ "user": identity })),
            ),
            None => {
                output_error(&output_format, "Not signed in", Some("UNAUTHORIZED"))?;
                Err(anyhow::anyhow!("Not signed in"))
            }
        },
        AuthCommands::Register { username, email, password } => {
            let mut view = RegisterView::new(ctx);
            view.form.username = username;
            view.form.email = email;
            view.form.password = read_password(password.clone(), "Password")?;
            view.form.confirm_password = match password {
                Some(password) => password,
                None => read_password(None, "Confirm password")?,
            };

            match view.submit().await {
                Some(next) => output_success(
                    &output_format,
                    &format!("Registered. Sign in to continue ({})", next.path()),
                    Some(json!({ "next": next.path() })),
                ),
                None => {
                    let notices = view.take_notices();
                    if !view.field_errors().is_empty() {
                        let err = ApiError::validation(joined(notices.clone()), view.field_errors().clone());
                        if let OutputFormat::Json = output_format {
                            println!("{}", serde_json::to_string_pretty(&err.to_json())?);
                        }
                        for (field, message) in view.field_errors() {
                            eprintln!("  {}: {}", field, message);
                        }
                    } else {
                        output_notices(&output_format, &notices)?;
                    }
                    Err(anyhow::anyhow!("{}", joined(notices)))
                }
            }
        }
        AuthCommands::Refresh => {
            ctx.api.refresh().await?;
            output_success(&output_format, "Session renewed", None)
        }
    }
}

fn joined(notices: Vec<crate::views::Notice>) -> String {
    notices
        .iter()
        .map(|n| n.message().to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
