use serde_json::json;

use crate::app::{AppContext, Screen, Shell};
use crate::cli::utils::{output_notices, output_success, output_tables};
use crate::cli::OutputFormat;
use crate::views::ACCESS_DENIED;

/// Resolve a path the way the app would and show what the screen holds.
pub async fn handle(path: &str, ctx: &AppContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut shell = Shell::new(ctx.clone());
    let screen = shell.navigate(path);
    let navbar = shell.navbar();
    let sidebar: Vec<&str> = shell.sidebar().iter().map(|r| r.path()).collect();

    let summary = json!({
        "path": shell.path(),
        "user": navbar.username,
        "role": navbar.role,
        "sidebar": sidebar,
    });

    match screen {
        Screen::Loading => output_success(&output_format, "Loading...", Some(summary)),
        Screen::Login => output_success(&output_format, "Login: run `shop-admin auth login <email>`", Some(summary)),
        Screen::Register => output_success(
            &output_format,
            "Sign Up: run `shop-admin auth register <username> <email>`",
            Some(summary),
        ),
        Screen::AccessDenied { requested, fallback } => {
            output_success(
                &output_format,
                &format!(
                    "{}: {} is not available to {}. Go to {}",
                    ACCESS_DENIED,
                    requested.path(),
                    navbar.role,
                    fallback.path()
                ),
                Some(summary),
            )
        }
        Screen::View(route) => {
            let Some(mut view) = shell.view_for(route) else {
                return output_success(&output_format, route.label(), Some(summary));
            };
            if let OutputFormat::Text = output_format {
                println!("{} | {} ({}) | {}", view.title(), navbar.username, navbar.role, sidebar.join(" "));
            }
            view.load().await;
            output_notices(&output_format, &view.take_notices())?;
            output_tables(&output_format, &view.tables())
        }
    }
}
