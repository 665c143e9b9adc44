use clap::Subcommand;

use crate::app::AppContext;
use crate::cli::utils::{enter, finish_view, output_notices, output_tables, read_password};
use crate::cli::OutputFormat;
use crate::guard::Route;
use crate::types::{RecordId, Role};
use crate::views::{UsersView, View};

#[derive(Subcommand)]
pub enum UsersCommands {
    #[command(about = "List users")]
    List {
        #[arg(long, help = "Match username or email")]
        search: Option<String>,
        #[arg(long, help = "admin, editor or viewer")]
        role: Option<Role>,
    },

    #[command(about = "Create a user")]
    Create {
        username: String,
        email: String,
        #[arg(long)]
        role: Role,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Update a user's username, email or role")]
    Update {
        id: RecordId,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },

    #[command(about = "Delete a user")]
    Delete { id: RecordId },
}

pub async fn handle(cmd: UsersCommands, ctx: &AppContext, output_format: OutputFormat) -> anyhow::Result<()> {
    enter(ctx, Route::Users)?;
    let mut view = UsersView::new(ctx);

    match cmd {
        UsersCommands::List { search, role } => {
            let filters = view.filters_mut();
            filters.search = search;
            filters.role = role.map(|r| r.as_str().to_string());
            view.refresh().await;
            output_notices(&output_format, &view.take_notices())?;
            output_tables(&output_format, &view.tables())
        }
        UsersCommands::Create { username, email, role, password } => {
            view.form.username = username;
            view.form.email = email;
            view.form.role = Some(role);
            view.form.password = read_password(password, "Password")?;
            let created = view.submit().await;
            finish_view(&output_format, &mut view, created, "User created")
        }
        UsersCommands::Update { id, username, email, role } => {
            view.refresh().await;
            let found = view.begin_edit(id);
            let updated = if found {
                if let Some(username) = username {
                    view.form.username = username;
                }
                if let Some(email) = email {
                    view.form.email = email;
                }
                if role.is_some() {
                    view.form.role = role;
                }
                view.submit().await
            } else {
                false
            };
            finish_view(&output_format, &mut view, updated, &format!("User {} updated", id))
        }
        UsersCommands::Delete { id } => {
            let deleted = view.delete(id).await;
            finish_view(&output_format, &mut view, deleted, &format!("User {} deleted", id))
        }
    }
}
