use clap::Subcommand;

use crate::app::AppContext;
use crate::cli::utils::{enter, finish_view, output_notices, output_tables};
use crate::cli::OutputFormat;
use crate::guard::Route;
use crate::types::RecordId;
use crate::views::{CustomersView, View};

#[derive(Subcommand)]
pub enum CustomersCommands {
    #[command(about = "List customers")]
    List {
        #[arg(long, help = "Match name or email")]
        search: Option<String>,
    },

    #[command(about = "Create a customer")]
    Create {
        name: String,
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },

    #[command(about = "Update a customer")]
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    #[command(about = "Delete a customer (admin only)")]
    Delete { id: RecordId },
}

pub async fn handle(cmd: CustomersCommands, ctx: &AppContext, output_format: OutputFormat) -> anyhow::Result<()> {
    enter(ctx, Route::Customers)?;
    let mut view = CustomersView::new(ctx);

    match cmd {
        CustomersCommands::List { search } => {
            view.filters_mut().search = search;
            view.refresh().await;
            output_notices(&output_format, &view.take_notices())?;
            output_tables(&output_format, &view.tables())
        }
        CustomersCommands::Create { name, email, phone } => {
            view.form.name = name;
            view.form.email = email;
            view.form.phone = phone.unwrap_or_default();
            let created = view.submit().await;
            finish_view(&output_format, &mut view, created, "Customer created")
        }
        CustomersCommands::Update { id, name, email, phone } => {
            view.refresh().await;
            let updated = if view.begin_edit(id) {
                if let Some(name) = name {
                    view.form.name = name;
                }
                if let Some(email) = email {
                    view.form.email = email;
                }
                if let Some(phone) = phone {
                    view.form.phone = phone;
                }
                view.submit().await
            } else {
                false
            };
            finish_view(&output_format, &mut view, updated, &format!("Customer {} updated", id))
        }
        CustomersCommands::Delete { id } => {
            let deleted = view.delete(id).await;
            finish_view(&output_format, &mut view, deleted, &format!("Customer {} deleted", id))
        }
    }
}
