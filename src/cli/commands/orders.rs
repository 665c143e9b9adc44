use clap::Subcommand;

use crate::app::AppContext;
use crate::cli::utils::{enter, finish_view, output_notices, output_tables};
use crate::cli::OutputFormat;
use crate::guard::Route;
use crate::types::{OrderStatus, RecordId};
use crate::views::{OrdersView, View};

#[derive(Subcommand)]
pub enum OrdersCommands {
    #[command(about = "List orders")]
    List {
        #[arg(long, help = "Match customer name or email")]
        search: Option<String>,
        #[arg(long, help = "pending, shipped, delivered or cancelled")]
        status: Option<OrderStatus>,
    },

    #[command(about = "Create an order")]
    Create {
        #[arg(long, help = "Customer id")]
        customer: RecordId,
        #[arg(long, default_value = "pending")]
        status: OrderStatus,
    },

    #[command(about = "Update an order")]
    Update {
        id: RecordId,
        #[arg(long, help = "Customer id")]
        customer: Option<RecordId>,
        #[arg(long)]
        status: Option<OrderStatus>,
    },

    #[command(about = "Delete an order (admin only)")]
    Delete { id: RecordId },
}

pub async fn handle(cmd: OrdersCommands, ctx: &AppContext, output_format: OutputFormat) -> anyhow::Result<()> {
    enter(ctx, Route::Orders)?;
    let mut view = OrdersView::new(ctx);

    match cmd {
        OrdersCommands::List { search, status } => {
            let filters = view.filters_mut();
            filters.search = search;
            filters.status = status.map(|s| s.as_str().to_string());
            view.refresh().await;
            output_notices(&output_format, &view.take_notices())?;
            output_tables(&output_format, &view.tables())
        }
        OrdersCommands::Create { customer, status } => {
            view.form.customer_id = Some(customer);
            view.form.status = status;
            let created = view.submit().await;
            finish_view(&output_format, &mut view, created, "Order created")
        }
        OrdersCommands::Update { id, customer, status } => {
            view.refresh().await;
            let updated = if view.begin_edit(id) {
                if customer.is_some() {
                    view.form.customer_id = customer;
                }
                if let Some(status) = status {
                    view.form.status = status;
                }
                view.submit().await
            } else {
                false
            };
            finish_view(&output_format, &mut view, updated, &format!("Order {} updated", id))
        }
        OrdersCommands::Delete { id } => {
            let deleted = view.delete(id).await;
            finish_view(&output_format, &mut view, deleted, &format!("Order {} deleted", id))
        }
    }
}
