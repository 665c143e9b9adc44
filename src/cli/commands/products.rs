use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::app::AppContext;
use crate::cli::utils::{enter, finish_view, output_notices, output_tables};
use crate::cli::OutputFormat;
use crate::guard::Route;
use crate::http::FilePart;
use crate::types::RecordId;
use crate::views::{ProductsView, View};

#[derive(Subcommand)]
pub enum ProductsCommands {
    #[command(about = "List products")]
    List {
        #[arg(long, help = "Match product name")]
        search: Option<String>,
        #[arg(long, help = "Category id")]
        category: Option<RecordId>,
    },

    #[command(about = "List product categories")]
    Categories,

    #[command(about = "Create a product")]
    Create {
        name: String,
        #[arg(long)]
        price: String,
        #[arg(long, help = "Category id")]
        category: RecordId,
        #[arg(long, help = "Image file to upload")]
        image: Option<PathBuf>,
    },

    #[command(about = "Update a product")]
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long, help = "Category id")]
        category: Option<RecordId>,
        #[arg(long, help = "Replacement image file")]
        image: Option<PathBuf>,
    },

    #[command(about = "Delete a product (admin only)")]
    Delete { id: RecordId },
}

fn read_image(path: &Path) -> anyhow::Result<FilePart> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Cannot read image {}: {}", path.display(), e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    let mime = match extension.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        _ => None,
    };
    Ok(FilePart {
        file_name,
        mime: mime.map(str::to_string),
        bytes,
    })
}

pub async fn handle(cmd: ProductsCommands, ctx: &AppContext, output_format: OutputFormat) -> anyhow::Result<()> {
    enter(ctx, Route::Products)?;
    let mut view = ProductsView::new(ctx);

    match cmd {
        ProductsCommands::List { search, category } => {
            let filters = view.filters_mut();
            filters.search = search;
            filters.category = category.map(|id| id.to_string());
            view.refresh().await;
            output_notices(&output_format, &view.take_notices())?;
            output_tables(&output_format, &view.tables())
        }
        ProductsCommands::Categories => {
            view.load_categories().await;
            output_notices(&output_format, &view.take_notices())?;
            let mut table = crate::views::Table::new("Categories", &["ID", "Name"], "No categories");
            for category in view.categories() {
                table.push(vec![category.id.to_string(), category.name.clone()]);
            }
            output_tables(&output_format, &[table])
        }
        ProductsCommands::Create { name, price, category, image } => {
            view.form.name = name;
            view.form.price = price;
            view.form.category_id = Some(category);
            view.form.image = image.as_deref().map(read_image).transpose()?;
            let created = view.submit().await;
            finish_view(&output_format, &mut view, created, "Product created")
        }
        ProductsCommands::Update { id, name, price, category, image } => {
            view.load().await;
            let updated = if view.begin_edit(id) {
                if let Some(name) = name {
                    view.form.name = name;
                }
                if let Some(price) = price {
                    view.form.price = price;
                }
                if category.is_some() {
                    view.form.category_id = category;
                }
                view.form.image = image.as_deref().map(read_image).transpose()?;
                view.submit().await
            } else {
                false
            };
            finish_view(&output_format, &mut view, updated, &format!("Product {} updated", id))
        }
        ProductsCommands::Delete { id } => {
            let deleted = view.delete(id).await;
            finish_view(&output_format, &mut view, deleted, &format!("Product {} deleted", id))
        }
    }
}
