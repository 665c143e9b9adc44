use crate::app::AppContext;
use crate::cli::utils::{enter, output_notices, output_tables};
use crate::cli::OutputFormat;
use crate::guard::Route;
use crate::views::{DashboardView, View};

pub async fn handle(ctx: &AppContext, output_format: OutputFormat) -> anyhow::Result<()> {
    enter(ctx, Route::Dashboard)?;
    let mut view = DashboardView::new(ctx);
    view.load().await;
    // A failed widget is reported but the rest still prints.
    output_notices(&output_format, &view.take_notices())?;
    output_tables(&output_format, &view.tables())
}
