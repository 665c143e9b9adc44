use serde_json::{json, Value};
use std::io::{BufRead, Write};

use crate::app::{AppContext, Screen, Shell};
use crate::cli::OutputFormat;
use crate::guard::Route;
use crate::views::{Notice, Table, View, ACCESS_DENIED};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Alerts go to stderr in text mode so they never mix with table output.
pub fn output_notices(output_format: &OutputFormat, notices: &[Notice]) -> anyhow::Result<()> {
    if notices.is_empty() {
        return Ok(());
    }
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "notices": notices }))?);
        }
        OutputFormat::Text => {
            for notice in notices {
                eprintln!("! {}", notice.message());
            }
        }
    }
    Ok(())
}

pub fn output_tables(output_format: &OutputFormat, tables: &[Table]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "tables": tables }))?);
        }
        OutputFormat::Text => {
            for (i, table) in tables.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", render_table(table));
            }
        }
    }
    Ok(())
}

/// Plain aligned columns, one line per row.
pub fn render_table(table: &Table) -> String {
    let mut out = format!("{}\n", table.title);
    if table.rows.is_empty() {
        out.push_str(&format!("  {}\n", table.empty_message));
        return out;
    }

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("  {}\n", padded.join("  ").trim_end())
    };

    out.push_str(&line(&table.headers));
    for row in &table.rows {
        out.push_str(&line(row));
    }
    out
}

/// Run the route guard for a command that needs a screen. Refuses with the
/// same wording the screens use.
pub fn enter(ctx: &AppContext, route: Route) -> anyhow::Result<()> {
    let mut shell = Shell::new(ctx.clone());
    match shell.navigate(route.path()) {
        Screen::View(shown) if shown == route => Ok(()),
        Screen::AccessDenied { .. } => Err(anyhow::anyhow!(
            "{}: {} requires a different role",
            ACCESS_DENIED,
            route.path()
        )),
        Screen::Login | Screen::Register => Err(anyhow::anyhow!(
            "Not signed in. Run `shop-admin auth login <email>` first"
        )),
        other => Err(anyhow::anyhow!("Cannot open {}: {:?}", route.path(), other)),
    }
}

/// Print what a view produced. A failed operation turns its alerts into
/// the command's error.
pub fn finish_view(
    output_format: &OutputFormat,
    view: &mut dyn View,
    succeeded: bool,
    message: &str,
) -> anyhow::Result<()> {
    let notices = view.take_notices();
    if !succeeded {
        let reason = notices
            .iter()
            .map(Notice::message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(anyhow::anyhow!("{}", reason));
    }
    output_notices(output_format, &notices)?;
    output_success(output_format, message, None)
}

/// Use the flag when given, otherwise read one line from stdin.
pub fn read_password(provided: Option<String>, prompt: &str) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }
    eprint!("{}: ", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
