use clap::Args;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;
use wintrack_core::{Config, Filter, Verdict, Window, WindowInfo, enumerate};

use super::CommandResult;

/// Arguments for the `list` subcommand.
#[derive(Args)]
pub struct ListArgs {
    /// Include every top-level window with its filter verdict
    #[arg(long)]
    all: bool,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Record {
    #[serde(flatten)]
    info: WindowInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<String>,
}

pub fn execute(args: &ListArgs, config: &Config) -> CommandResult {
    let platform = super::platform()?;
    let filter = Filter::from_config(config);

    let entries: Vec<(Window, Option<Verdict>)> = if args.all {
        enumerate::evaluate_all(&platform, &filter)?
            .into_iter()
            .map(|(window, verdict)| (window, Some(verdict)))
            .collect()
    } else {
        enumerate::list_windows(&platform, &filter)?
            .into_iter()
            .map(|window| (window, None))
            .collect()
    };

    // Windows closing between enumeration and snapshot are skipped.
    let records: Vec<Record> = entries
        .into_iter()
        .filter_map(|(window, verdict)| {
            Some(Record {
                info: window.snapshot().ok()?,
                verdict: verdict.map(|v| v.to_string()),
            })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    print_table(&records, args.all);
    Ok(())
}

fn print_table(records: &[Record], with_verdict: bool) {
    let mut header = vec![
        Cell::new("Handle"),
        Cell::new("Title"),
        Cell::new("Class"),
        Cell::new("Process"),
        Cell::new("Width").set_alignment(CellAlignment::Right),
        Cell::new("Height").set_alignment(CellAlignment::Right),
        Cell::new("State"),
    ];
    if with_verdict {
        header.push(Cell::new("Verdict"));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for record in records {
        let info = &record.info;
        let mut row = vec![
            Cell::new(info.handle),
            Cell::new(&info.title),
            Cell::new(&info.class_name),
            Cell::new(&info.process_name),
            Cell::new(info.rect.width).set_alignment(CellAlignment::Right),
            Cell::new(info.rect.height).set_alignment(CellAlignment::Right),
            Cell::new(info.state),
        ];
        if let Some(verdict) = &record.verdict {
            row.push(Cell::new(verdict));
        }
        table.add_row(row);
    }

    println!("{table}");
    println!("\n{} windows found", records.len());
}
