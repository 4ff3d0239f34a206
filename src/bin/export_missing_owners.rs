//! Writes the leads without a contact owner for a period to an xlsx file.
//!
//! Usage: `export_missing_owners <input> <year> [month] [output.xlsx]`

use lead_report::config::Config;
use lead_report::export::{missing_contact_owner_xlsx, MISSING_OWNER_FILENAME};
use lead_report::filter::PeriodFilter;
use lead_report::pipeline::prepare_upload;
use lead_report::upload::Upload;
use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_env()?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 4 {
        anyhow::bail!("usage: export_missing_owners <input> <year> [month] [output.xlsx]");
    }

    let input = PathBuf::from(&args[0]);
    let year: i32 = args[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("year must be a number, got '{}'", args[1]))?;
    let filter = PeriodFilter::from_query(Some(year), args.get(2).map(String::as_str), year)?;
    let output = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(MISSING_OWNER_FILENAME));

    let bytes = std::fs::read(&input)
        .map_err(|e| anyhow::anyhow!("could not read {}: {}", input.display(), e))?;
    let upload = Upload {
        bytes,
        content_type: None,
        filename: input.file_name().map(|name| name.to_string_lossy().into_owned()),
    };

    let prepared = prepare_upload(&upload, filter, &config.default_lead_source)?;
    let workbook = missing_contact_owner_xlsx(&prepared.table)?;
    std::fs::write(&output, workbook)?;

    tracing::info!(
        "Wrote {} ({} of {} leads in period)",
        output.display(),
        prepared.meta.filtered_rows,
        prepared.meta.total_rows
    );
    println!("{}", output.display());

    Ok(())
}
