use std::path::PathBuf;

use colored::Colorize;

use crate::cli::UpdateArgs;
use crate::downloads::{archive_download, find_download};
use crate::error::Result;
use crate::importer::process_file;
use crate::settings::shellexpand_path;
use crate::store::{drop_today, write_output};

pub fn run(args: &UpdateArgs) -> Result<()> {
    let mut settings = args.dirs.resolve();
    if args.strict_months {
        settings.strict_months = true;
    }

    let source = match &args.file {
        Some(f) => PathBuf::from(shellexpand_path(f)),
        None => find_download(&settings.downloads_path())?,
    };
    println!("Processing {}", source.display());

    let processed = process_file(&source, &settings, args.year)?;
    for row in &processed.reinstated {
        println!(
            "Reincluded: {} {}",
            row.date,
            row.category.as_deref().unwrap_or_default()
        );
    }

    let rows = if args.include_today {
        processed.rows
    } else {
        let today = chrono::Local::now().date_naive();
        let (kept, removed) = drop_today(processed.rows, today);
        if removed > 0 {
            let msg = format!("Last date is today! Removed {removed} rows");
            println!("{}", msg.as_str().yellow());
        }
        kept
    };

    let output_path = settings.base_path().join(&processed.output_name);
    if args.dry_run {
        println!(
            "Dry run: {} rows ({}) would be written to {}",
            rows.len(),
            processed.kind.key(),
            output_path.display()
        );
        return Ok(());
    }

    write_output(&output_path, processed.kind, &rows)?;
    println!(
        "{} {} ({} rows)",
        "Updated".green(),
        output_path.display(),
        rows.len()
    );

    let archived = archive_download(&source, &settings.archive_path(), &processed.output_name)?;
    println!("Archived the file in {}", archived.display());
    Ok(())
}
