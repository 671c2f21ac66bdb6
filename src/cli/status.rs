use comfy_table::{Cell, Table};

use crate::cli::DirArgs;
use crate::downloads::list_downloads;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::importer::{extract_year, read_wide_table, ShapeKind};
use crate::settings::settings_file_path;

pub fn run(dirs: &DirArgs) -> Result<()> {
    let settings = dirs.resolve();

    println!("Settings:      {}", settings_file_path().display());
    println!("Data dir:      {}", settings.base_path().display());
    println!("Downloads dir: {}", settings.downloads_path().display());
    println!("Strict months: {}", if settings.strict_months { "yes" } else { "no" });

    let downloads = list_downloads(&settings.downloads_path())?;
    if downloads.is_empty() {
        println!();
        println!("No downloads waiting.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["File", "Size", "Shape", "Output"]);
    for path in &downloads {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let (shape, output) = match read_wide_table(path) {
            Ok(t) => {
                let kind = ShapeKind::classify(&t.headers);
                let output = kind
                    .target_name(extract_year(name))
                    .unwrap_or_else(|_| "needs --year".to_string());
                (kind.key().to_string(), output)
            }
            Err(e) => ("unreadable".to_string(), e.to_string()),
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format_bytes(size)),
            Cell::new(shape),
            Cell::new(output),
        ]);
    }
    println!();
    println!("Downloads\n{table}");
    if downloads.len() > 1 {
        println!("More than one download: clear the directory before updating.");
    }
    Ok(())
}
