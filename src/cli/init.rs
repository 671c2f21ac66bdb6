use crate::cli::DirArgs;
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(dirs: &DirArgs) -> Result<()> {
    let mut settings = load_settings();
    dirs.apply(&mut settings);
    save_settings(&settings)?;

    std::fs::create_dir_all(settings.base_path())?;
    std::fs::create_dir_all(settings.archive_path())?;

    println!("Data dir:      {}", settings.base_path().display());
    println!("Downloads dir: {}", settings.downloads_path().display());
    println!("Initialized sico");
    Ok(())
}
