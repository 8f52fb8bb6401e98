use colored::Colorize;

use crate::config::{get_data_dir, load_config, save_config, shellexpand_path, store_path};
use crate::error::Result;
use crate::registry::CompanyRegistry;
use crate::store::Store;

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut config = load_config();
    if let Some(dir) = data_dir {
        config.data_dir = shellexpand_path(&dir);
    }
    save_config(&config)?;

    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let path = store_path();
    let mut store = Store::open(&path)?;
    let registry = CompanyRegistry::bootstrap(&mut store);

    println!("Data directory: {}", data_dir.display());
    println!("Store:          {}", path.display());
    println!("Active company: {}", registry.active().name);
    if registry.is_first_time() {
        println!();
        println!(
            "{} The demo company comes with sample data to explore.",
            "Welcome!".green().bold()
        );
        println!("Create your own books with `auditthis company add <name>`.");
    }
    Ok(())
}
