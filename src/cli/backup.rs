use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::backup::{backup_filename, create_backup, restore_backup};
use crate::error::{AuditError, Result};

use super::{today, Ctx};

fn has_backup_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("dawg") | Some("json")
    )
}

pub fn export(output: Option<String>) -> Result<()> {
    let ctx = Ctx::open()?;
    let company = ctx.registry.active().clone();
    let data = ctx.load_data();

    let raw = create_backup(&data, Some(&company), &chrono::Local::now().to_rfc3339());
    let path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let backups_dir = crate::config::get_data_dir().join("backups");
            std::fs::create_dir_all(&backups_dir)?;
            backups_dir.join(backup_filename(&company.name, &today()))
        }
    };
    std::fs::write(&path, raw)?;
    println!("Backup saved to {}", path.display());
    Ok(())
}

pub fn import(file: &str, as_new: bool, overwrite: bool) -> Result<()> {
    let path = Path::new(file);
    if !has_backup_extension(path) {
        return Err(AuditError::Invalid(
            "backup file must have a .dawg or .json extension".to_string(),
        ));
    }
    if as_new && overwrite {
        return Err(AuditError::Invalid(
            "--as-new and --overwrite are mutually exclusive".to_string(),
        ));
    }

    let raw = std::fs::read_to_string(path)?;
    let envelope = restore_backup(&raw)?;

    let mut ctx = Ctx::open()?;
    let active = ctx.registry.active().clone();
    let foreign = envelope
        .company
        .as_ref()
        .is_some_and(|c| c.id != active.id);

    let target_id = if as_new {
        let name = envelope
            .company
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Restored Company");
        ctx.registry.create_company(&mut ctx.store, name)?.id.clone()
    } else if foreign && !overwrite {
        let name = envelope.company.as_ref().map(|c| c.name.clone()).unwrap_or_default();
        return Err(AuditError::Invalid(format!(
            "this backup belongs to another company ({name}); pass --as-new to restore it \
             as a new company or --overwrite to replace the active company's data"
        )));
    } else {
        active.id.clone()
    };

    ctx.store.save_app_data(&target_id, &envelope.data);
    println!(
        "{} Restored {} income and {} expense entries into {}",
        "Done.".green().bold(),
        envelope.data.income.len(),
        envelope.data.expenses.len(),
        ctx.registry.active().name
    );
    Ok(())
}
