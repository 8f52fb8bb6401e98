use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{AuditError, Result};

use super::Ctx;

pub fn add(name: &str) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company = ctx.registry.create_company(&mut ctx.store, name)?;
    let display = format!("{} ({})", company.name, company.id);
    ctx.registry.complete_first_time_setup();
    println!("Created and switched to {display}");
    Ok(())
}

pub fn list() -> Result<()> {
    let ctx = Ctx::open()?;
    let active_id = ctx.company_id();

    let mut table = Table::new();
    table.set_header(vec!["", "ID", "Name", "Created"]);
    for company in ctx.registry.companies() {
        let marker = if company.id == active_id { "*" } else { "" };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(&company.id),
            Cell::new(&company.name),
            Cell::new(company.created_at.split('T').next().unwrap_or("")),
        ]);
    }
    println!("Companies\n{table}");
    if ctx.registry.is_first_time() {
        println!();
        println!("Only the demo company exists so far. Add your own with `auditthis company add <name>`.");
    }
    Ok(())
}

pub fn switch(id_or_name: &str) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let id = ctx
        .registry
        .find(id_or_name)
        .map(|c| c.id.clone())
        .ok_or_else(|| AuditError::UnknownCompany(id_or_name.to_string()))?;
    ctx.registry.switch_company(&mut ctx.store, &id)?;
    println!("Switched to {}", ctx.registry.active().name);
    Ok(())
}

pub fn delete(id_or_name: &str) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company = ctx
        .registry
        .find(id_or_name)
        .cloned()
        .ok_or_else(|| AuditError::UnknownCompany(id_or_name.to_string()))?;
    ctx.registry.delete_company(&mut ctx.store, &company.id)?;
    println!("Deleted {} and all of its data.", company.name.red());
    println!("Active company is now {}", ctx.registry.active().name);
    Ok(())
}
