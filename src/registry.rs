use rand::Rng;

use crate::error::{AuditError, Result};
use crate::models::Company;
use crate::store::{
    Store, ACTIVE_COMPANY_KEY, COMPANIES_KEY, EXPENSES_KEY, INCOME_KEY, SETTINGS_KEY,
};

pub const DEMO_COMPANY_ID: &str = "demo-company";
const EMERGENCY_COMPANY_ID: &str = "emergency-company";

/// The company list plus the active pointer and the first-run flag.
///
/// The first-run flag is derived, not stored: it stays set as long as the
/// demo company is the only one, so finishing the setup flow without
/// creating a real company re-triggers it on the next load.
pub struct CompanyRegistry {
    companies: Vec<Company>,
    active_id: String,
    first_time: bool,
}

fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..9)
        .map(|_| {
            let n = rng.gen_range(0..36u32);
            std::char::from_digit(n, 36).unwrap()
        })
        .collect()
}

fn new_company_id() -> String {
    format!(
        "company-{}-{}",
        chrono::Local::now().timestamp_millis(),
        random_suffix()
    )
}

impl CompanyRegistry {
    /// Load or create the company list. Runs before anything else touches
    /// the store; always leaves at least one company behind.
    pub fn bootstrap(store: &mut Store) -> CompanyRegistry {
        match store.try_read::<Vec<Company>>(COMPANIES_KEY, None) {
            Ok(Some(companies)) if !companies.is_empty() => {
                Self::from_existing(store, companies)
            }
            Ok(_) => Self::create_demo(store),
            Err(e) => {
                eprintln!("warning: company list unreadable, resetting storage: {e}");
                Self::create_emergency(store)
            }
        }
    }

    fn from_existing(store: &mut Store, companies: Vec<Company>) -> CompanyRegistry {
        let first_time = companies.len() == 1 && companies[0].id == DEMO_COMPANY_ID;

        let pointer = store.read_string(ACTIVE_COMPANY_KEY);
        let active_id = match pointer.filter(|id| companies.iter().any(|c| &c.id == id)) {
            Some(id) => id,
            None => {
                // Stale or missing pointer: fall back to the first entry.
                let id = companies[0].id.clone();
                store.write_string(ACTIVE_COMPANY_KEY, &id);
                id
            }
        };

        CompanyRegistry {
            companies,
            active_id,
            first_time,
        }
    }

    fn create_demo(store: &mut Store) -> CompanyRegistry {
        let demo = Company {
            id: DEMO_COMPANY_ID.to_string(),
            name: "Demo Company".to_string(),
            created_at: now_rfc3339(),
            is_active: true,
        };
        store.write(COMPANIES_KEY, None, &vec![demo.clone()]);
        store.write_string(ACTIVE_COMPANY_KEY, &demo.id);
        crate::demo::seed_demo_data(store, &demo.id);
        CompanyRegistry {
            active_id: demo.id.clone(),
            companies: vec![demo],
            first_time: true,
        }
    }

    fn create_emergency(store: &mut Store) -> CompanyRegistry {
        store.clear();
        let company = Company {
            id: EMERGENCY_COMPANY_ID.to_string(),
            name: "My Company".to_string(),
            created_at: now_rfc3339(),
            is_active: true,
        };
        store.write(COMPANIES_KEY, None, &vec![company.clone()]);
        store.write_string(ACTIVE_COMPANY_KEY, &company.id);
        CompanyRegistry {
            active_id: company.id.clone(),
            companies: vec![company],
            first_time: false,
        }
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn active(&self) -> &Company {
        self.companies
            .iter()
            .find(|c| c.id == self.active_id)
            .expect("active company is always present in the list")
    }

    pub fn is_first_time(&self) -> bool {
        self.first_time
    }

    /// Accepts either a company id or (unique) name, for CLI ergonomics.
    pub fn find(&self, id_or_name: &str) -> Option<&Company> {
        self.companies
            .iter()
            .find(|c| c.id == id_or_name)
            .or_else(|| self.companies.iter().find(|c| c.name == id_or_name))
    }

    pub fn create_company(&mut self, store: &mut Store, name: &str) -> Result<&Company> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuditError::Invalid(
                "company name must not be empty".to_string(),
            ));
        }
        let company = Company {
            id: new_company_id(),
            name: name.to_string(),
            created_at: now_rfc3339(),
            is_active: true,
        };
        self.companies.push(company);
        self.active_id = self.companies.last().unwrap().id.clone();
        store.write(COMPANIES_KEY, None, &self.companies);
        store.write_string(ACTIVE_COMPANY_KEY, &self.active_id);
        Ok(self.companies.last().unwrap())
    }

    /// Repoints the active pointer only; the caller reloads ledger data
    /// for the new namespace.
    pub fn switch_company(&mut self, store: &mut Store, id: &str) -> Result<()> {
        if !self.companies.iter().any(|c| c.id == id) {
            return Err(AuditError::UnknownCompany(id.to_string()));
        }
        self.active_id = id.to_string();
        store.write_string(ACTIVE_COMPANY_KEY, id);
        Ok(())
    }

    /// Removes the company and its three namespaced documents. Refuses to
    /// delete the last remaining company, without touching storage.
    pub fn delete_company(&mut self, store: &mut Store, id: &str) -> Result<()> {
        if self.companies.len() <= 1 {
            return Err(AuditError::LastCompany);
        }
        if !self.companies.iter().any(|c| c.id == id) {
            return Err(AuditError::UnknownCompany(id.to_string()));
        }

        self.companies.retain(|c| c.id != id);
        if self.active_id == id {
            self.active_id = self.companies[0].id.clone();
            store.write_string(ACTIVE_COMPANY_KEY, &self.active_id);
        }

        store.remove(SETTINGS_KEY, Some(id));
        store.remove(INCOME_KEY, Some(id));
        store.remove(EXPENSES_KEY, Some(id));
        store.write(COMPANIES_KEY, None, &self.companies);
        Ok(())
    }

    /// In-memory only. The flag re-derives at the next bootstrap, so it
    /// comes back until a non-demo company exists.
    pub fn complete_first_time_setup(&mut self) {
        self.first_time = false;
    }
}
