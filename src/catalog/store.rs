//! HB-05: Catalog store.
//!
//! In-memory cache of resolved areas and license records. Seeded with
//! the built-in catalog so the console is usable before the Hub API
//! answers, then refreshed from the wire on demand. A failed refresh
//! never clears what is already cached.

use std::sync::RwLock;

use crate::catalog::client::{CatalogError, HubApi};
use crate::catalog::resolver;
use crate::models::license::{LicenseRecord, LicenseStatus, LicenseStub};
use crate::models::module::{Area, AreaStub, ModuleDescriptor, ModuleStub};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Catalog store lock poisoned")]
    LockPoisoned,
    #[error(transparent)]
    Fetch(#[from] CatalogError),
}

/// Cached catalog state. Areas and licenses live behind separate
/// locks so a license refresh never blocks catalog reads.
pub struct CatalogStore {
    areas: RwLock<Vec<Area>>,
    licenses: RwLock<Vec<LicenseRecord>>,
}

impl CatalogStore {
    /// Store pre-seeded with the built-in catalog and sample licenses.
    pub fn new() -> Self {
        Self {
            areas: RwLock::new(resolve_all(builtin_area_stubs())),
            licenses: RwLock::new(builtin_licenses()),
        }
    }

    /// Store with nothing cached. Used by tests that need to observe
    /// the first refresh.
    pub fn empty() -> Self {
        Self {
            areas: RwLock::new(Vec::new()),
            licenses: RwLock::new(Vec::new()),
        }
    }

    pub fn areas(&self) -> Vec<Area> {
        self.areas.read().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn licenses(&self) -> Vec<LicenseRecord> {
        self.licenses.read().map(|l| l.clone()).unwrap_or_default()
    }

    /// Look up one module descriptor by area and module id.
    pub fn find_module(&self, area_id: &str, module_id: &str) -> Option<ModuleDescriptor> {
        self.areas
            .read()
            .ok()?
            .iter()
            .find(|a| a.id == area_id)?
            .modules
            .iter()
            .find(|m| m.id == module_id)
            .cloned()
    }

    /// Fetch areas from the Hub and replace the cache. The fetch runs
    /// before any lock is taken, so a wire failure leaves the cached
    /// catalog untouched.
    pub fn refresh_catalog(&self, api: &dyn HubApi) -> Result<Vec<Area>, StoreError> {
        let stubs = api.fetch_areas()?;
        let resolved = resolve_all(stubs);

        let mut areas = self.areas.write().map_err(|_| StoreError::LockPoisoned)?;
        *areas = resolved.clone();

        tracing::info!(areas = resolved.len(), "Catalog refreshed from Hub");
        Ok(resolved)
    }

    /// Fetch licenses from the Hub and replace the cache. Same
    /// stale-on-failure contract as `refresh_catalog`.
    pub fn refresh_licenses(&self, api: &dyn HubApi) -> Result<Vec<LicenseRecord>, StoreError> {
        let stubs = api.fetch_licenses()?;
        let records = typed_records(stubs);

        let mut licenses = self.licenses.write().map_err(|_| StoreError::LockPoisoned)?;
        *licenses = records.clone();

        tracing::info!(licenses = records.len(), "Licenses refreshed from Hub");
        Ok(records)
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a batch of area stubs, keeping whatever survives. Skips
/// are already logged per stub by the resolver.
fn resolve_all(stubs: Vec<AreaStub>) -> Vec<Area> {
    stubs
        .into_iter()
        .map(|stub| resolver::resolve_area(stub).area)
        .collect()
}

/// Convert license stubs to typed records, dropping entries whose
/// status is outside the known set.
fn typed_records(stubs: Vec<LicenseStub>) -> Vec<LicenseRecord> {
    stubs
        .into_iter()
        .filter_map(|stub| match LicenseRecord::try_from(stub) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(license = %e.id, status = %e.status, "Skipping license with unknown status");
                None
            }
        })
        .collect()
}

fn stub(id: &str, label: &str, description: &str, variant: &str) -> ModuleStub {
    ModuleStub {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        variant: Some(variant.to_string()),
    }
}

/// The catalog shipped with the binary. Mirrors what the Hub serves
/// for a default installation.
fn builtin_area_stubs() -> Vec<AreaStub> {
    vec![
        AreaStub {
            id: "ecac".to_string(),
            label: "Ecac".to_string(),
            modules: vec![
                stub(
                    "darf",
                    "Extrair Darf",
                    "Upload de PDF para processamento e exportação para Excel.",
                    "upload",
                ),
                stub(
                    "dctf",
                    "Extrair DCTFWeb",
                    "Extração de Débitos, Créditos e Compensações via leitura de PDF.",
                    "upload",
                ),
                stub(
                    "pgdas",
                    "PGDAS Simples Nacional",
                    "Leitura por atividade/segregação e débitos apurados.",
                    "upload",
                ),
            ],
        },
        AreaStub {
            id: "efd-contrib".to_string(),
            label: "EFD Contribuições".to_string(),
            modules: vec![
                stub(
                    "m200",
                    "Extrator M200/M600",
                    "Seleção de arquivo SPED, visualização de registros e validações.",
                    "upload",
                ),
                stub(
                    "editor-cnpj",
                    "Editor CNPJ",
                    "Busca de arquivo e edição assistida do registro |0000|.",
                    "edit",
                ),
            ],
        },
        AreaStub {
            id: "efd-icms".to_string(),
            label: "EFD ICMS".to_string(),
            modules: vec![
                stub(
                    "e110",
                    "Extrator E110/E115",
                    "Leitura dos registros SPED e exportação tabular.",
                    "upload",
                ),
                stub(
                    "editor-cnpj-ie",
                    "Editor CNPJ/IE",
                    "Atualização de CNPJ e IE no registro |0000| com validação.",
                    "edit",
                ),
                stub(
                    "h005",
                    "Extrator Inventário H005",
                    "Extração de inventário H005 e consolidação Excel.",
                    "upload",
                ),
            ],
        },
    ]
}

fn license(id: &str, client: &str, modules: &str, status: LicenseStatus, expiry: &str) -> LicenseRecord {
    LicenseRecord {
        id: id.to_string(),
        client: client.to_string(),
        enabled_modules: modules.to_string(),
        status,
        expiry: expiry.to_string(),
    }
}

/// Sample licenses shown until the Hub answers.
fn builtin_licenses() -> Vec<LicenseRecord> {
    vec![
        license("LIC-001", "Contabilidade Silva", "Hansu Hub", LicenseStatus::Active, "15/05/2026"),
        license("LIC-002", "Empresa XPTO", "Full Access", LicenseStatus::Active, "20/12/2026"),
        license("LIC-003", "Escritório Digital", "Ecac + EFD", LicenseStatus::Expiring, "28/02/2026"),
        license("LIC-004", "Logística S.A", "Ecac", LicenseStatus::Suspended, "Expired"),
    ]
}
