//! Module catalog types shared by the resolver, store and IPC surface.
//!
//! `ModuleStub`/`AreaStub` mirror the Hub wire format; `ModuleDescriptor`/
//! `Area` are the resolved, UI-actionable forms the frontend consumes.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Module Variant
// ═══════════════════════════════════════════

/// Behavioral family of a module. Decides which workflow the operator
/// enters and which action label the module card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleVariant {
    /// File-driven extraction (PDF/SPED upload).
    Upload,
    /// Assisted editing of an existing record.
    Edit,
    /// Read-only tabular listing.
    Table,
}

impl ModuleVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Edit => "edit",
            Self::Table => "table",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "upload" => Some(Self::Upload),
            "edit" => Some(Self::Edit),
            "table" => Some(Self::Table),
            _ => None,
        }
    }

    pub fn all() -> &'static [ModuleVariant] {
        &[Self::Upload, Self::Edit, Self::Table]
    }
}

impl std::fmt::Display for ModuleVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════
// Wire stubs (GET /modules/areas)
// ═══════════════════════════════════════════

/// Raw module entry as served by `GET /modules/areas`.
///
/// `variant` is the explicit behavior tag newer Hub backends send.
/// Older backends omit it; the resolver then derives the variant from
/// the module id. Every field except `id` may be missing on the wire,
/// and a missing `id` deserializes to empty so one broken entry does
/// not fail the whole catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleStub {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Raw area grouping as served by `GET /modules/areas`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaStub {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub modules: Vec<ModuleStub>,
}

// ═══════════════════════════════════════════
// Resolved forms
// ═══════════════════════════════════════════

/// A fully resolved, UI-actionable module.
///
/// Immutable once resolved: a catalog refresh produces a fresh set,
/// and workflow sessions never write back into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub id: String,
    pub title: String,
    pub description: String,
    pub variant: ModuleVariant,
    pub action_label: String,
}

/// A resolved area with its modules in catalog order.
///
/// Module ids are unique within an area but not globally, so lookups
/// always key by (area id, module id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub label: String,
    pub modules: Vec<ModuleDescriptor>,
}

// ═══════════════════════════════════════════
// Flat catalog (GET /modules/catalog)
// ═══════════════════════════════════════════

/// Flat catalog entry from `GET /modules/catalog`, used by the admin
/// listing. Served alongside the grouped areas endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub module_id: String,
    pub module_label: String,
    pub area_id: String,
    pub area_label: String,
    pub is_active: bool,
}
