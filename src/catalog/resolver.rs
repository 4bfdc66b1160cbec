//! HB-02: Module descriptor resolution.
//!
//! Converts raw catalog stubs into typed, UI-actionable descriptors.
//! The variant comes from the explicit wire tag when the Hub sends
//! one; legacy catalogs fall back to the id-marker derivation the
//! first Hub frontends shipped with.

use crate::models::module::{Area, AreaStub, ModuleDescriptor, ModuleStub, ModuleVariant};

/// Id substring marking legacy editor modules (case-sensitive, as the
/// original catalogs were lowercase throughout).
pub const EDITOR_MARKER: &str = "editor";

/// Action label shown on Edit module cards.
pub const ACTION_OPEN_EDITOR: &str = "Abrir Editor";

/// Action label shown on Upload and Table module cards.
pub const ACTION_START_EXTRACTION: &str = "Iniciar Extração";

/// Reasons a stub cannot become a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Module stub has an empty id")]
    EmptyId,
}

/// A stub dropped during area resolution, with its catalog position.
#[derive(Debug, Clone)]
pub struct SkippedStub {
    pub position: usize,
    pub reason: ResolveError,
}

/// Result of resolving one area: the descriptors that resolved plus
/// every stub that was dropped.
#[derive(Debug, Clone)]
pub struct ResolvedArea {
    pub area: Area,
    pub skipped: Vec<SkippedStub>,
}

/// Resolve the behavioral variant for a stub.
///
/// The explicit `variant` tag wins when present and recognized.
/// Unknown tags fail closed: logged and ignored, so the marker
/// derivation still applies. `Table` only ever comes from the
/// explicit tag; the marker can derive nothing but Edit or Upload.
pub fn resolve_variant(stub: &ModuleStub) -> ModuleVariant {
    if let Some(tag) = stub.variant.as_deref() {
        match ModuleVariant::from_str(tag) {
            Some(variant) => return variant,
            None => {
                tracing::warn!(module = %stub.id, tag, "Unknown variant tag, deriving from id");
            }
        }
    }
    if stub.id.contains(EDITOR_MARKER) {
        ModuleVariant::Edit
    } else {
        ModuleVariant::Upload
    }
}

/// Action label for a variant. Total over the enum: Edit opens the
/// editor, everything else starts an extraction.
pub fn action_label(variant: ModuleVariant) -> &'static str {
    match variant {
        ModuleVariant::Edit => ACTION_OPEN_EDITOR,
        ModuleVariant::Upload | ModuleVariant::Table => ACTION_START_EXTRACTION,
    }
}

/// Resolve a single stub into a descriptor.
///
/// Fails only on syntactically broken stubs (blank id). A blank label
/// falls back to the id so the module card still renders something.
pub fn resolve_stub(stub: &ModuleStub) -> Result<ModuleDescriptor, ResolveError> {
    if stub.id.trim().is_empty() {
        return Err(ResolveError::EmptyId);
    }
    let variant = resolve_variant(stub);
    let title = if stub.label.trim().is_empty() {
        stub.id.clone()
    } else {
        stub.label.clone()
    };
    Ok(ModuleDescriptor {
        id: stub.id.clone(),
        title,
        description: stub.description.clone(),
        variant,
        action_label: action_label(variant).to_string(),
    })
}

/// Resolve every stub in an area, preserving catalog order.
///
/// One malformed stub must not hide the whole area: bad entries are
/// skipped, reported in the result and logged with their position.
pub fn resolve_area(stub: AreaStub) -> ResolvedArea {
    let mut modules = Vec::with_capacity(stub.modules.len());
    let mut skipped = Vec::new();
    for (position, module) in stub.modules.iter().enumerate() {
        match resolve_stub(module) {
            Ok(descriptor) => modules.push(descriptor),
            Err(reason) => {
                tracing::warn!(area = %stub.id, position, %reason, "Skipping malformed module stub");
                skipped.push(SkippedStub { position, reason });
            }
        }
    }
    ResolvedArea {
        area: Area {
            id: stub.id,
            label: stub.label,
            modules,
        },
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(id: &str, label: &str) -> ModuleStub {
        ModuleStub {
            id: id.to_string(),
            label: label.to_string(),
            description: String::new(),
            variant: None,
        }
    }

    #[test]
    fn editor_marker_resolves_edit() {
        let descriptor = resolve_stub(&stub("editor-cnpj", "Editor CNPJ")).unwrap();
        assert_eq!(descriptor.variant, ModuleVariant::Edit);
        assert_eq!(descriptor.action_label, "Abrir Editor");
    }

    #[test]
    fn marker_matches_anywhere_in_id() {
        let descriptor = resolve_stub(&stub("efd_icms_editor", "Editor CNPJ/IE")).unwrap();
        assert_eq!(descriptor.variant, ModuleVariant::Edit);
    }

    #[test]
    fn plain_id_resolves_upload() {
        let descriptor = resolve_stub(&stub("darf", "Extrair Darf")).unwrap();
        assert_eq!(descriptor.variant, ModuleVariant::Upload);
        assert_eq!(descriptor.action_label, "Iniciar Extração");
    }

    #[test]
    fn marker_is_case_sensitive() {
        let descriptor = resolve_stub(&stub("EDITOR-cnpj", "Editor")).unwrap();
        assert_eq!(descriptor.variant, ModuleVariant::Upload);
    }

    #[test]
    fn explicit_variant_wins_over_marker() {
        let mut s = stub("editor-cnpj", "Editor CNPJ");
        s.variant = Some("upload".to_string());
        assert_eq!(resolve_variant(&s), ModuleVariant::Upload);

        let mut s = stub("darf", "Extrair Darf");
        s.variant = Some("table".to_string());
        assert_eq!(resolve_variant(&s), ModuleVariant::Table);
    }

    #[test]
    fn unknown_variant_tag_falls_back_to_marker() {
        let mut s = stub("editor-cnpj", "Editor CNPJ");
        s.variant = Some("wizard".to_string());
        assert_eq!(resolve_variant(&s), ModuleVariant::Edit);

        let mut s = stub("darf", "Extrair Darf");
        s.variant = Some("wizard".to_string());
        assert_eq!(resolve_variant(&s), ModuleVariant::Upload);
    }

    #[test]
    fn table_is_never_derived_from_id() {
        // No id spelling reaches Table without the explicit tag.
        for id in ["table", "tabela-precos", "editor-table"] {
            let variant = resolve_variant(&stub(id, ""));
            assert_ne!(variant, ModuleVariant::Table, "id {id} derived Table");
        }
    }

    #[test]
    fn action_label_is_total() {
        assert_eq!(action_label(ModuleVariant::Edit), "Abrir Editor");
        assert_eq!(action_label(ModuleVariant::Upload), "Iniciar Extração");
        assert_eq!(action_label(ModuleVariant::Table), "Iniciar Extração");
    }

    #[test]
    fn empty_id_is_malformed() {
        assert_eq!(resolve_stub(&stub("", "Sem Id")), Err(ResolveError::EmptyId));
        assert_eq!(resolve_stub(&stub("   ", "Só Espaço")), Err(ResolveError::EmptyId));
    }

    #[test]
    fn blank_label_falls_back_to_id() {
        let descriptor = resolve_stub(&stub("pgdas", "")).unwrap();
        assert_eq!(descriptor.title, "pgdas");
    }

    #[test]
    fn resolution_is_deterministic() {
        let s = stub("editor-cnpj", "Editor CNPJ");
        let first = resolve_stub(&s).unwrap();
        let second = resolve_stub(&s).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn resolve_area_skips_malformed_and_keeps_order() {
        let area = AreaStub {
            id: "ecac".to_string(),
            label: "Ecac".to_string(),
            modules: vec![stub("darf", "Extrair Darf"), stub("", "Quebrado"), stub("dctf", "Extrair DCTFWeb")],
        };
        let resolved = resolve_area(area);

        assert_eq!(resolved.area.modules.len(), 2);
        assert_eq!(resolved.area.modules[0].id, "darf");
        assert_eq!(resolved.area.modules[1].id, "dctf");

        assert_eq!(resolved.skipped.len(), 1);
        assert_eq!(resolved.skipped[0].position, 1);
        assert_eq!(resolved.skipped[0].reason, ResolveError::EmptyId);
    }

    #[test]
    fn resolve_area_with_no_modules_is_valid() {
        let area = AreaStub {
            id: "vazia".to_string(),
            label: "Área Vazia".to_string(),
            modules: vec![],
        };
        let resolved = resolve_area(area);
        assert!(resolved.area.modules.is_empty());
        assert!(resolved.skipped.is_empty());
    }

    #[test]
    fn resolved_descriptor_carries_stub_text() {
        let mut s = stub("h005", "Extrator Inventário H005");
        s.description = "Extração de inventário H005 e consolidação Excel.".to_string();
        let descriptor = resolve_stub(&s).unwrap();
        assert_eq!(descriptor.title, "Extrator Inventário H005");
        assert_eq!(descriptor.description, "Extração de inventário H005 e consolidação Excel.");
    }
}
