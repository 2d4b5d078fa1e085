use crate::catalog::schema::CatalogDef;
use crate::catalog::{validate_catalog, RuleCatalog};
use crate::error::RxError;

const DEMO_JSON: &str = include_str!("../../../../catalogs/demo.json");

/// Available embedded catalogs.
pub const PRESETS: &[&str] = &["demo"];

/// Load an embedded catalog definition by name.
pub fn load_preset(name: &str) -> Result<CatalogDef, RxError> {
    match name {
        "demo" => {
            let def: CatalogDef = serde_json::from_str(DEMO_JSON)?;
            validate_catalog(&def)?;
            Ok(def)
        }
        _ => Err(RxError::UnknownPreset(name.to_string())),
    }
}

/// The demo catalog, compiled and ready for evaluation.
pub fn demo_catalog() -> Result<RuleCatalog, RxError> {
    RuleCatalog::from_def(&load_preset("demo")?)
}
