//! Batch generation of translated site trees.
//!
//! [`TranslationGenerator`] mirrors pages into `translated/<lang>/`, keeps
//! run statistics and writes `translated/manifest.json`.

pub mod manifest;
pub mod selector;
pub mod site;
pub mod stats;

pub use manifest::{
    LanguageInfo, MANIFEST_FILE_NAME, MANIFEST_VERSION, TranslationManifest, language_catalog,
};
pub use selector::language_selector_html;
pub use site::TranslationGenerator;
pub use stats::{BatchReport, TranslationStats};
