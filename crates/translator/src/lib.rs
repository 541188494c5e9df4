//! Page translation for static sites.
//!
//! - `memory`: exact-match translation table keyed by Portuguese source strings
//! - `html`: walks a document and translates its human-visible text
//! - `coverage`: per-language completeness of a translation table

pub mod coverage;
mod escape;
pub mod html;
pub mod memory;

pub use coverage::{CoverageReport, LanguageCoverage};
pub use escape::escape_attribute;
pub use html::{HtmlTranslator, TranslatedHtml, should_skip_text};
pub use memory::TranslationMemory;
