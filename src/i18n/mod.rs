//! Internationalization (i18n) support for turnero
//!
//! Messages live in `locales/en.yml` and `locales/es.yml`. English is the
//! fallback for missing keys.
//!
//! # Usage
//!
//! ```rust,ignore
//! use turnero::i18n::{set_locale, t};
//!
//! set_locale("es");
//! let msg = t!("errors.category.storage");
//! ```

use std::sync::RwLock;

// Note: rust_i18n::i18n! macro is declared in lib.rs (crate root)

static CURRENT_LOCALE: RwLock<String> = RwLock::new(String::new());

/// Set the current locale for translations
///
/// Accepts language codes such as `es`, `es-AR` or `en_US`.
pub fn set_locale(locale: &str) {
    let normalized = normalize_locale(locale);
    rust_i18n::set_locale(normalized);
    if let Ok(mut current) = CURRENT_LOCALE.write() {
        *current = normalized.to_string();
    }
}

/// Get the current locale
///
/// Returns the currently active locale or the default fallback.
pub fn current_locale() -> String {
    CURRENT_LOCALE
        .read()
        .ok()
        .filter(|l| !l.is_empty())
        .map(|l| l.clone())
        .unwrap_or_else(|| String::from("en"))
}

/// Initialize i18n from environment variables
///
/// Reads `TURNERO_LANG` to set the locale. Falls back to English if not set
/// or not supported.
pub fn init_from_env() {
    let locale = std::env::var("TURNERO_LANG").unwrap_or_else(|_| "en".to_string());
    set_locale(&locale);
}

/// Normalize locale code to a supported one
///
/// - es-AR, es_ES, spanish, español -> es
/// - anything else -> en
fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.to_lowercase();

    if lower.starts_with("es") || lower == "spanish" || lower == "español" {
        "es"
    } else {
        "en"
    }
}

/// Translate a key with optional parameters
///
/// This is a re-export of rust_i18n::t! for convenience.
#[doc(inline)]
pub use rust_i18n::t;
