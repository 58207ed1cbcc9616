//! # Localization Module
//!
//! Fluent-based message lookup. Resources are embedded from
//! `locales/<lang>/main.ftl`; a key missing from the user's language falls
//! back to English.

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

pub const DEFAULT_LANGUAGE: &str = "en";

const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("bn", include_str!("../locales/bn/main.ftl")),
];

/// Localization manager for the wizard bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every embedded language loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (code, source) in RESOURCES {
            let locale: LanguageIdentifier = code
                .parse()
                .map_err(|e| anyhow!("invalid language identifier {code}: {e}"))?;
            let bundle = Self::create_bundle(&locale, source)?;
            bundles.insert(code.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: &LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Values are pasted into chat messages verbatim
        bundle.set_use_isolating(false);

        let resource = match FluentResource::try_new(source.to_string()) {
            Ok(resource) => resource,
            Err((resource, errors)) => {
                warn!(locale = %locale, errors = errors.len(), "Locale resource has parse errors");
                resource
            }
        };
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("failed to add resource for {locale}: {errors:?}"))?;

        Ok(bundle)
    }

    /// Whether a bundle exists for the given language code
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Map a Telegram language code (e.g. `bn-BD`) onto a loaded bundle
    pub fn resolve_language<'a>(&self, language_code: Option<&'a str>) -> &'a str {
        match language_code {
            Some(code) => {
                let primary = code.split(['-', '_']).next().unwrap_or(code);
                if self.is_language_supported(primary) {
                    primary
                } else {
                    DEFAULT_LANGUAGE
                }
            }
            None => DEFAULT_LANGUAGE,
        }
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let language = self.resolve_language(Some(language));

        if let Some(value) = self.format(key, language, args) {
            return value;
        }
        if language != DEFAULT_LANGUAGE {
            debug!(key, language, "Falling back to default language");
            if let Some(value) = self.format(key, DEFAULT_LANGUAGE, args) {
                return value;
            }
        }

        format!("Missing translation: {}", key)
    }

    /// Get a localized message in the default language
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        self.get_message_in_language(key, DEFAULT_LANGUAGE, args)
    }

    /// Check that a message exists in the default language and formats
    /// without errors when exactly `arg_names` are bound
    pub fn verify_message(&self, key: &str, arg_names: &[&str]) -> std::result::Result<(), String> {
        let bundle = self
            .bundles
            .get(DEFAULT_LANGUAGE)
            .ok_or_else(|| format!("no bundle for {DEFAULT_LANGUAGE}"))?;
        let pattern = bundle
            .get_message(key)
            .and_then(|message| message.value())
            .ok_or_else(|| "message not found".to_string())?;

        let mut args = FluentArgs::new();
        for name in arg_names {
            args.set(*name, "-");
        }

        let mut errors = vec![];
        bundle.format_pattern(pattern, Some(&args), &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(format!("{errors:?}"))
        }
    }

    fn format(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> Option<String> {
        let bundle = self.bundles.get(language)?;
        let pattern = bundle.get_message(key)?.value()?;

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (k, v) in args {
                fluent_args.set(*k, *v);
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, language, errors = ?errors, "Errors while formatting message");
        }

        Some(value.into_owned())
    }
}

/// Global localization instance
static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_none() {
        let manager = LocalizationManager::new()?;
        let _ = LOCALIZATION_MANAGER.set(manager);
    }
    Ok(())
}

/// Get the global localization manager, initializing it on first use
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER.get_or_init(|| {
        LocalizationManager::new().unwrap_or_else(|e| {
            warn!(error = %e, "Localization failed to load, messages will show their ids");
            LocalizationManager {
                bundles: HashMap::new(),
            }
        })
    })
}

/// Supported language matching a Telegram language code, English otherwise
pub fn detect_language(language_code: Option<&str>) -> &str {
    get_localization_manager().resolve_language(language_code)
}

/// Localized message for the user's Telegram language code
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    let manager = get_localization_manager();
    manager.get_message_in_language(key, manager.resolve_language(language_code), None)
}

/// Localized message with arguments for the user's Telegram language code
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let manager = get_localization_manager();
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    manager.get_message_in_language(key, manager.resolve_language(language_code), Some(&args_map))
}
