//! Endpoint classification
//!
//! Maps request paths to named endpoint classes. Exact rules win over prefix rules and, among
//! prefix rules, the longest matching path wins, so rule order in configuration is irrelevant.

use crate::config::models::rate_limit::{MatchMode, RateLimitConfig, RateLimitSettings};
use crate::utils::error::{Result, WardenError};
use std::collections::{BTreeMap, HashMap};

/// A resolved endpoint class
#[derive(Debug, Clone, Copy)]
pub struct EndpointClass<'a> {
    pub name: &'a str,
    pub config: &'a RateLimitConfig,
}

/// Path to endpoint class resolver
#[derive(Debug, Clone)]
pub struct Classifier {
    classes: BTreeMap<String, RateLimitConfig>,
    exact: HashMap<String, String>,
    /// Sorted longest path first
    prefixes: Vec<(String, String)>,
    default_class: String,
    default_config: RateLimitConfig,
    excluded: Vec<String>,
}

impl Classifier {
    /// Build a classifier, rejecting rules that reference unknown classes
    pub fn new(settings: &RateLimitSettings) -> Result<Self> {
        let default_config = settings.default_class_config().cloned().ok_or_else(|| {
            WardenError::config(format!(
                "Default endpoint class '{}' is not configured",
                settings.default_class
            ))
        })?;

        let mut exact = HashMap::new();
        let mut prefixes = Vec::new();
        for rule in &settings.routes {
            if !settings.classes.contains_key(&rule.class) {
                return Err(WardenError::config(format!(
                    "Route '{}' references unknown endpoint class '{}'",
                    rule.path, rule.class
                )));
            }
            match rule.match_mode {
                MatchMode::Exact => {
                    exact.insert(rule.path.clone(), rule.class.clone());
                }
                MatchMode::Prefix => prefixes.push((rule.path.clone(), rule.class.clone())),
            }
        }
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(Self {
            classes: settings.classes.clone(),
            exact,
            prefixes,
            default_class: settings.default_class.clone(),
            default_config,
            excluded: settings.excluded_paths.clone(),
        })
    }

    /// Whether `path` bypasses rate limiting.
    ///
    /// An excluded `/` only covers the root itself; any other entry covers its whole subtree.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|excluded| {
            if excluded == "/" {
                path == "/"
            } else {
                path.starts_with(excluded.as_str())
            }
        })
    }

    /// Resolve the endpoint class of `path`, falling back to the default class
    pub fn classify(&self, path: &str) -> EndpointClass<'_> {
        let name = self
            .exact
            .get(path)
            .or_else(|| {
                self.prefixes
                    .iter()
                    .find(|(prefix, _)| path.starts_with(prefix.as_str()))
                    .map(|(_, class)| class)
            })
            .unwrap_or(&self.default_class);

        match self.classes.get_key_value(name) {
            Some((name, config)) => EndpointClass { name, config },
            None => EndpointClass {
                name: &self.default_class,
                config: &self.default_config,
            },
        }
    }

    /// All configured classes
    pub fn classes(&self) -> &BTreeMap<String, RateLimitConfig> {
        &self.classes
    }
}
