use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Context};
use client_core::{transport::DEFAULT_API_BASE_URL, ApiConfig};
use serde::Deserialize;
use shared::domain::Category;

pub const SETTINGS_FILE: &str = "explorer.toml";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/500x750?text=No+Image";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub language: Option<String>,
    pub image_base_url: String,
    pub placeholder_image_url: String,
    pub default_category: Category,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            api_token: None,
            language: None,
            image_base_url: DEFAULT_IMAGE_BASE_URL.into(),
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.into(),
            default_category: Category::default(),
        }
    }
}

impl Settings {
    pub fn api_config(&self) -> anyhow::Result<ApiConfig> {
        let token = self
            .api_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("no TMDB access token configured; set TMDB_API_TOKEN or api_token in {SETTINGS_FILE}")
            })?;
        Ok(ApiConfig {
            base_url: self.api_base_url.clone(),
            access_token: token,
            language: self.language.clone(),
        })
    }
}

/// Defaults, then the settings file, then the environment. An explicit `path`
/// must exist; the default `explorer.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let raw = match path {
        Some(path) => Some((
            path,
            fs::read_to_string(path)
                .with_context(|| format!("failed to open settings file '{}'", path.display()))?,
        )),
        None => {
            let path = Path::new(SETTINGS_FILE);
            fs::read_to_string(path).ok().map(|raw| (path, raw))
        }
    };
    if let Some((path, raw)) = raw {
        apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("failed to read settings from '{}'", path.display()))?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

pub fn apply_file_overrides(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("api_token") {
        settings.api_token = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("language") {
        settings.language = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("image_base_url") {
        settings.image_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("placeholder_image_url") {
        settings.placeholder_image_url = v.clone();
    }
    if let Some(v) = file_cfg.get("default_category") {
        settings.default_category = v.parse()?;
    }
    Ok(())
}

pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("TMDB_API_TOKEN") {
        settings.api_token = Some(v);
    }
    if let Some(v) = lookup("APP__API_TOKEN") {
        settings.api_token = Some(v);
    }

    if let Some(v) = lookup("TMDB_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__IMAGE_BASE_URL") {
        settings.image_base_url = v;
    }

    if let Some(v) = lookup("APP__LANGUAGE") {
        settings.language = Some(v);
    }

    if let Some(v) = lookup("APP__DEFAULT_CATEGORY") {
        settings.default_category = v
            .parse()
            .context("APP__DEFAULT_CATEGORY is not a known category")?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
