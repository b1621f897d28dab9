//! `config.json` model and the theme list built from it.

use crate::error::{BootError, Result};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Macos,
    Windows,
    Linux,
    Recovery,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Entry {
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub kind: EntryKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Options,
    Shutdown,
    Restart,
    About,
    Help,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Action {
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub action: ActionKind,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ThemeSpec {
    pub name: String,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UserSpec {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BiosSpec {
    pub vendor: String,
    pub version: String,
    pub cpu: String,
    pub memory_kb: u32,
    pub drives: Vec<String>,
}

impl Default for BiosSpec {
    fn default() -> Self {
        BiosSpec {
            vendor: "Award Modular BIOS v4.51PG, An Energy Star Ally".to_string(),
            version: "Copyright (C) 1984-98, Award Software, Inc.".to_string(),
            cpu: "Intel(R) Pentium(R) II 400MHz Processor".to_string(),
            memory_kb: 65536,
            drives: vec![
                "Primary Master   : QUANTUM FIREBALL 8.4GB".to_string(),
                "Primary Slave    : None".to_string(),
                "Secondary Master : ATAPI CD-ROM 32X".to_string(),
                "Secondary Slave  : None".to_string(),
            ],
        }
    }
}

fn default_timeout() -> u32 {
    5
}

fn default_image_root() -> String {
    "images/".to_string()
}

fn default_users() -> Vec<UserSpec> {
    vec![UserSpec {
        name: "Administrator".to_string(),
        avatar: None,
        password: None,
    }]
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BootConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    #[serde(default)]
    pub default_theme: Option<String>,
    pub themes: Vec<ThemeSpec>,
    #[serde(default = "default_users")]
    pub users: Vec<UserSpec>,
    #[serde(default)]
    pub bios: BiosSpec,
    #[serde(default = "default_image_root")]
    pub image_root: String,
    /// URL of a list of extra theme background files.
    #[serde(default)]
    pub theme_list: Option<String>,
}

impl BootConfig {
    pub fn from_json(text: &str) -> Result<BootConfig> {
        let config: BootConfig = serde_json::from_str(text)?;
        if config.themes.is_empty() {
            return Err(BootError::NoThemes);
        }
        Ok(config)
    }

    pub fn image_url(&self, file: &str) -> String {
        if file.contains("://") || file.starts_with('/') || self.image_root.is_empty() {
            return file.to_string();
        }
        let root = self.image_root.trim_end_matches('/');
        format!("{}/{}", root, file)
    }
}

/// Configured themes followed by any synthesized from a file-name list.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeList {
    themes: Vec<ThemeSpec>,
    default: usize,
}

const THEME_PREFIX_LEN: usize = "theme-".len();

fn theme_name_from_file(file: &str) -> Option<String> {
    let base = file.rsplit('/').next().unwrap_or(file).trim();
    let stem = match base.rfind('.') {
        None => base,
        Some(dot) => &base[..dot],
    };
    let prefixed = stem
        .get(..THEME_PREFIX_LEN)
        .is_some_and(|p| p.eq_ignore_ascii_case("theme-") || p.eq_ignore_ascii_case("theme_"));
    let stem = if prefixed { &stem[THEME_PREFIX_LEN..] } else { stem };
    if stem.trim().is_empty() {
        None
    } else {
        Some(stem.trim().to_string())
    }
}

impl ThemeList {
    pub fn build(config: &BootConfig, extra_file_names: &[String]) -> ThemeList {
        let mut themes = config.themes.clone();
        let default = config
            .default_theme
            .as_deref()
            .and_then(|name| themes.iter().position(|t| t.name.eq_ignore_ascii_case(name)))
            .unwrap_or(0);
        let (base_entries, base_actions) = themes
            .get(default)
            .map(|t| (t.entries.clone(), t.actions.clone()))
            .unwrap_or_default();

        for file in extra_file_names {
            let Some(name) = theme_name_from_file(file) else {
                continue;
            };
            if themes.iter().any(|t| t.name.eq_ignore_ascii_case(&name)) {
                continue;
            }
            themes.push(ThemeSpec {
                name,
                background: Some(config.image_url(file.trim())),
                entries: base_entries.clone(),
                actions: base_actions.clone(),
            });
        }
        ThemeList { themes, default }
    }

    /// Accepts a JSON array of strings or one file name per line.
    pub fn parse_file_names(text: &str) -> Vec<String> {
        if let Ok(names) = serde_json::from_str::<Vec<String>>(text) {
            return names;
        }
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ThemeSpec> {
        self.themes.get(index)
    }

    pub fn themes(&self) -> &[ThemeSpec] {
        &self.themes
    }

    pub fn default_index(&self) -> usize {
        self.default
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.themes
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
    }
}

async fn fetch_text(url: &str) -> Result<String> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts)?;
    let window = web_sys::window().ok_or_else(|| BootError::Dom("no window".into()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| BootError::Fetch(format!("{}: {:?}", url, e)))?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| BootError::Fetch(format!("{}: not a Response", url)))?;
    if !resp.ok() {
        return Err(BootError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    let text = JsFuture::from(resp.text()?).await?;
    text.as_string()
        .ok_or_else(|| BootError::Fetch(format!("{}: body is not text", url)))
}

/// Fetch `config.json` and, if it names one, the extra theme file list.
pub async fn load(url: &str) -> Result<(BootConfig, ThemeList)> {
    let config = BootConfig::from_json(&fetch_text(url).await?)?;
    let extra = match config.theme_list.as_deref() {
        Some(list_url) => match fetch_text(list_url).await {
            Ok(text) => ThemeList::parse_file_names(&text),
            Err(err) => {
                tracing::warn!("theme list {} unavailable: {}", list_url, err);
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    let themes = ThemeList::build(&config, &extra);
    tracing::info!(
        "loaded {} theme(s) from {}, {} synthesized",
        themes.len(),
        url,
        themes.len() - config.themes.len()
    );
    Ok((config, themes))
}
