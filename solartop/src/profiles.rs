//! Connection profiles: load/save simple JSON mapping of profile name -> { url, history }
//! Stored under XDG config dir: $XDG_CONFIG_HOME/solartop/profiles.json (fallback ~/.config/solartop/profiles.json)

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProfileEntry {
    pub url: String,
    /// History samples to replay on connect; None means the built-in default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("solartop")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("solartop")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

pub fn load_profiles() -> ProfilesFile {
    let path = profiles_path();
    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> std::io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p).expect("serialize profiles");
    fs::write(path, data)
}

pub enum ResolveProfile {
    /// Use the provided runtime inputs (not persisted). (url, history)
    Direct(String, Option<i64>),
    /// Loaded from existing profile entry (url, history)
    Loaded(String, Option<i64>),
    /// Should prompt user to select among profile names
    PromptSelect(Vec<String>),
    /// Should prompt user to create a new profile (name)
    PromptCreate(String),
    /// No profile could be resolved (e.g., missing arguments)
    None,
}

pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub history: Option<i64>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        // Case: only profile name given -> try load
        if self.url.is_none() && self.profile_name.is_some() {
            let name = self.profile_name.unwrap();
            if let Some(entry) = pf.profiles.get(&name) {
                return ResolveProfile::Loaded(entry.url.clone(), entry.history);
            } else {
                return ResolveProfile::PromptCreate(name);
            }
        }
        // URL provided -> direct (maybe later saved by caller)
        if let Some(u) = self.url {
            return ResolveProfile::Direct(u, self.history);
        }
        // Nothing provided -> maybe prompt select if profiles exist
        if pf.profiles.is_empty() {
            ResolveProfile::None
        } else {
            ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(name: &str, url: &str, history: Option<i64>) -> ProfilesFile {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert(
            name.to_string(),
            ProfileEntry {
                url: url.to_string(),
                history,
            },
        );
        pf
    }

    #[test]
    fn url_alone_resolves_direct() {
        let req = ProfileRequest {
            profile_name: None,
            url: Some("ws://solar:3030/ws".into()),
            history: Some(20),
        };
        match req.resolve(&ProfilesFile::default()) {
            ResolveProfile::Direct(url, history) => {
                assert_eq!(url, "ws://solar:3030/ws");
                assert_eq!(history, Some(20));
            }
            _ => panic!("expected Direct"),
        }
    }

    #[test]
    fn known_profile_name_loads_entry() {
        let pf = file_with("home", "wss://roof/ws", Some(60));
        let req = ProfileRequest {
            profile_name: Some("home".into()),
            url: None,
            history: None,
        };
        match req.resolve(&pf) {
            ResolveProfile::Loaded(url, history) => {
                assert_eq!(url, "wss://roof/ws");
                assert_eq!(history, Some(60));
            }
            _ => panic!("expected Loaded"),
        }
    }

    #[test]
    fn unknown_profile_name_prompts_create() {
        let req = ProfileRequest {
            profile_name: Some("cabin".into()),
            url: None,
            history: None,
        };
        match req.resolve(&ProfilesFile::default()) {
            ResolveProfile::PromptCreate(name) => assert_eq!(name, "cabin"),
            _ => panic!("expected PromptCreate"),
        }
    }

    #[test]
    fn no_inputs_prompt_select_when_profiles_exist() {
        let pf = file_with("home", "ws://a/ws", None);
        let req = ProfileRequest {
            profile_name: None,
            url: None,
            history: None,
        };
        match req.resolve(&pf) {
            ResolveProfile::PromptSelect(names) => assert_eq!(names, vec!["home".to_string()]),
            _ => panic!("expected PromptSelect"),
        }
        let empty_req = ProfileRequest {
            profile_name: None,
            url: None,
            history: None,
        };
        assert!(matches!(
            empty_req.resolve(&ProfilesFile::default()),
            ResolveProfile::None
        ));
    }

    #[test]
    fn history_field_is_optional_on_disk() {
        let bare = r#"{"profiles":{"home":{"url":"ws://a/ws"}},"version":0}"#;
        let pf: ProfilesFile = serde_json::from_str(bare).unwrap();
        assert_eq!(pf.profiles["home"].history, None);
        let out = serde_json::to_string(&pf).unwrap();
        assert!(
            !out.contains("history"),
            "unset history should not be written: {out}"
        );
    }
}
