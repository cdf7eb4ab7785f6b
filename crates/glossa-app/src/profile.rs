use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glossa_config::{Config, SessionSnapshot};
use serde::{Deserialize, Serialize};

/// Where profiles and the session snapshot live
#[derive(Debug, Clone)]
pub struct ProfilePaths {
    root: PathBuf,
}

impl ProfilePaths {
    /// `$GLOSSA_HOME`, else `<config dir>/glossa`
    pub fn resolve() -> anyhow::Result<Self> {
        if let Some(home) = env::var_os("GLOSSA_HOME") {
            return Ok(Self::at(home));
        }

        let config_dir = dirs::config_dir().context("No user config directory on this platform")?;
        Ok(Self::at(config_dir.join("glossa")))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    pub fn profile_file(&self, name: &str) -> PathBuf {
        self.profiles_dir().join(format!("{name}.json"))
    }

    pub fn session_file(&self) -> PathBuf {
        self.root.join("session.json")
    }
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Initialize user config folders and main profile if missing
pub fn init_user_config(paths: &ProfilePaths) -> anyhow::Result<()> {
    fs::create_dir_all(paths.profiles_dir())
        .with_context(|| format!("Failed to create {}", paths.profiles_dir().display()))?;

    let main_profile = paths.profile_file("main");

    if !main_profile.exists() {
        let profile = Profile {
            name: "main".into(),
            value: Config::new(),
        };
        fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created main profile at {}", main_profile.display());
    }

    Ok(())
}

fn read_profile(file: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(file)?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("Invalid profile {}", file.display()))?;
    Ok(profile.value)
}

/// Load a user profile by name, defaulting to main if name not found
pub fn load_user_profile(paths: &ProfilePaths, name: &str) -> anyhow::Result<Config> {
    let profile_file = paths.profile_file(name);

    if profile_file.exists() {
        return read_profile(&profile_file);
    }

    tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
    let main_file = paths.profile_file("main");
    if main_file.exists() {
        read_profile(&main_file)
    } else {
        Ok(Config::new())
    }
}

/// Add a new profile cloned from main
pub fn add_profile_from_default(paths: &ProfilePaths, new_name: &str) -> anyhow::Result<PathBuf> {
    let default_config = load_user_profile(paths, "main")?;
    let profile = Profile {
        name: new_name.into(),
        value: default_config,
    };
    let file = paths.profile_file(new_name);
    fs::create_dir_all(paths.profiles_dir())?;
    fs::write(&file, serde_json::to_string_pretty(&profile)?)?;
    tracing::info!("Created new profile: {new_name}");
    Ok(file)
}

/// Last saved session; a missing or unreadable file starts fresh
pub fn load_session(paths: &ProfilePaths) -> SessionSnapshot {
    let file = paths.session_file();
    if !file.exists() {
        return SessionSnapshot::default();
    }

    match SessionSnapshot::load(&file) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!("Ignoring session file {}: {}", file.display(), e);
            SessionSnapshot::default()
        }
    }
}

pub fn save_session(paths: &ProfilePaths, snapshot: &SessionSnapshot) -> anyhow::Result<()> {
    fs::create_dir_all(paths.root())?;
    snapshot
        .save(&paths.session_file())
        .with_context(|| format!("Failed to write {}", paths.session_file().display()))?;
    tracing::info!("Session saved ({} tabs)", snapshot.tabs.len());
    Ok(())
}
