use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ringmap::sector::Layout;
use ringmap::settings::{DEFAULT_SETTINGS, MapSettings, SettingsError};
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "COLONY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Map settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Settings together with the layout they validated into.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub settings: MapSettings,
    pub layout: Layout,
}

impl LoadedMap {
    pub fn builtin() -> Self {
        Self {
            settings: MapSettings::default(),
            layout: MapSettings::builtin_layout(),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "colony", "colony").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_from(path: &Path) -> Result<LoadedMap, ConfigError> {
    let settings = MapSettings::load(path, ENV_PREFIX)?;
    let layout = settings.layout()?;
    Ok(LoadedMap { settings, layout })
}

/// Like [`load_from`], but a file that does not exist yields the built-in map.
pub fn load_or_builtin(path: &Path) -> Result<LoadedMap, ConfigError> {
    if !path.exists() {
        log::info!("{} is gone; showing the built-in map", path.display());
        return Ok(LoadedMap::builtin());
    }
    load_from(path)
}

pub fn load_config() -> Result<LoadedMap, ConfigError> {
    load_or_builtin(&get_config_path()?)
}

/// The user's map when there is a usable one, the built-in colony otherwise.
pub fn load_or_default() -> LoadedMap {
    match get_config_path() {
        Ok(path) if path.exists() => match load_from(&path) {
            Ok(map) => map,
            Err(e) => {
                log::warn!(
                    "Ignoring {}: {}; showing the built-in map",
                    path.display(),
                    e
                );
                LoadedMap::builtin()
            }
        },
        Ok(path) => {
            log::debug!("No map config at {}", path.display());
            LoadedMap::builtin()
        }
        Err(e) => {
            log::warn!("{}", e);
            LoadedMap::builtin()
        }
    }
}

/// Writes the commented built-in map to the config path unless a file is
/// already there.
pub fn write_default_config() -> Result<PathBuf, std::io::Error> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_SETTINGS)?;
        log::info!("Wrote default map to {}", path.display());
    }
    Ok(path)
}

fn touches_config(event: &Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Watches the config directory and reports edits of the map file until the
/// UI side hangs up.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    if let Err(e) = watch_config(tx).await {
        log::error!("Config watcher stopped: {}", e);
    }
}

async fn watch_config(tx: Sender<AppEvent>) -> Result<(), ConfigError> {
    let config_path = get_config_path()?;
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        return Ok(());
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return Ok(());
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&config_dir, RecursiveMode::NonRecursive)?;
    log::debug!("Watching {}", config_dir.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if touches_config(&event, &config_path) => {
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn test_builtin_map_is_consistent() {
        let map = LoadedMap::builtin();
        assert_eq!(map.layout.sectors().len(), map.settings.sectors.len());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("colony-config-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs_err::write(
            &path,
            r##"
            title = "Two Halves"

            [[sectors]]
            name = "North"
            color = "#aabbcc"

            [[sectors]]
            name = "South"
            color = "#ccbbaa"
            "##,
        )
        .unwrap();

        let map = load_from(&path).unwrap();
        assert_eq!(map.settings.title, "Two Halves");
        assert_eq!(map.layout.sectors().len(), 2);

        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_from_rejects_gapped_layout() {
        let dir = std::env::temp_dir().join(format!("colony-gap-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs_err::write(
            &path,
            r##"
            [[sectors]]
            name = "Half"
            color = "#aabbcc"
            start = 0
            end = 180
            "##,
        )
        .unwrap();

        assert!(matches!(load_from(&path), Err(ConfigError::Settings(_))));

        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_removed_file_falls_back_to_builtin() {
        let dir = std::env::temp_dir().join(format!("colony-removed-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs_err::write(
            &path,
            r##"
            [[sectors]]
            name = "Everything"
            color = "#aabbcc"
            "##,
        )
        .unwrap();
        assert_eq!(load_or_builtin(&path).unwrap().layout.sectors().len(), 1);

        fs_err::remove_file(&path).unwrap();
        let map = load_or_builtin(&path).unwrap();
        assert_eq!(map.settings, MapSettings::default());
        assert_eq!(map.layout.sectors().len(), 7);

        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_touches_config() {
        let config = PathBuf::from("/tmp/colony/config.toml");
        let other = PathBuf::from("/tmp/colony/notes.txt");

        let cases = vec![
            (EventKind::Modify(ModifyKind::Any), config.clone(), true),
            (EventKind::Create(CreateKind::File), config.clone(), true),
            (EventKind::Modify(ModifyKind::Any), other, false),
            (EventKind::Access(AccessKind::Any), config.clone(), false),
        ];

        for (kind, path, expected) in cases {
            let event = Event::new(kind).add_path(path);
            assert_eq!(touches_config(&event, &config), expected);
        }
    }
}
