use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_sable_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SABLE_CONFIG_PATH", "/tmp/sable-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/sable-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("sable")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("sable")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home_then_local_state() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-state/sable/sable.log")
    );

    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/sable/sable.log")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 40
tick_ms = 250

[playback]
shuffle = true
loop_queue = true

[controls]
scrub_seconds = 9
volume_step = 10

[notifications]
error_dismiss_ms = 1500

[ui]
follow_playback = false
header_text = "hello"
now_playing_track_fields = ["album-artist", "title"]
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " | "

[library]
extensions = ["mp3"]
recursive = false
display_fields = ["filename"]
display_separator = "::"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SABLE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SABLE__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 40);
    assert_eq!(s.audio.tick_ms, 250);
    assert!(s.playback.shuffle);
    assert!(s.playback.loop_queue);
    assert!(!s.playback.loop_track);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.controls.volume_step, 10);
    assert_eq!(s.notifications.error_dismiss_ms, 1500);
    // Untouched keys keep their defaults.
    assert_eq!(s.notifications.info_dismiss_ms, 3000);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.header_text, "hello");
    assert!(matches!(
        s.ui.now_playing_track_fields[0],
        TrackDisplayField::AlbumArtist
    ));
    assert!(matches!(s.ui.now_playing_time_fields[1], TimeField::Remaining));
    assert_eq!(s.ui.now_playing_time_separator, " | ");
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert_eq!(s.library.display_separator, "::");
    assert!(matches!(s.library.display_fields[0], TrackDisplayField::Filename));
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 60
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SABLE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SABLE__AUDIO__VOLUME", "25");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 25);
}

#[test]
fn settings_missing_file_falls_back_to_defaults() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "SABLE_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );
    let _g2 = EnvGuard::remove("SABLE__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 80);
    assert_eq!(s.audio.tick_ms, 1000);
    assert!(!s.playback.shuffle);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_zero_tick_and_loud_volume() {
    let mut s = Settings::default();
    s.audio.tick_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.volume = 101;
    assert!(s.validate().unwrap_err().contains("101"));
}
