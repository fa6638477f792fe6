//! Player preferences
//!
//! Persisted separately from profiles in LocalStorage, one plain string per
//! key.

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Background music on/off
    pub music_enabled: bool,
    /// User ID to sign in automatically on the next visit
    pub remembered_user: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_enabled: true,
            remembered_user: None,
        }
    }
}

impl Settings {
    /// LocalStorage keys
    pub const MUSIC_KEY: &'static str = "ruralRunner_music";
    pub const USER_KEY: &'static str = "ruralRunner_userId";

    /// Only an explicit `"false"` turns music off
    pub fn parse_music_flag(raw: Option<&str>) -> bool {
        raw != Some("false")
    }

    pub fn music_flag(&self) -> &'static str {
        if self.music_enabled { "true" } else { "false" }
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
        self.save();
    }

    pub fn remember_user(&mut self, id: &str) {
        self.remembered_user = Some(id.to_string());
        self.save();
    }

    pub fn forget_user(&mut self) {
        self.remembered_user = None;
        self.save();
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::info!("LocalStorage unavailable, using default settings");
            return Self::default();
        };

        let music = storage.get_item(Self::MUSIC_KEY).ok().flatten();
        let remembered_user = storage
            .get_item(Self::USER_KEY)
            .ok()
            .flatten()
            .filter(|id| !id.trim().is_empty());
        log::info!("Loaded settings from LocalStorage");
        Self {
            music_enabled: Self::parse_music_flag(music.as_deref()),
            remembered_user,
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::MUSIC_KEY, self.music_flag());
            let _ = match &self.remembered_user {
                Some(id) => storage.set_item(Self::USER_KEY, id),
                None => storage.remove_item(Self::USER_KEY),
            };
            log::debug!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
