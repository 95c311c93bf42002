use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One named player and their best score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub high_score: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileData {
    profiles: Vec<Profile>,
    last_active: Option<String>,
}

/// Profile and high-score persistence over a small JSON file.
///
/// Every disk failure is absorbed: an unreadable or corrupt file yields
/// the default "Guest" set, and a failed write leaves the in-memory state
/// authoritative for the session. The game never sees an error from here.
pub struct ProfileManager {
    path: PathBuf,
    data: ProfileData,
    max_name_len: usize,
}

impl ProfileManager {
    pub fn new(path: impl Into<PathBuf>, max_name_len: usize) -> Self {
        let path = path.into();
        let data = Self::load(&path);
        let mut manager = Self {
            path,
            data,
            max_name_len,
        };
        if manager.data.profiles.is_empty() {
            manager.create_profile("Guest");
        }
        if manager.get_active().is_none() {
            let first = manager.data.profiles[0].name.clone();
            manager.set_active(&first);
        }
        manager
    }

    pub fn default_path() -> PathBuf {
        Path::new("assets").join("profiles.json")
    }

    fn load(path: &Path) -> ProfileData {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(_) => ProfileData::default(),
        }
    }

    fn save(&self) {
        if let Some(dir) = self.path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        if let Ok(text) = serde_json::to_string_pretty(&self.data) {
            let _ = fs::write(&self.path, text);
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.data.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get_active(&self) -> Option<&Profile> {
        let name = self.data.last_active.as_deref()?;
        self.data.profiles.iter().find(|p| p.name == name)
    }

    pub fn set_active(&mut self, name: &str) -> bool {
        if self.data.profiles.iter().any(|p| p.name == name) {
            self.data.last_active = Some(name.to_string());
            self.save();
            true
        } else {
            false
        }
    }

    /// Cycle the active profile to the next one in creation order.
    pub fn cycle_active(&mut self) {
        if self.data.profiles.is_empty() {
            return;
        }
        let current = self
            .get_active()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let idx = self
            .data
            .profiles
            .iter()
            .position(|p| p.name == current)
            .unwrap_or(0);
        let next = self.data.profiles[(idx + 1) % self.data.profiles.len()]
            .name
            .clone();
        self.set_active(&next);
    }

    /// Trimmed, length-capped, must be non-empty and unique. The new
    /// profile becomes active.
    pub fn create_profile(&mut self, name: &str) -> bool {
        let name: String = name.trim().chars().take(self.max_name_len).collect();
        if name.is_empty() || self.data.profiles.iter().any(|p| p.name == name) {
            return false;
        }
        self.data.last_active = Some(name.clone());
        self.data.profiles.push(Profile {
            name,
            high_score: 0,
        });
        self.save();
        true
    }

    /// Record a final score against the active profile. Returns true only
    /// on a strict improvement.
    pub fn update_high_score(&mut self, score: u32) -> bool {
        let Some(name) = self.data.last_active.clone() else {
            return false;
        };
        let Some(profile) = self.data.profiles.iter_mut().find(|p| p.name == name) else {
            return false;
        };
        if score > profile.high_score {
            profile.high_score = score;
            self.save();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_path() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "invaders-profiles-{}-{}.json",
            std::process::id(),
            n
        ))
    }

    #[test]
    fn test_fresh_store_gets_guest_profile() {
        let manager = ProfileManager::new(temp_path(), 12);
        assert_eq!(manager.names(), vec!["Guest"]);
        assert_eq!(manager.get_active().unwrap().name, "Guest");
        assert_eq!(manager.get_active().unwrap().high_score, 0);
    }

    #[test]
    fn test_create_profile_rules() {
        let mut manager = ProfileManager::new(temp_path(), 12);
        assert!(manager.create_profile("Ana"));
        assert_eq!(manager.get_active().unwrap().name, "Ana");
        // Duplicates and blanks are rejected.
        assert!(!manager.create_profile("Ana"));
        assert!(!manager.create_profile("   "));
        // Long names are capped, not rejected.
        assert!(manager.create_profile("AVeryLongProfileName"));
        assert_eq!(manager.get_active().unwrap().name, "AVeryLongPro");
    }

    #[test]
    fn test_high_score_updates_only_on_improvement() {
        let mut manager = ProfileManager::new(temp_path(), 12);
        assert!(manager.update_high_score(100));
        assert!(!manager.update_high_score(100));
        assert!(!manager.update_high_score(50));
        assert!(manager.update_high_score(101));
        assert_eq!(manager.get_active().unwrap().high_score, 101);
    }

    #[test]
    fn test_cycle_active_wraps() {
        let mut manager = ProfileManager::new(temp_path(), 12);
        manager.create_profile("Ana");
        manager.create_profile("Bea");
        manager.set_active("Guest");
        manager.cycle_active();
        assert_eq!(manager.get_active().unwrap().name, "Ana");
        manager.cycle_active();
        assert_eq!(manager.get_active().unwrap().name, "Bea");
        manager.cycle_active();
        assert_eq!(manager.get_active().unwrap().name, "Guest");
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let path = temp_path();
        {
            let mut manager = ProfileManager::new(&path, 12);
            manager.create_profile("Ana");
            manager.update_high_score(420);
        }
        let manager = ProfileManager::new(&path, 12);
        assert_eq!(manager.get_active().unwrap().name, "Ana");
        assert_eq!(manager.get_active().unwrap().high_score, 420);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let path = temp_path();
        fs::write(&path, "not json at all").unwrap();
        let manager = ProfileManager::new(&path, 12);
        assert_eq!(manager.names(), vec!["Guest"]);
        let _ = fs::remove_file(&path);
    }
}
