//! Flat key/value files
//!
//! Every stats file is a single section of `key=value` lines with all values
//! stored as strings. Numeric reads are lenient: anything that fails to
//! parse reads as zero.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use configparser::ini::Ini;

use super::error::StatsError;

/// configparser's section for keys that appear before any header
const SECTION: &str = "default";

/// One key/value record
#[derive(Debug, Clone)]
pub struct KvRecord {
    ini: Ini,
}

impl Default for KvRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl KvRecord {
    pub fn new() -> Self {
        // Keys are case sensitive (`best.1.EASY.maxCombo`)
        Self { ini: Ini::new_cs() }
    }

    /// Parse record text
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut ini = Ini::new_cs();
        ini.read(text.to_string())?;
        Ok(Self { ini })
    }

    /// Read a record file; `Ok(None)` if it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, StatsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StatsError::io(path, e)),
        };
        Self::parse(&text)
            .map(Some)
            .map_err(|reason| StatsError::malformed(path, reason))
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.ini.set(SECTION, key, Some(value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.ini.get(SECTION, key)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_i64(&self, key: &str) -> i64 {
        self.parsed(key).unwrap_or(0)
    }

    pub fn get_u32(&self, key: &str) -> u32 {
        self.parsed(key).unwrap_or(0)
    }

    pub fn get_u64(&self, key: &str) -> u64 {
        self.parsed(key).unwrap_or(0)
    }

    pub fn get_f64(&self, key: &str) -> f64 {
        self.parsed::<f64>(key)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// All keys present in the record
    pub fn keys(&self) -> Vec<String> {
        self.ini
            .get_map_ref()
            .get(SECTION)
            .map(|section| section.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Write to a temp file next to `path`, then rename over it.
    /// A crash mid-write leaves the previous file intact.
    pub fn write_atomic(&self, path: &Path) -> Result<(), StatsError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StatsError::io(dir, e))?;
        }

        let tmp = path.with_extension("properties.tmp");
        self.ini.write(&tmp).map_err(|e| StatsError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(StatsError::io(path, e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_numbers() {
        let kv = KvRecord::parse("a=12\nb= 7 \nc=abc\nd=1.5\ne=NaN\nf=-3\n").unwrap();
        assert_eq!(kv.get_i64("a"), 12);
        assert_eq!(kv.get_u32("b"), 7);
        assert_eq!(kv.get_u32("c"), 0);
        assert_eq!(kv.get_u32("d"), 0);
        assert_eq!(kv.get_f64("d"), 1.5);
        assert_eq!(kv.get_f64("e"), 0.0);
        assert_eq!(kv.get_u32("f"), 0);
        assert_eq!(kv.get_i64("f"), -3);
        assert_eq!(kv.get_i64("missing"), 0);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut kv = KvRecord::new();
        kv.set("best.1.EASY.maxCombo", 5);
        assert_eq!(kv.get("best.1.EASY.maxCombo").as_deref(), Some("5"));
        assert_eq!(kv.get("best.1.easy.maxcombo"), None);
    }

    #[test]
    fn test_comment_lines_skipped() {
        let kv = KvRecord::parse("#Last stats for bob\nuserId=bob\n").unwrap();
        assert_eq!(kv.get_or("userId", ""), "bob");
        assert_eq!(kv.keys(), vec!["userId".to_string()]);
    }

    #[test]
    fn test_write_atomic_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("last_bob.properties");

        let mut kv = KvRecord::new();
        kv.set("timeText", "2025-12-06 18:32");
        kv.set("difficulty", "VERY EASY");
        kv.write_atomic(&path).unwrap();

        let loaded = KvRecord::load(&path).unwrap().unwrap();
        assert_eq!(loaded.get_or("timeText", ""), "2025-12-06 18:32");
        assert_eq!(loaded.get_or("difficulty", ""), "VERY EASY");
        assert!(!path.with_extension("properties.tmp").exists());
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(KvRecord::load(&dir.path().join("nope.properties")).unwrap().is_none());
    }

    #[test]
    fn test_load_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = KvRecord::load(dir.path()).unwrap_err();
        assert!(matches!(err, StatsError::Io { .. }));
    }
}
