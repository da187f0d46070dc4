use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use super::ChartError;

/// Medal awarded for a top-3 rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_rank(rank: i64) -> Option<Medal> {
        match rank {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Medal::Gold => "gold",
            Medal::Silver => "silver",
            Medal::Bronze => "bronze",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Medal::Gold => "gold_medal.jpg",
            Medal::Silver => "silver_medal.jpg",
            Medal::Bronze => "bronze_medal.jpg",
        }
    }
}

/// Which image files back the three medals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MedalLayout {
    /// All three ranks use `gold_medal.jpg`
    Shared,
    /// `gold_medal.jpg`, `silver_medal.jpg` and `bronze_medal.jpg`
    Distinct,
}

/// Raw image bytes plus the MIME type used when embedding them.
#[derive(Debug, Clone, PartialEq)]
pub struct MedalIcon {
    pub mime: &'static str,
    pub data: Vec<u8>,
}

impl MedalIcon {
    fn read(path: &Path) -> Result<Self, ChartError> {
        let mime = mime_for(path).ok_or_else(|| ChartError::UnsupportedAsset {
            path: path.to_path_buf(),
        })?;
        let data = std::fs::read(path).map_err(|source| ChartError::Asset {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded medal image {} ({} bytes)", path.display(), data.len());
        Ok(MedalIcon { mime, data })
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.data))
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// The icons for gold, silver and bronze.
#[derive(Debug, Clone)]
pub struct MedalIcons {
    gold: Arc<MedalIcon>,
    silver: Arc<MedalIcon>,
    bronze: Arc<MedalIcon>,
}

impl MedalIcons {
    /// Read the medal images from `dir`. A missing or unreadable file is an
    /// error; there is no fallback icon.
    pub fn load(dir: &Path, layout: MedalLayout) -> Result<Self, ChartError> {
        let path = |medal: Medal| -> PathBuf { dir.join(medal.file_name()) };
        match layout {
            MedalLayout::Shared => {
                let icon = Arc::new(MedalIcon::read(&path(Medal::Gold))?);
                Ok(MedalIcons {
                    gold: icon.clone(),
                    silver: icon.clone(),
                    bronze: icon,
                })
            }
            MedalLayout::Distinct => Ok(MedalIcons {
                gold: Arc::new(MedalIcon::read(&path(Medal::Gold))?),
                silver: Arc::new(MedalIcon::read(&path(Medal::Silver))?),
                bronze: Arc::new(MedalIcon::read(&path(Medal::Bronze))?),
            }),
        }
    }

    #[cfg(test)]
    pub fn from_bytes(gold: Vec<u8>, silver: Vec<u8>, bronze: Vec<u8>) -> Self {
        let icon = |data| Arc::new(MedalIcon { mime: "image/jpeg", data });
        MedalIcons {
            gold: icon(gold),
            silver: icon(silver),
            bronze: icon(bronze),
        }
    }

    pub fn icon(&self, medal: Medal) -> Arc<MedalIcon> {
        match medal {
            Medal::Gold => self.gold.clone(),
            Medal::Silver => self.silver.clone(),
            Medal::Bronze => self.bronze.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_rank() {
        assert_eq!(Medal::for_rank(1), Some(Medal::Gold));
        assert_eq!(Medal::for_rank(2), Some(Medal::Silver));
        assert_eq!(Medal::for_rank(3), Some(Medal::Bronze));
        assert_eq!(Medal::for_rank(0), None);
        assert_eq!(Medal::for_rank(4), None);
    }

    #[test]
    fn test_shared_layout_uses_gold_for_all() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gold_medal.jpg"), b"gold").unwrap();

        let icons = MedalIcons::load(dir.path(), MedalLayout::Shared).unwrap();
        assert_eq!(icons.icon(Medal::Silver).data, b"gold".to_vec());
        assert_eq!(icons.icon(Medal::Bronze).data, b"gold".to_vec());
    }

    #[test]
    fn test_distinct_layout() {
        let dir = tempfile::tempdir().unwrap();
        for (name, data) in [
            ("gold_medal.jpg", "gold"),
            ("silver_medal.jpg", "silver"),
            ("bronze_medal.jpg", "bronze"),
        ] {
            std::fs::write(dir.path().join(name), data).unwrap();
        }

        let icons = MedalIcons::load(dir.path(), MedalLayout::Distinct).unwrap();
        assert_eq!(icons.icon(Medal::Gold).data, b"gold".to_vec());
        assert_eq!(icons.icon(Medal::Silver).data, b"silver".to_vec());
        assert_eq!(icons.icon(Medal::Bronze).data, b"bronze".to_vec());
    }

    #[test]
    fn test_missing_asset_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gold_medal.jpg"), b"gold").unwrap();

        let err = MedalIcons::load(dir.path(), MedalLayout::Distinct).unwrap_err();
        match err {
            ChartError::Asset { path, .. } => assert!(path.ends_with("silver_medal.jpg")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_data_uri() {
        let icon = MedalIcon {
            mime: "image/png",
            data: b"hi".to_vec(),
        };
        assert_eq!(icon.data_uri(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_mime_detection() {
        assert_eq!(mime_for(Path::new("a/gold.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("gold.png")), Some("image/png"));
        assert_eq!(mime_for(Path::new("gold.bmp")), None);
        assert_eq!(mime_for(Path::new("gold")), None);
    }
}
