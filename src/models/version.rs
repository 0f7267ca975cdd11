use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag name the registry uses to mark the release channel of a
/// version.
const CHANNEL_TAG: &str = "Channel";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub tags: Vec<VersionTag>,
    #[serde(default)]
    pub file_info: Option<FileInfo>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub downloads: Option<i64>,
}

impl Version {
    /// The release channel tag, when present.
    pub fn channel(&self) -> Option<&VersionTag> {
        self.tags.iter().find(|tag| tag.name == CHANNEL_TAG)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionTag {
    pub name: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub color: Option<TagColor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagColor {
    #[serde(default)]
    pub foreground: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<i64>,
    #[serde(default)]
    pub md5_hash: Option<String>,
}

impl FileInfo {
    /// Human-readable file size, or "unknown" when absent.
    pub fn display_size(&self) -> String {
        match self.size_bytes {
            Some(bytes) if bytes >= 1_048_576 => {
                format!("{:.1} MB", bytes as f64 / 1_048_576.0)
            }
            Some(bytes) if bytes >= 1024 => format!("{:.1} KB", bytes as f64 / 1024.0),
            Some(bytes) => format!("{} B", bytes),
            None => "unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_with_channel_tag() {
        let json = r##"{
            "name": "2.1.0",
            "created_at": "2020-01-15T09:30:00Z",
            "visibility": "public",
            "tags": [
                {"name": "Sponge", "data": "7.1", "color": {"foreground": "#fff", "background": "#f7cf0d"}},
                {"name": "Channel", "data": "Release", "color": {"foreground": "#fff", "background": "#009600"}}
            ],
            "file_info": {"name": "nucleus-2.1.0.jar", "size_bytes": 4815162, "md5_hash": "d41d8cd98f00b204e9800998ecf8427e"},
            "downloads": 1337
        }"##;

        let version: Version = serde_json::from_str(json).expect("Failed to parse version JSON");
        let channel = version.channel().expect("has a channel tag");
        assert_eq!(channel.data.as_deref(), Some("Release"));
        assert_eq!(
            channel.color.as_ref().unwrap().background.as_deref(),
            Some("#009600")
        );
    }

    #[test]
    fn test_version_without_tags_has_no_channel() {
        let version: Version =
            serde_json::from_str(r#"{"name": "0.1.0"}"#).expect("Failed to parse bare version");
        assert!(version.channel().is_none());
        assert!(version.file_info.is_none());
    }

    #[test]
    fn test_display_size() {
        let info = |size_bytes| FileInfo {
            name: None,
            size_bytes,
            md5_hash: None,
        };
        assert_eq!(info(Some(512)).display_size(), "512 B");
        assert_eq!(info(Some(2048)).display_size(), "2.0 KB");
        assert_eq!(info(Some(4_815_162)).display_size(), "4.6 MB");
        assert_eq!(info(None).display_size(), "unknown");
    }
}
