use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestUploadUrl {
    pub filename: String,

    /// explicit storage key, only honored by the gateway for admins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrl {
    pub upload_url: String,
    pub s3_key: String,

    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub key: String,
    pub size: u64,
    pub last_modified: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Option<Vec<FileRecord>>,

    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub count: Option<u64>,
}

impl FileList {
    /// the listed records, an absent list is the same as an empty one
    pub fn into_files(self) -> Vec<FileRecord> {
        self.files.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrl {
    pub download_url: String,

    #[serde(default)]
    pub s3_key: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFile {
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub s3_key: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn listing_shapes() {
        let full: FileList = serde_json::from_str(r#"{
            "files": [{"key": "users/a/x.txt", "size": 12, "lastModified": "2024-01-01T00:00:00+00:00"}],
            "prefix": "users/a/",
            "count": 1
        }"#).unwrap();
        let absent: FileList = serde_json::from_str("{}").unwrap();
        let null: FileList = serde_json::from_str(r#"{"files": null}"#).unwrap();

        let files = full.into_files();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].key, "users/a/x.txt");
        assert_eq!(files[0].size, 12);
        assert!(absent.into_files().is_empty());
        assert!(null.into_files().is_empty());
    }

    #[test]
    fn upload_request_skips_missing_path() {
        let body = RequestUploadUrl {
            filename: String::from("a.txt"),
            path: None,
        };

        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"filename":"a.txt"}"#);
    }
}
