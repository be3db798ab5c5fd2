//! Filesystem object store: one directory per bucket, one file per object.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, trace};

use super::{checksum, BackupError, ListOptions, ObjectInfo, ObjectStore, Result};

/// Suffix of files being written; never listed.
const PARTIAL_SUFFIX: &str = ".partial";

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Store objects under `root`. Nothing is created until the first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        validate_name(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.bucket_dir(bucket)?.join(name))
    }
}

/// Names must be a single plain path component.
fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.ends_with(PARTIAL_SUFFIX)
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(BackupError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn io_error(bucket: &str) -> impl FnOnce(std::io::Error) -> BackupError + '_ {
    move |source| BackupError::Io {
        bucket: bucket.to_string(),
        source,
    }
}

fn to_utc(time: std::io::Result<SystemTime>) -> DateTime<Utc> {
    time.map_or(DateTime::<Utc>::UNIX_EPOCH, DateTime::<Utc>::from)
}

fn info_from_metadata(name: String, metadata: &std::fs::Metadata) -> ObjectInfo {
    let updated_at = to_utc(metadata.modified());
    let created_at = metadata
        .created()
        .map_or(updated_at, DateTime::<Utc>::from);
    ObjectInfo {
        name,
        size: metadata.len(),
        created_at,
        updated_at,
        checksum: None,
    }
}

#[async_trait::async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        upsert: bool,
    ) -> Result<ObjectInfo> {
        let dir = self.bucket_dir(bucket)?;
        let path = self.object_path(bucket, name)?;

        fs::create_dir_all(&dir).await.map_err(io_error(bucket))?;

        if !upsert && fs::try_exists(&path).await.map_err(io_error(bucket))? {
            return Err(BackupError::AlreadyExists {
                bucket: bucket.to_string(),
                name: name.to_string(),
            });
        }

        let digest = checksum(&bytes);
        let partial = dir.join(format!("{name}{PARTIAL_SUFFIX}"));
        fs::write(&partial, &bytes).await.map_err(io_error(bucket))?;
        fs::rename(&partial, &path).await.map_err(io_error(bucket))?;
        debug!(bucket, name, bytes = bytes.len(), "Stored object");

        let metadata = fs::metadata(&path).await.map_err(io_error(bucket))?;
        let mut info = info_from_metadata(name.to_string(), &metadata);
        info.checksum = Some(digest);
        Ok(info)
    }

    async fn get(&self, bucket: &str, name: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, name)?;
        fs::read(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                BackupError::NotFound {
                    bucket: bucket.to_string(),
                    name: name.to_string(),
                }
            } else {
                BackupError::Io {
                    bucket: bucket.to_string(),
                    source,
                }
            }
        })
    }

    async fn list(&self, bucket: &str, options: &ListOptions) -> Result<Vec<ObjectInfo>> {
        let dir = self.bucket_dir(bucket)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(bucket)(e)),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(bucket))? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if validate_name(&name).is_err() {
                trace!(bucket, name = %name, "Skipping non-object entry");
                continue;
            }
            if let Some(search) = &options.search {
                if !name.contains(search.as_str()) {
                    continue;
                }
            }
            let metadata = entry.metadata().await.map_err(io_error(bucket))?;
            if metadata.is_file() {
                objects.push(info_from_metadata(name, &metadata));
            }
        }

        objects.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        if let Some(limit) = options.limit {
            objects.truncate(limit);
        }
        Ok(objects)
    }

    async fn stat(&self, bucket: &str, name: &str) -> Result<Option<ObjectInfo>> {
        let path = self.object_path(bucket, name)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(bucket)(e)),
        };
        let metadata = fs::metadata(&path).await.map_err(io_error(bucket))?;
        let mut info = info_from_metadata(name.to_string(), &metadata);
        info.checksum = Some(checksum(&bytes));
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(test: &str) -> FsObjectStore {
        let root = std::env::temp_dir().join(format!(
            "kaizen_fs_store_{test}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        FsObjectStore::new(root)
    }

    fn cleanup(store: &FsObjectStore) {
        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = temp_store("put_get");
        let info = store
            .put("kaizenusers", "ana.json", b"{}".to_vec(), true)
            .await
            .unwrap();

        assert_eq!(info.name, "ana.json");
        assert_eq!(info.size, 2);
        assert_eq!(info.checksum.as_deref(), Some(checksum(b"{}").as_str()));
        assert_eq!(store.get("kaizenusers", "ana.json").await.unwrap(), b"{}");
        cleanup(&store);
    }

    #[tokio::test]
    async fn test_put_without_upsert_refuses_overwrite() {
        let store = temp_store("no_upsert");
        store.put("b", "x.json", b"1".to_vec(), false).await.unwrap();

        let err = store.put("b", "x.json", b"2".to_vec(), false).await.unwrap_err();
        assert!(matches!(err, BackupError::AlreadyExists { .. }));
        assert_eq!(store.get("b", "x.json").await.unwrap(), b"1");

        store.put("b", "x.json", b"3".to_vec(), true).await.unwrap();
        assert_eq!(store.get("b", "x.json").await.unwrap(), b"3");
        cleanup(&store);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = temp_store("missing");
        let err = store.get("b", "nope.json").await.unwrap_err();
        assert!(matches!(err, BackupError::NotFound { .. }));
        assert!(store.stat("b", "nope.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_empty_bucket() {
        let store = temp_store("empty");
        let objects = store.list("never", &ListOptions::default()).await.unwrap();
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit_and_search() {
        let store = temp_store("list");
        for name in ["a.json", "b.json", "c.json"] {
            store.put("b", name, b"{}".to_vec(), true).await.unwrap();
        }

        let all = store.list("b", &ListOptions::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["c.json", "b.json", "a.json"]);

        let limited = store.list("b", &ListOptions::limit(2)).await.unwrap();
        assert_eq!(limited.len(), 2);

        let searched = store
            .list(
                "b",
                &ListOptions {
                    limit: None,
                    search: Some("b".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].name, "b.json");
        cleanup(&store);
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let store = temp_store("names");
        for name in ["", "../x.json", "a/b.json", ".hidden", "x.json.partial"] {
            let err = store.put("b", name, Vec::new(), true).await.unwrap_err();
            assert!(matches!(err, BackupError::InvalidName { .. }), "{name}");
        }
        assert!(store.list("../etc", &ListOptions::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_stat_has_checksum() {
        let store = temp_store("stat");
        store.put("b", "s.json", b"[1]".to_vec(), true).await.unwrap();

        let info = store.stat("b", "s.json").await.unwrap().unwrap();
        assert_eq!(info.size, 3);
        assert_eq!(info.checksum, Some(checksum(b"[1]")));
        cleanup(&store);
    }
}
