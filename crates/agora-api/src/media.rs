use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Stores uploaded bytes on disk and hands back the public URL they will be
/// served from.
///
/// Files land at `{root}/{kind}/{prefix}_{basename}` and are served under
/// `/static/{kind}/...` by the router.
pub struct MediaStore {
    root: PathBuf,
    public_base: String,
}

impl MediaStore {
    pub async fn new(root: PathBuf, public_base: &str) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        info!("Media storage directory: {}", root.display());
        Ok(Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` and return the URL clients should use to fetch them.
    pub async fn save(
        &self,
        kind: &str,
        prefix: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let dir = self.root.join(kind);
        fs::create_dir_all(&dir).await?;

        let file_name = format!("{}_{}", prefix, sanitize_file_name(original_name));
        let path = dir.join(&file_name);

        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        info!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(format!("{}/static/{}/{}", self.public_base, kind, file_name))
    }

    /// Delete a file previously returned by [`MediaStore::save`].
    pub async fn remove(&self, url: &str) -> Result<()> {
        let prefix = format!("{}/static/", self.public_base);
        let Some(relative) = url.strip_prefix(&prefix) else {
            bail!("{} is not a stored media url", url);
        };

        let relative = Path::new(relative);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            bail!("{} escapes the media root", url);
        }

        let path = self.root.join(relative);
        fs::remove_file(&path).await?;
        info!("Removed {}", path.display());
        Ok(())
    }
}

/// Last path component of a client-supplied name, reduced to a safe
/// character set.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\cat pic.png"), "cat_pic.png");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn save_writes_file_and_builds_url() {
        let root = std::env::temp_dir().join(format!("agora-media-{}", uuid::Uuid::new_v4()));
        let store = MediaStore::new(root.clone(), "http://localhost:8082/")
            .await
            .unwrap();

        let url = store.save("posts", "post_1", "cat.png", b"meow").await.unwrap();
        assert_eq!(url, "http://localhost:8082/static/posts/post_1_cat.png");

        let written = tokio::fs::read(root.join("posts").join("post_1_cat.png"))
            .await
            .unwrap();
        assert_eq!(written, b"meow");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn remove_deletes_saved_file_only_inside_root() {
        let root = std::env::temp_dir().join(format!("agora-media-{}", uuid::Uuid::new_v4()));
        let store = MediaStore::new(root.clone(), "http://localhost:8082")
            .await
            .unwrap();

        let url = store.save("posts", "post_2", "dog.png", b"woof").await.unwrap();
        let path = root.join("posts").join("post_2_dog.png");
        assert!(path.exists());

        store.remove(&url).await.unwrap();
        assert!(!path.exists());
        assert!(store.remove(&url).await.is_err());

        assert!(store
            .remove("http://localhost:8082/static/../outside.txt")
            .await
            .is_err());
        assert!(store.remove("http://elsewhere/static/posts/x.png").await.is_err());

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
