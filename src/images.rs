use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub const IMAGE_SUFFIX: &str = ".jpg";

/// Stored image name for an uploaded file: SHA256 of the original file name
/// (not its content) as lowercase hex, followed by `.jpg`
pub fn hashed_image_name(original_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original_name.as_bytes());
    format!("{}{}", hex::encode(hasher.finalize()), IMAGE_SUFFIX)
}

pub fn has_image_suffix(file_name: &str) -> bool {
    file_name.ends_with(IMAGE_SUFFIX)
}

/// Directory of stored item images
pub struct ImageStore {
    image_dir: PathBuf,
    default_image: String,
}

impl ImageStore {
    pub fn new(image_dir: impl Into<PathBuf>, default_image: impl Into<String>) -> Self {
        ImageStore {
            image_dir: image_dir.into(),
            default_image: default_image.into(),
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Write image bytes under the given stored name
    pub async fn store_file(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.image_dir).await?;

        let file_path = self.resolve(file_name)?;
        tokio::fs::write(&file_path, bytes).await?;

        Ok(file_path)
    }

    /// Read a stored image, substituting the default image when it is missing.
    /// Returns None when the default image is missing as well.
    pub async fn read_or_default(&self, file_name: &str) -> Result<Option<Vec<u8>>> {
        let file_path = self.resolve(file_name)?;

        let file_path = if tokio::fs::try_exists(&file_path).await? {
            file_path
        } else {
            tracing::debug!("Image not found: {}", file_path.display());
            self.image_dir.join(&self.default_image)
        };

        match tokio::fs::read(&file_path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Default image missing: {}", file_path.display());
                Ok(None)
            }
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read image {}: {}",
                file_path.display(),
                e
            )),
        }
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        if !is_plain_file_name(file_name) {
            return Err(anyhow::anyhow!("Invalid image file name: {}", file_name));
        }
        Ok(self.image_dir.join(file_name))
    }
}

/// True when the name is a single path component, so it cannot leave the image directory
pub fn is_plain_file_name(file_name: &str) -> bool {
    let path = Path::new(file_name);
    !file_name.is_empty()
        && !file_name.contains(['/', '\\'])
        && path.file_name().map(|name| name == path.as_os_str()) == Some(true)
}
