use crate::batch;
use crate::render::codec;
use fs_err as fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wheelcore::ImageSource;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} is not an image")]
    NotAnImage(PathBuf),
}

/// Reads one file and embeds it as a `data:` URL, keeping its original
/// encoding.
pub fn ingest_file(path: &Path) -> Result<ImageSource, IngestError> {
    let bytes = fs::read(path)?;
    let decoded =
        codec::decode_bytes(&bytes).map_err(|_| IngestError::NotAnImage(path.to_path_buf()))?;
    let mime = decoded
        .mime
        .ok_or_else(|| IngestError::NotAnImage(path.to_path_buf()))?;
    Ok(codec::encode_data_url(&mime, &bytes))
}

#[derive(Debug, Default)]
pub struct Ingested {
    pub images: Vec<ImageSource>,
    pub skipped: Vec<PathBuf>,
}

/// Ingests every path concurrently. Anything that is not a readable image is
/// skipped, keeping the order of the rest.
pub async fn ingest_files(paths: Vec<PathBuf>) -> Ingested {
    let results = batch::fan_out(
        paths.clone(),
        |path| ingest_file(&path),
        |path| Err(IngestError::NotAnImage(path.clone())),
    )
    .await;

    let mut ingested = Ingested::default();
    for (path, result) in paths.into_iter().zip(results) {
        match result {
            Ok(image) => ingested.images.push(image),
            Err(e) => {
                log::debug!("Skipping {}: {}", path.display(), e);
                ingested.skipped.push(path);
            }
        }
    }
    ingested
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdk_pixbuf::{Colorspace, Pixbuf};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "wheelhouse-ingest-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path) {
        let pixbuf = Pixbuf::new(Colorspace::Rgb, true, 8, 4, 4).unwrap();
        pixbuf.fill(0xff8800ff);
        pixbuf.savev(path, "png", &[]).unwrap();
    }

    #[test]
    fn embeds_images_as_data_urls() {
        let dir = temp_dir("single");
        let path = dir.join("a.png");
        write_png(&path);
        let source = ingest_file(&path).unwrap();
        assert!(source.starts_with("data:image/png;base64,"));
        assert!(codec::load_pixbuf(&source).is_ok());
    }

    #[tokio::test]
    async fn skips_non_images_silently() {
        let dir = temp_dir("batch");
        let first = dir.join("first.png");
        let text = dir.join("notes.txt");
        let second = dir.join("second.png");
        write_png(&first);
        std::fs::write(&text, "not an image").unwrap();
        write_png(&second);

        let ingested =
            ingest_files(vec![first, text.clone(), dir.join("missing.png"), second]).await;
        assert_eq!(ingested.images.len(), 2);
        assert_eq!(ingested.skipped, vec![text, dir.join("missing.png")]);
    }
}
