use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, info, warn};
use md5::{Digest, Md5};

use crate::data::dataset::{train_test_split, Dataset};
use crate::data::idx::parse_idx_pair;
use crate::data::DatasetProvider;
use crate::error::DataError;

/// Mirror of the original MNIST distribution (yann.lecun.com is unreliable).
const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

/// An IDX file name and the MD5 digest of its `.gz` download.
type MnistFile = (&'static str, &'static str);

/// (images, labels) file pairs, in the order they are concatenated.
const MNIST_PARTS: [(MnistFile, MnistFile); 2] = [
    (
        ("train-images-idx3-ubyte", "f68b3c2dcbeaaa9fbdd348bbdeb94873"),
        ("train-labels-idx1-ubyte", "d53e105ee54ea40749a09fcbcd1e9432"),
    ),
    (
        ("t10k-images-idx3-ubyte", "9fb629c4189551a2d022fa330f9573f3"),
        ("t10k-labels-idx1-ubyte", "ec29112dd5afa0611ce80d1b7f02629c"),
    ),
];

/// Loads the 70 000 handwritten digits (28x28 pixels, 784 features) from a
/// local cache, downloading missing files when allowed.
///
/// Each IDX file is accepted either raw or gzip-compressed (`.gz`). The
/// 60 000 "train" and 10 000 "t10k" samples are concatenated in that order
/// before any split is made, so the held-out set is drawn from all 70 000.
///
/// Downloads are checked against known MD5 digests. A cached `.gz` that no
/// longer decodes or parses is deleted and fetched again when downloads are
/// enabled; otherwise the error names the offending file.
#[derive(Debug, Clone)]
pub struct MnistProvider {
    data_dir: PathBuf,
    download: bool,
    base_url: String,
}

impl MnistProvider {
    pub fn new(data_dir: impl Into<PathBuf>, download: bool) -> MnistProvider {
        MnistProvider {
            data_dir: data_dir.into(),
            download,
            base_url: MNIST_BASE_URL.to_string(),
        }
    }

    /// Fetches from `base_url` (ending in `/`) instead of the default mirror.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> MnistProvider {
        self.base_url = base_url.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Every sample, normalized, before splitting.
    pub fn load_all(&self) -> Result<Dataset, DataError> {
        let mut full: Option<Dataset> = None;
        for (images, labels) in MNIST_PARTS {
            let part = self.load_part(images, labels)?;
            debug!("parsed {} samples from {}", part.len(), images.0);
            full = Some(match full {
                Some(acc) => acc.concat(part)?,
                None => part,
            });
        }
        // MNIST_PARTS is non-empty.
        full.ok_or_else(|| DataError::Format("no MNIST parts configured".into()))
    }

    fn load_part(&self, images: MnistFile, labels: MnistFile) -> Result<Dataset, DataError> {
        let (image_bytes, images_cached) = self.load_file(images)?;
        let (label_bytes, labels_cached) = self.load_file(labels)?;

        let parsed = match parse_idx_pair(&image_bytes, &label_bytes) {
            Err(err) if self.download && (images_cached || labels_cached) => {
                warn!("cached {} / {} did not parse ({}); fetching them again", images.0, labels.0, err);
                let image_bytes = if images_cached { self.fetch(images)? } else { image_bytes };
                let label_bytes = if labels_cached { self.fetch(labels)? } else { label_bytes };
                parse_idx_pair(&image_bytes, &label_bytes)
            }
            parsed => parsed,
        };
        parsed.map_err(|err| match err {
            DataError::Format(msg) => DataError::Format(format!(
                "{} / {} in {}: {}",
                images.0,
                labels.0,
                self.data_dir.display(),
                msg
            )),
            other => other,
        })
    }

    /// Reads `file` (raw preferred over `.gz`), downloading the `.gz` when
    /// neither exists or the cached one is corrupt. The flag is true when the
    /// bytes came from a previously cached `.gz`.
    fn load_file(&self, file: MnistFile) -> Result<(Vec<u8>, bool), DataError> {
        let raw_path = self.data_dir.join(file.0);
        if raw_path.exists() {
            return Ok((read_idx_file(&raw_path)?, false));
        }

        let gz_path = self.gz_path(file.0);
        if gz_path.exists() {
            match read_idx_file(&gz_path) {
                Ok(bytes) => return Ok((bytes, true)),
                Err(err @ DataError::Corrupt { .. }) if self.download => {
                    warn!("{}; fetching it again", err);
                }
                Err(err) => return Err(err),
            }
        } else if !self.download {
            return Err(DataError::FileNotFound(raw_path));
        }

        Ok((self.fetch(file)?, false))
    }

    /// Replaces any cached `.gz` of `file` with a fresh, verified download.
    fn fetch(&self, file: MnistFile) -> Result<Vec<u8>, DataError> {
        let gz_path = self.gz_path(file.0);
        match std::fs::remove_file(&gz_path) {
            Ok(()) => debug!("removed {}", gz_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        std::fs::create_dir_all(&self.data_dir)?;
        download_file(&format!("{}{}.gz", self.base_url, file.0), &gz_path, Some(file.1))?;
        read_idx_file(&gz_path)
    }

    fn gz_path(&self, base_name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.gz", base_name))
    }
}

impl Default for MnistProvider {
    /// `<user cache dir>/ferrite-mlp/mnist`, downloads enabled.
    fn default() -> Self {
        MnistProvider::new(default_data_dir(), true)
    }
}

impl DatasetProvider for MnistProvider {
    fn load_split(&self, test_size: usize, seed: u64) -> Result<(Dataset, Dataset), DataError> {
        let full = self.load_all()?;
        info!("loaded {} samples with {} features from {}", full.len(), full.n_features(), self.data_dir.display());
        let (train, test) = train_test_split(&full, test_size, seed)?;
        info!("split into {} train / {} test samples (seed {})", train.len(), test.len(), seed);
        Ok((train, test))
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ferrite-mlp")
        .join("mnist")
}

fn read_idx_file(path: &Path) -> Result<Vec<u8>, DataError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataError::FileNotFound(path.to_path_buf()),
        _ => DataError::Io(e),
    })?;
    let mut reader: Box<dyn Read> = if path.extension().map_or(false, |ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| DataError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(bytes)
}

fn compute_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn check_md5(url: &str, data: &[u8], expected: &str) -> Result<(), DataError> {
    let actual = compute_md5(data);
    if actual != expected {
        return Err(DataError::Download(format!(
            "checksum mismatch for {}: expected md5 {}, got {}",
            url, expected, actual
        )));
    }
    Ok(())
}

/// Downloads `url` next to `dest_path` and renames it into place once the
/// body is complete and, if `expected_md5` is given, verified.
fn download_file(url: &str, dest_path: &Path, expected_md5: Option<&str>) -> Result<(), DataError> {
    info!("downloading {}", url);

    let response = ureq::get(url)
        .call()
        .map_err(|e| DataError::Download(format!("{}: {}", url, e)))?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| DataError::Download(format!("reading body of {}: {}", url, e)))?;

    if let Some(expected) = expected_md5 {
        check_md5(url, &bytes, expected)?;
    }

    let mut partial = dest_path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);
    std::fs::write(&partial, &bytes)?;
    std::fs::rename(&partial, dest_path)?;
    info!("saved {} bytes to {}", bytes.len(), dest_path.display());
    Ok(())
}
