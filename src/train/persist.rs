use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::error::PersistError;

/// File name the trained classifier is saved under.
pub const MODEL_FILE: &str = "mlp-mnist.json";

/// Durable storage for a trained model.
pub trait ModelPersister<M: ?Sized> {
    fn save(&mut self, model: &M, destination: &str) -> Result<(), PersistError>;
}

/// Writes models as pretty-printed JSON files inside a directory.
#[derive(Debug, Clone)]
pub struct JsonPersister {
    dir: PathBuf,
}

impl JsonPersister {
    pub fn new(dir: impl Into<PathBuf>) -> JsonPersister {
        JsonPersister { dir: dir.into() }
    }

    pub fn path_for(&self, destination: &str) -> PathBuf {
        self.dir.join(destination)
    }
}

impl<M: Serialize + ?Sized> ModelPersister<M> for JsonPersister {
    fn save(&mut self, model: &M, destination: &str) -> Result<(), PersistError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|source| PersistError::Io { path: self.dir.clone(), source })?;
        let path = self.path_for(destination);
        let file = std::fs::File::create(&path)
            .map_err(|source| PersistError::Io { path: path.clone(), source })?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), model)?;
        info!("model saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Tiny {
        weights: Vec<f64>,
    }

    #[test]
    fn writes_json_under_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut persister = JsonPersister::new(dir.path().join("models"));
        let model = Tiny { weights: vec![0.25, -1.5] };
        persister.save(&model, MODEL_FILE).unwrap();

        let text = std::fs::read_to_string(dir.path().join("models").join(MODEL_FILE)).unwrap();
        let back: Tiny = serde_json::from_str(&text).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn unwritable_destination_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let mut persister = JsonPersister::new(&blocker);
        let err = persister.save(&Tiny { weights: vec![] }, MODEL_FILE).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }
}
