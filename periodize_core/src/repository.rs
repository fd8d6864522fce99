//! Workout persistence with file locking.
//!
//! Each workout is one JSON document, `<id>.json`, in the repository
//! directory. Writers take an exclusive lock on a sidecar `.lock` file and
//! replace the document atomically, so a reader never sees a partial write.
//! `update` keeps that lock for the whole load-modify-save cycle.

use crate::{Error, Result, Workout};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Load/persist contract for the workout aggregate
pub trait WorkoutRepository {
    /// `Ok(None)` when no workout has this id
    fn load(&self, id: Uuid) -> Result<Option<Workout>>;

    /// Durably store the whole aggregate
    fn save(&self, workout: &Workout) -> Result<()>;

    /// Load, modify and save back; nothing is written if `f` fails
    ///
    /// Implementations backed by shared storage override this to hold a
    /// writer lock across the whole cycle.
    fn update<F, T>(&self, id: Uuid, f: F) -> Result<(Workout, T)>
    where
        F: FnOnce(&mut Workout) -> Result<T>,
    {
        let mut workout = self.load(id)?.ok_or_else(|| Error::NotFound {
            kind: "workout",
            id: id.to_string(),
        })?;
        let value = f(&mut workout)?;
        self.save(&workout)?;
        Ok((workout, value))
    }
}

/// JSON-file repository
pub struct FileWorkoutRepository {
    dir: PathBuf,
}

impl FileWorkoutRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn lock_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.lock", id))
    }

    fn open_lock(&self, id: Uuid) -> Result<File> {
        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(id))?;
        Ok(file)
    }

    /// Ids of all stored workouts, sorted
    pub fn list(&self) -> Result<Vec<Uuid>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                match Uuid::parse_str(stem) {
                    Ok(id) => ids.push(id),
                    Err(_) => tracing::warn!("Ignoring unexpected file {:?}", path),
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve(&self, needle: &str) -> Result<Uuid> {
        if let Ok(id) = Uuid::parse_str(needle) {
            return Ok(id);
        }
        let matches: Vec<Uuid> = self
            .list()?
            .into_iter()
            .filter(|id| id.to_string().starts_with(needle))
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(Error::NotFound {
                kind: "workout",
                id: needle.to_string(),
            }),
            _ => Err(Error::validation(format!(
                "workout id prefix {} is ambiguous",
                needle
            ))),
        }
    }
}

impl FileWorkoutRepository {
    /// Read the document; the caller holds the lock
    fn read_document(&self, id: Uuid) -> Result<Option<Workout>> {
        let path = self.document_path(id);
        if !path.exists() {
            tracing::debug!("No workout document at {:?}", path);
            return Ok(None);
        }
        let mut contents = String::new();
        std::io::BufReader::new(File::open(&path)?).read_to_string(&mut contents)?;
        let workout: Workout = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded workout {} from {:?}", id, path);
        Ok(Some(workout))
    }

    /// Write through a temp file in the same directory, then rename over;
    /// the caller holds the exclusive lock
    fn write_document(&self, workout: &Workout) -> Result<()> {
        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(workout)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        let path = self.document_path(workout.id());
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;
        tracing::info!("Saved workout {} to {:?}", workout.id(), path);
        Ok(())
    }
}

impl WorkoutRepository for FileWorkoutRepository {
    fn load(&self, id: Uuid) -> Result<Option<Workout>> {
        if !self.document_path(id).exists() {
            return Ok(None);
        }
        let lock = self.open_lock(id)?;
        lock.lock_shared()?;
        let result = self.read_document(id);
        lock.unlock()?;
        result
    }

    fn save(&self, workout: &Workout) -> Result<()> {
        let lock = self.open_lock(workout.id())?;
        lock.lock_exclusive()?;
        let result = self.write_document(workout);
        lock.unlock()?;
        result
    }

    /// Holds the exclusive lock from read to write so concurrent updates
    /// of one workout are serialized
    fn update<F, T>(&self, id: Uuid, f: F) -> Result<(Workout, T)>
    where
        F: FnOnce(&mut Workout) -> Result<T>,
    {
        if !self.document_path(id).exists() {
            return Err(Error::NotFound {
                kind: "workout",
                id: id.to_string(),
            });
        }
        let lock = self.open_lock(id)?;
        lock.lock_exclusive()?;
        let result = self.read_document(id).and_then(|loaded| {
            let mut workout = loaded.ok_or_else(|| Error::NotFound {
                kind: "workout",
                id: id.to_string(),
            })?;
            let value = f(&mut workout)?;
            self.write_document(&workout)?;
            Ok((workout, value))
        });
        lock.unlock()?;
        result
    }
}
