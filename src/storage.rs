use crate::error::SchedError;
use crate::model::Registry;
use anyhow::{anyhow, Context};
use fd_lock::RwLock;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

pub trait Storage: Send + Sync {
    /// Charge le registre depuis un support.
    fn load(&self) -> anyhow::Result<Registry>;
    /// Sauvegarde de manière atomique.
    fn save(&self, registry: &Registry) -> anyhow::Result<()>;
    /// Charge, applique `op` puis sauvegarde, sous un verrou exclusif partagé
    /// par tous les accès au même support. Rien n'est écrit si `op` échoue.
    fn transaction<T, F>(&self, op: F) -> Result<T, SchedError>
    where
        F: FnOnce(&mut Registry) -> Result<T, SchedError>,
        Self: Sized;
}

pub struct JsonStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonStorage {
    /// Le verrou inter-processus est un fichier voisin `<nom>.lock`.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut lock_name = path
            .file_name()
            .with_context(|| format!("data path has no file name: {}", path.display()))?
            .to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    /// Un fichier absent donne un registre vide ; un fichier illisible est une erreur.
    fn load(&self) -> anyhow::Result<Registry> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Registry::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        let registry: Registry = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        registry
            .validate()
            .with_context(|| format!("validating {}", self.path.display()))?;
        Ok(registry)
    }

    fn save(&self, registry: &Registry) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(registry)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }

    fn transaction<T, F>(&self, op: F) -> Result<T, SchedError>
    where
        F: FnOnce(&mut Registry) -> Result<T, SchedError>,
    {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .with_context(|| format!("opening {}", self.lock_path.display()))?;
        let mut lock = RwLock::new(file);
        let _guard = lock
            .write()
            .with_context(|| format!("locking {}", self.lock_path.display()))?;

        let mut registry = self.load()?;
        let out = op(&mut registry)?;
        self.save(&registry)?;
        Ok(out)
    }
}

/// Stockage en mémoire (tests, usage embarqué).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    registry: Mutex<Registry>,
}

impl MemoryStorage {
    pub fn new(registry: Registry) -> Self {
        Self { registry: Mutex::new(registry) }
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> anyhow::Result<Registry> {
        let guard = self.registry.lock().map_err(|_| anyhow!("memory storage poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, registry: &Registry) -> anyhow::Result<()> {
        let mut guard = self.registry.lock().map_err(|_| anyhow!("memory storage poisoned"))?;
        *guard = registry.clone();
        Ok(())
    }

    fn transaction<T, F>(&self, op: F) -> Result<T, SchedError>
    where
        F: FnOnce(&mut Registry) -> Result<T, SchedError>,
    {
        let mut guard = self.registry.lock().map_err(|_| anyhow!("memory storage poisoned"))?;
        let mut draft = guard.clone();
        let out = op(&mut draft)?;
        *guard = draft;
        Ok(out)
    }
}
