//! On-disk service store.
//!
//! Layout under the data directory:
//! - `services/N.txt`: one descriptor file per service, `N` the first
//!   free number when the service was created
//! - `service_index.json`: service name to descriptor file name
//!
//! The index is a cache of what the descriptor files say. When it cannot
//! be read or does not cover every descriptor file, it is rebuilt by
//! parsing them all. A descriptor is replaced through a temporary file and
//! a rename, with the previous version kept as `N.txt~` until the index
//! agrees with it.
//!
//! Recently loaded descriptors are kept in a small least-recently-used
//! cache.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hashish_crypto_core::descriptor::ServiceDescriptor;
use hashish_crypto_core::registry::AlgorithmRegistry;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::VaultError;
use crate::settings::{write_atomic, Settings};

/// Directory holding descriptor files.
pub const SERVICES_DIR: &str = "services";

/// Service index file name.
pub const INDEX_FILE: &str = "service_index.json";

/// Number of descriptors kept in memory.
pub const CACHE_SIZE: usize = 10;

// ── Index ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ServiceIndex {
    /// Service name to descriptor file name.
    #[serde(default)]
    services: BTreeMap<String, String>,
}

#[derive(Debug)]
struct CacheEntry {
    file_name: String,
    descriptor: ServiceDescriptor,
    last_used: u64,
}

// ── Store ──────────────────────────────────────────────────────────

/// Services persisted in a data directory.
#[derive(Debug)]
pub struct ServiceStore {
    data_dir: PathBuf,
    services_dir: PathBuf,
    registry: AlgorithmRegistry,
    index: ServiceIndex,
    cache: Vec<CacheEntry>,
    clock: u64,
}

impl ServiceStore {
    /// Open the store in `data_dir`, creating its directories as needed.
    ///
    /// Leftover `~` backups from an interrupted save are resolved first: a
    /// backup replaces a missing or unparsable descriptor and is deleted
    /// otherwise. Index entries whose descriptor file is gone are dropped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directories cannot be created or
    /// listed, a backup cannot be resolved, or a rebuilt index cannot be
    /// written.
    pub fn open(data_dir: &Path, registry: AlgorithmRegistry) -> Result<Self, VaultError> {
        let services_dir = data_dir.join(SERVICES_DIR);
        fs::create_dir_all(&services_dir)?;

        let mut store = Self {
            data_dir: data_dir.to_path_buf(),
            services_dir,
            registry,
            index: ServiceIndex::default(),
            cache: Vec::with_capacity(CACHE_SIZE),
            clock: 0,
        };

        let recovered = store.recover_backups()?;
        let file_names = store.descriptor_files()?;
        let index = if recovered { None } else { store.read_index() };
        match index {
            Some(index) if file_names.iter().all(|f| index.services.values().any(|v| v == f)) => {
                store.index = index;
            }
            _ => {
                let index = store.rebuild_index(file_names);
                store.write_index(&index)?;
                store.index = index;
            }
        }

        let services_dir = &store.services_dir;
        store.index.services.retain(|name, file_name| {
            let exists = services_dir.join(file_name.as_str()).is_file();
            if !exists {
                tracing::warn!(service = %name, file = %file_name, "descriptor file missing, dropping service");
            }
            exists
        });

        tracing::debug!(services = store.index.services.len(), "service store opened");
        Ok(store)
    }

    /// Algorithms this store resolves descriptor names with.
    #[must_use]
    pub const fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Every service name, sorted case-insensitively.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index.services.keys().cloned().collect();
        names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
        names
    }

    /// `true` if a service is stored under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.services.contains_key(name)
    }

    /// A fresh, unsaved descriptor using the configured iteration count.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidServiceName` or
    /// `VaultError::ServiceExists`.
    pub fn new_service(&self, name: &str, settings: &Settings) -> Result<ServiceDescriptor, VaultError> {
        validate_name(name)?;
        if self.contains(name) {
            return Err(VaultError::ServiceExists(name.to_owned()));
        }
        Ok(ServiceDescriptor::new(name, settings.default_iterations, &self.registry))
    }

    /// Load a service's descriptor.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::UnknownService` for an unknown name, and
    /// propagates read and parse failures.
    pub fn load(&mut self, name: &str) -> Result<ServiceDescriptor, VaultError> {
        let file_name = self.file_name(name)?.to_owned();
        let now = self.tick();
        if let Some(entry) = self.cache.iter_mut().find(|e| e.file_name == file_name) {
            entry.last_used = now;
            return Ok(entry.descriptor.clone());
        }

        let text = fs::read_to_string(self.services_dir.join(&file_name))?;
        let descriptor = ServiceDescriptor::parse(&text, &self.registry)?;
        self.cache_put(file_name, descriptor.clone());
        Ok(descriptor)
    }

    /// Save a descriptor, creating, renaming or overwriting as needed.
    ///
    /// `former_name` is the name the service was stored under, or `None`
    /// for a new service.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidServiceName`, `VaultError::ServiceExists`
    /// if the new name belongs to another service, `VaultError::NoFreeFileName`,
    /// and propagates write failures. On failure neither the store nor the
    /// disk changes: the previous descriptor is put back if the index
    /// cannot be written.
    pub fn save(&mut self, former_name: Option<&str>, descriptor: &ServiceDescriptor) -> Result<(), VaultError> {
        let name = descriptor.service_name.as_str();
        validate_name(name)?;

        let existing = former_name.and_then(|former| {
            self.index
                .services
                .get(former)
                .map(|file_name| (former, file_name.clone()))
        });
        let renamed_onto_other = match existing {
            Some((former, _)) => former != name && self.contains(name),
            None => self.contains(name),
        };
        if renamed_onto_other {
            return Err(VaultError::ServiceExists(name.to_owned()));
        }

        let file_name = match &existing {
            Some((_, file_name)) => file_name.clone(),
            None => self.find_new_file_name()?,
        };
        let mut index = self.index.clone();
        if let Some((former, _)) = existing {
            index.services.remove(former);
        }
        index.services.insert(name.to_owned(), file_name.clone());

        let pending = PendingWrite::start(&self.services_dir, &file_name, &descriptor.to_text())?;
        if let Err(e) = self.write_index(&index) {
            pending.roll_back();
            return Err(e);
        }
        pending.commit();

        self.index = index;
        self.cache_put(file_name, descriptor.clone());
        tracing::debug!(service = %name, "service saved");
        Ok(())
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::UnknownService` for an unknown name, and
    /// propagates I/O failures.
    pub fn remove(&mut self, name: &str) -> Result<(), VaultError> {
        let file_name = self.file_name(name)?.to_owned();
        match fs::remove_file(self.services_dir.join(&file_name)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        // The file is gone; a stale index entry is dropped on the next open.
        self.index.services.remove(name);
        self.cache.retain(|entry| entry.file_name != file_name);
        self.write_index(&self.index)?;
        tracing::debug!(service = %name, "service removed");
        Ok(())
    }

    /// Compute a service's password.
    ///
    /// When the search settles on a new constraint counter the descriptor
    /// is saved again, so later derivations skip the search.
    ///
    /// # Errors
    ///
    /// Propagates load, derivation and save failures.
    pub fn compute_password(&mut self, name: &str, master_password: &str) -> Result<Zeroizing<String>, VaultError> {
        let mut descriptor = self.load(name)?;
        let counter = descriptor.cached_data().constraint_counter;
        let password = descriptor.compute_password(master_password)?;
        if descriptor.cached_data().constraint_counter != counter {
            self.save(Some(name), &descriptor)?;
        }
        Ok(password)
    }

    // ── Internals ──────────────────────────────────────────────────

    fn file_name(&self, name: &str) -> Result<&str, VaultError> {
        self.index
            .services
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| unknown_service(name))
    }

    fn tick(&mut self) -> u64 {
        self.clock = self.clock.wrapping_add(1);
        self.clock
    }

    fn cache_put(&mut self, file_name: String, descriptor: ServiceDescriptor) {
        let last_used = self.tick();
        if let Some(entry) = self.cache.iter_mut().find(|e| e.file_name == file_name) {
            entry.descriptor = descriptor;
            entry.last_used = last_used;
            return;
        }
        let entry = CacheEntry {
            file_name,
            descriptor,
            last_used,
        };
        if self.cache.len() < CACHE_SIZE {
            self.cache.push(entry);
        } else if let Some(oldest) = self.cache.iter_mut().min_by_key(|e| e.last_used) {
            *oldest = entry;
        }
    }

    fn find_new_file_name(&self) -> Result<String, VaultError> {
        (1..u64::MAX)
            .map(|n| format!("{n}.txt"))
            .find(|candidate| {
                !self.services_dir.join(candidate).exists()
                    && !self.index.services.values().any(|used| used == candidate)
            })
            .ok_or(VaultError::NoFreeFileName)
    }

    fn read_index(&self) -> Option<ServiceIndex> {
        let contents = fs::read_to_string(self.data_dir.join(INDEX_FILE)).ok()?;
        match serde_json::from_str(&contents) {
            Ok(index) => Some(index),
            Err(e) => {
                tracing::warn!(error = %e, "corrupt service index, rebuilding");
                None
            }
        }
    }

    fn write_index(&self, index: &ServiceIndex) -> Result<(), VaultError> {
        let json = serde_json::to_string_pretty(index)?;
        write_atomic(&self.data_dir, INDEX_FILE, &json)?;
        Ok(())
    }

    /// Names of the regular files in the services directory, sorted,
    /// without dot-files.
    fn directory_files(&self) -> Result<Vec<String>, VaultError> {
        let mut file_names: Vec<String> = fs::read_dir(&self.services_dir)?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect();
        file_names.sort();
        Ok(file_names)
    }

    fn descriptor_files(&self) -> Result<Vec<String>, VaultError> {
        let mut file_names = self.directory_files()?;
        file_names.retain(|name| !name.ends_with('~'));
        Ok(file_names)
    }

    fn parse_file(&self, file_name: &str) -> Result<ServiceDescriptor, VaultError> {
        let text = fs::read_to_string(self.services_dir.join(file_name))?;
        Ok(ServiceDescriptor::parse(&text, &self.registry)?)
    }

    /// Resolve `N.txt~` files left by an interrupted save. Returns `true`
    /// if there were any.
    fn recover_backups(&self) -> Result<bool, VaultError> {
        let mut recovered = false;
        for backup in self.directory_files()? {
            let Some(file_name) = backup.strip_suffix('~') else {
                continue;
            };
            recovered = true;
            let backup_path = self.services_dir.join(&backup);
            if self.parse_file(file_name).is_ok() {
                tracing::warn!(file = %file_name, "discarding stale descriptor backup");
                fs::remove_file(&backup_path)?;
            } else {
                tracing::warn!(file = %file_name, "restoring descriptor from backup");
                fs::rename(&backup_path, self.services_dir.join(file_name))?;
            }
        }
        Ok(recovered)
    }

    /// Index every parsable descriptor among `file_names`.
    fn rebuild_index(&self, file_names: Vec<String>) -> ServiceIndex {
        let mut index = ServiceIndex::default();
        for file_name in file_names {
            match self.parse_file(&file_name) {
                Ok(descriptor) => {
                    index
                        .services
                        .entry(descriptor.service_name)
                        .or_insert(file_name);
                }
                Err(e) => tracing::warn!(file = %file_name, error = %e, "skipping unreadable descriptor"),
            }
        }
        tracing::info!(services = index.services.len(), "service index rebuilt");
        index
    }
}

fn unknown_service(name: &str) -> VaultError {
    tracing::warn!(service = %name, "unknown service name");
    VaultError::UnknownService(name.to_owned())
}

fn validate_name(name: &str) -> Result<(), VaultError> {
    if name.is_empty() || name.contains(['\n', '\r']) {
        return Err(VaultError::InvalidServiceName(name.to_owned()));
    }
    Ok(())
}

/// A descriptor replacement that can still be undone.
///
/// The previous file, if any, is kept as `N.txt~` until [`commit`] or
/// [`roll_back`].
///
/// [`commit`]: PendingWrite::commit
/// [`roll_back`]: PendingWrite::roll_back
struct PendingWrite {
    path: PathBuf,
    backup: Option<PathBuf>,
}

impl PendingWrite {
    /// Replace `{dir}/{file_name}` atomically. A failed write is rolled
    /// back before returning.
    fn start(dir: &Path, file_name: &str, contents: &str) -> io::Result<Self> {
        let path = dir.join(file_name);
        let backup = if path.exists() {
            let backup = dir.join(format!("{file_name}~"));
            fs::copy(&path, &backup)?;
            Some(backup)
        } else {
            None
        };
        let pending = Self { path, backup };
        if let Err(e) = write_atomic(dir, file_name, contents) {
            pending.roll_back();
            return Err(e);
        }
        Ok(pending)
    }

    /// Keep the new file.
    fn commit(self) {
        if let Some(backup) = &self.backup {
            if let Err(e) = fs::remove_file(backup) {
                tracing::warn!(path = %backup.display(), error = %e, "could not remove descriptor backup");
            }
        }
    }

    /// Put the previous file back, or remove a file that did not exist.
    fn roll_back(self) {
        let restored = match &self.backup {
            Some(backup) => fs::rename(backup, &self.path),
            None => match fs::remove_file(&self.path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(e) = restored {
            tracing::error!(path = %self.path.display(), error = %e, "could not roll back descriptor write");
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
