use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Extensions accepted by the file picker and drag-and-drop
pub const MODEL_EXTENSIONS: [&str; 2] = ["glb", "gltf"];

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("unsupported file type {0:?}, expected .glb or .gltf")]
    UnsupportedExtension(PathBuf),
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// In-memory model file. Moved into the loader and consumed once;
/// dropping it releases the bytes.
#[derive(Debug)]
pub struct ResourceHandle {
    id: HandleId,
    name: String,
    base_dir: Option<PathBuf>,
    bytes: Vec<u8>,
}

impl ResourceHandle {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: HandleId(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            base_dir: None,
            bytes,
        }
    }

    /// Directory used to resolve external buffers of a .gltf
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let path = path.as_ref();
        if !is_model_file(path) {
            return Err(IntakeError::UnsupportedExtension(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| IntakeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let handle = Self::from_bytes(name, bytes);
        Ok(match path.parent() {
            Some(dir) => handle.with_base_dir(dir),
            None => handle,
        })
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Reads a model file from disk into a handle
pub fn open_path(path: impl AsRef<Path>) -> Result<ResourceHandle, IntakeError> {
    ResourceHandle::open(path)
}

pub fn is_model_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MODEL_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Holds the handle picked by the user until the next frame.
///
/// Selecting a file drops whatever handle was staged before and clears the
/// current one; the new handle is only handed out by the following `tick`,
/// so the frame that observes the cleared scene always comes first.
#[derive(Debug, Default)]
pub struct FileIntake {
    current: Option<(HandleId, String)>,
    staged: Option<ResourceHandle>,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, handle: ResourceHandle) {
        if let Some(old) = self.staged.take() {
            log::debug!("Releasing staged handle {} ({})", old.id(), old.name());
        }
        if let Some((id, name)) = self.current.take() {
            log::debug!("Discarding current handle {} ({})", id, name);
        }
        log::info!("Selected {} ({} bytes)", handle.name(), handle.len());
        self.staged = Some(handle);
    }

    /// Installs the handle staged in an earlier frame and returns it for loading
    pub fn tick(&mut self) -> Option<ResourceHandle> {
        let handle = self.staged.take()?;
        if handle.is_empty() {
            log::warn!("Ignoring empty file {}", handle.name());
            return None;
        }
        self.current = Some((handle.id(), handle.name().to_string()));
        Some(handle)
    }

    pub fn current(&self) -> Option<HandleId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, name)| name.as_str())
    }

    pub fn has_staged(&self) -> bool {
        self.staged.is_some()
    }
}
