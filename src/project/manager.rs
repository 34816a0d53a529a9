// Disk manager for loading and saving pattern disks

use crate::project::serialization::*;
use crate::project::types::*;
use crate::project::validate_config;
use crate::sequencer::pattern::Pattern;
use std::path::{Path, PathBuf};

/// Project error types
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("File system error: {0}")]
    FileSystemError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid disk structure: {0}")]
    InvalidStructure(String),

    #[error("Disk validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A disk directory: config, pattern grids and samples
#[derive(Debug, Clone)]
pub struct Disk {
    root: PathBuf,
}

impl Disk {
    pub const CONFIG_FILE: &'static str = "config.json";
    pub const PATTERNS_FILE: &'static str = "patterns.ron";
    pub const SAMPLE_DIR: &'static str = "samples";

    /// Create a fresh disk at `root` and write the default project to it
    pub fn create<P: AsRef<Path>>(root: P) -> Result<(Self, Project), ProjectError> {
        let disk = Self {
            root: root.as_ref().to_path_buf(),
        };

        if disk.config_path().exists() {
            return Err(ProjectError::FileSystemError(format!(
                "A disk already exists at {}",
                disk.root.display()
            )));
        }

        std::fs::create_dir_all(disk.sample_dir()).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to create disk directory: {}", e))
        })?;

        let mut project = Project::default();
        disk.save(&mut project)?;
        log::info!("Created disk at {}", disk.root.display());
        Ok((disk, project))
    }

    /// Open an existing disk directory
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, ProjectError> {
        let disk = Self {
            root: root.as_ref().to_path_buf(),
        };

        if !disk.config_path().is_file() {
            return Err(ProjectError::FileSystemError(format!(
                "No {} in {}",
                Self::CONFIG_FILE,
                disk.root.display()
            )));
        }
        Ok(disk)
    }

    /// Open the disk at `root`, creating it if it does not exist yet
    pub fn open_or_create<P: AsRef<Path>>(root: P) -> Result<(Self, Project), ProjectError> {
        match Self::open(&root) {
            Ok(disk) => {
                let project = disk.load()?;
                Ok((disk, project))
            }
            Err(_) => Self::create(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(Self::CONFIG_FILE)
    }

    pub fn patterns_path(&self) -> PathBuf {
        self.root.join(Self::PATTERNS_FILE)
    }

    pub fn sample_dir(&self) -> PathBuf {
        self.root.join(Self::SAMPLE_DIR)
    }

    /// Load and validate the whole disk
    pub fn load(&self) -> Result<Project, ProjectError> {
        let config = self.load_config()?;
        validate_config(&config)?;

        let mut grids = self.load_patterns()?;
        if grids.is_empty() {
            grids.resize(config.patterns.len(), None);
        }
        let project = project_from_config(config, grids)?;

        log::info!(
            "Loaded disk {} ({} patterns in use)",
            self.root.display(),
            project.bank.slots().iter().flatten().count()
        );
        Ok(project)
    }

    /// Validate and write the whole disk, stamping `saved_at`
    pub fn save(&self, project: &mut Project) -> Result<(), ProjectError> {
        project.saved_at = Some(chrono::Utc::now().to_rfc3339());

        let (config, slots) = project_to_config(project);
        validate_config(&config)?;

        self.save_patterns(slots)?;
        self.save_config(&config)?;
        log::debug!("Saved disk {}", self.root.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<DiskConfig, ProjectError> {
        let json = std::fs::read_to_string(self.config_path()).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to read {}: {}", Self::CONFIG_FILE, e))
        })?;
        deserialize_config_from_json(&json)
    }

    pub fn save_config(&self, config: &DiskConfig) -> Result<(), ProjectError> {
        let json = serialize_config_to_json(config)?;
        std::fs::write(self.config_path(), json).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to write {}: {}", Self::CONFIG_FILE, e))
        })
    }

    /// Pattern grids; a missing file means every slot is unused
    pub fn load_patterns(&self) -> Result<Vec<Option<Pattern>>, ProjectError> {
        let path = self.patterns_path();
        if !path.exists() {
            log::warn!("{} missing, starting with empty patterns", Self::PATTERNS_FILE);
            return Ok(Vec::new());
        }

        let ron_data = std::fs::read_to_string(&path)?;
        deserialize_grids_from_ron(&ron_data)
    }

    pub fn save_patterns(&self, slots: &[Option<Pattern>]) -> Result<(), ProjectError> {
        let ron_data = serialize_grids_to_ron(slots)?;
        std::fs::write(self.patterns_path(), ron_data).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to write {}: {}", Self::PATTERNS_FILE, e))
        })
    }
}
