use crate::domain::learning_plan::{LearningGoals, LearningPlan};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const GOALS_FILE: &str = "learning_goals.json";
pub const PLAN_FILE: &str = "learning_plan.json";
pub const TRANSCRIPT_EXTENSION: &str = "xml";
pub const AUDIO_EXTENSION: &str = "mp3";

/// Per-run artifacts that make a run resumable.
///
/// Lessons are keyed by their file stem. Audio presence is what marks a
/// lesson complete, so implementations must never expose a partial audio file.
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    async fn load_goals(&self) -> Result<Option<LearningGoals>, String>;
    async fn save_goals(&self, goals: &LearningGoals) -> Result<(), String>;
    async fn load_plan(&self) -> Result<Option<LearningPlan>, String>;
    async fn save_plan(&self, plan: &LearningPlan) -> Result<(), String>;
    async fn load_transcript(&self, stem: &str) -> Result<Option<String>, String>;
    async fn save_transcript(&self, stem: &str, markup: &str) -> Result<(), String>;
    async fn has_audio(&self, stem: &str) -> Result<bool, String>;
    async fn save_audio(&self, stem: &str, audio: &[u8]) -> Result<(), String>;
}

/// Checkpoint directory on the local filesystem
pub struct FileCheckpointRepository {
    dir: PathBuf,
}

impl FileCheckpointRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn transcript_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, TRANSCRIPT_EXTENSION))
    }

    pub fn audio_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, AUDIO_EXTENSION))
    }

    /// Write to a `.tmp` sibling, then rename over the target
    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| format!("failed to create {}: {}", self.dir.display(), e))?;

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|e| format!("failed to write {}: {}", tmp_path.display(), e))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| format!("failed to move {} into place: {}", path.display(), e))?;

        tracing::debug!(path = %path.display(), size = contents.len(), "Checkpoint written");
        Ok(())
    }

    async fn read_optional(&self, path: &Path) -> Result<Option<Vec<u8>>, String> {
        match tokio::fs::read(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(format!("failed to read {}: {}", path.display(), e)),
        }
    }

    async fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, String> {
        let path = self.dir.join(name);
        match self.read_optional(&path).await? {
            Some(contents) => serde_json::from_slice(&contents)
                .map(Some)
                .map_err(|e| format!("failed to decode {}: {}", path.display(), e)),
            None => Ok(None),
        }
    }

    async fn save_json<T: Serialize + Sync>(&self, name: &str, value: &T) -> Result<(), String> {
        let contents = serde_json::to_vec_pretty(value)
            .map_err(|e| format!("failed to encode {}: {}", name, e))?;
        self.write_atomic(&self.dir.join(name), &contents).await
    }
}

#[async_trait]
impl CheckpointRepository for FileCheckpointRepository {
    async fn load_goals(&self) -> Result<Option<LearningGoals>, String> {
        self.load_json(GOALS_FILE).await
    }

    async fn save_goals(&self, goals: &LearningGoals) -> Result<(), String> {
        self.save_json(GOALS_FILE, goals).await
    }

    async fn load_plan(&self) -> Result<Option<LearningPlan>, String> {
        self.load_json(PLAN_FILE).await
    }

    async fn save_plan(&self, plan: &LearningPlan) -> Result<(), String> {
        self.save_json(PLAN_FILE, plan).await
    }

    async fn load_transcript(&self, stem: &str) -> Result<Option<String>, String> {
        let path = self.transcript_path(stem);
        match self.read_optional(&path).await? {
            Some(contents) => String::from_utf8(contents)
                .map(Some)
                .map_err(|e| format!("{} is not UTF-8: {}", path.display(), e)),
            None => Ok(None),
        }
    }

    async fn save_transcript(&self, stem: &str, markup: &str) -> Result<(), String> {
        self.write_atomic(&self.transcript_path(stem), markup.as_bytes())
            .await
    }

    async fn has_audio(&self, stem: &str) -> Result<bool, String> {
        let path = self.audio_path(stem);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| format!("failed to check {}: {}", path.display(), e))
    }

    async fn save_audio(&self, stem: &str, audio: &[u8]) -> Result<(), String> {
        self.write_atomic(&self.audio_path(stem), audio).await
    }
}
