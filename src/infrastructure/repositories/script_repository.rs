use crate::domain::tts::{AudioBlob, SpeechDocument};
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ScriptRepositoryError {
    #[error("no script for {team} on {date}")]
    ScriptNotFound { team: String, date: NaiveDate },
    #[error("file system error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Daily scripts and produced audio on the local file system, laid out as `<dir>/<TEAM>/<date>.<ext>`.
pub struct ScriptRepository {
    scripts_dir: PathBuf,
    audio_dir: PathBuf,
}

impl ScriptRepository {
    pub fn new(scripts_dir: impl Into<PathBuf>, audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            audio_dir: audio_dir.into(),
        }
    }

    /// Markup (`.ssml`) wins over plain text (`.txt`) when both exist.
    pub async fn load_script(
        &self,
        team: &str,
        date: NaiveDate,
    ) -> Result<SpeechDocument, ScriptRepositoryError> {
        let team_dir = self.scripts_dir.join(team);

        for (extension, is_ssml) in [("ssml", true), ("txt", false)] {
            let path = team_dir.join(format!("{}.{}", date.format("%Y-%m-%d"), extension));
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    tracing::debug!(team, path = %path.display(), is_ssml, "Loaded script");
                    return Ok(SpeechDocument::new(content, is_ssml));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => return Err(ScriptRepositoryError::Io { path, source }),
            }
        }

        Err(ScriptRepositoryError::ScriptNotFound {
            team: team.to_string(),
            date,
        })
    }

    pub async fn save_audio(
        &self,
        team: &str,
        date: NaiveDate,
        audio: &AudioBlob,
    ) -> Result<PathBuf, ScriptRepositoryError> {
        let team_dir = self.audio_dir.join(team);
        tokio::fs::create_dir_all(&team_dir)
            .await
            .map_err(|source| io_error(&team_dir, source))?;

        let path = team_dir.join(format!(
            "{}.{}",
            date.format("%Y-%m-%d"),
            audio.encoding.file_extension()
        ));
        tokio::fs::write(&path, &audio.bytes)
            .await
            .map_err(|source| io_error(&path, source))?;

        tracing::info!(team, path = %path.display(), size_bytes = audio.len(), "Saved audio");
        Ok(path)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ScriptRepositoryError {
    ScriptRepositoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}
