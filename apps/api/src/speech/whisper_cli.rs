//! whisper.cpp backend driven through its command-line binary.
//!
//! The model file and binary are checked once in `load`; each transcription spawns
//! the binary against the per-call temp file. The binary must be installed on the host.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{SpeechError, SpeechModel};

pub const DEFAULT_BINARY: &str = "whisper-cli";
pub const DEFAULT_THREADS: u32 = 4;
/// Beam width passed as `-bs`.
const BEAM_SIZE: u32 = 5;

#[derive(Debug, Clone)]
pub struct WhisperCliSettings {
    pub binary: PathBuf,
    pub model_path: PathBuf,
    pub threads: u32,
}

pub struct WhisperCliModel {
    settings: WhisperCliSettings,
}

impl WhisperCliModel {
    /// Validates the model file and checks that the binary runs.
    ///
    /// Blocking; call once at startup, never per request.
    pub fn load(settings: WhisperCliSettings) -> Result<Self, SpeechError> {
        let metadata = std::fs::metadata(&settings.model_path).map_err(|e| {
            SpeechError::ModelLoad(format!(
                "cannot read model file {}: {e}",
                settings.model_path.display()
            ))
        })?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(SpeechError::ModelLoad(format!(
                "model path {} is not a non-empty file",
                settings.model_path.display()
            )));
        }

        let status = std::process::Command::new(&settings.binary)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                SpeechError::ModelLoad(format!(
                    "cannot run {}: {e}",
                    settings.binary.display()
                ))
            })?;
        debug!("Speech binary check exited with {status}");

        info!(
            "Speech model ready: {} ({} MB, {} threads)",
            settings.model_path.display(),
            metadata.len() / (1024 * 1024),
            settings.threads
        );
        Ok(Self { settings })
    }
}

#[async_trait]
impl SpeechModel for WhisperCliModel {
    async fn transcribe_file(
        &self,
        path: &Path,
        language: &str,
    ) -> Result<Vec<String>, SpeechError> {
        let output = Command::new(&self.settings.binary)
            .arg("-m")
            .arg(&self.settings.model_path)
            .arg("-f")
            .arg(path)
            .args(["-l", language])
            .arg("-t")
            .arg(self.settings.threads.to_string())
            .arg("-bs")
            .arg(BEAM_SIZE.to_string())
            // plain text, no timestamps, no progress output
            .args(["-nt", "-np"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Inference(format!(
                "{} exited with {}: {}",
                self.settings.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(parse_segments(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn unload(&self) {
        info!("Speech model released: {}", self.settings.model_path.display());
    }
}

/// One segment per non-blank output line.
fn parse_segments(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
