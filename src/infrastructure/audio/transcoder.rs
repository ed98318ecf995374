use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Turns the merged WAV into the deliverable format
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Transcode a complete WAV buffer, returning the encoded file
    async fn transcode(&self, wav: Vec<u8>) -> Result<Vec<u8>, String>;
}

/// MP3 encoding through an `ffmpeg` child process, piping stdin to stdout
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String) -> Self {
        Self { ffmpeg_path }
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode(&self, wav: Vec<u8>) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();
        let input_size = wav.len();

        let mut child = Command::new(&self.ffmpeg_path)
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                "wav",
                "-i",
                "pipe:0",
                "-f",
                "mp3",
                "pipe:1",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to start {}: {}", self.ffmpeg_path, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| "ffmpeg stdin unavailable".to_string())?;
        // Feed stdin concurrently so a full stdout pipe cannot deadlock the child
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&wav).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| format!("ffmpeg did not complete: {}", e))?;
        let written = writer
            .await
            .map_err(|e| format!("ffmpeg input task failed: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                status = %output.status,
                stderr = %stderr.trim(),
                "ffmpeg transcoding failed"
            );
            return Err(format!("ffmpeg exited with {}: {}", output.status, stderr.trim()));
        }
        written.map_err(|e| format!("failed to write audio to ffmpeg: {}", e))?;

        tracing::info!(
            input_size_bytes = input_size,
            output_size_bytes = output.stdout.len(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "Audio transcoded"
        );
        Ok(output.stdout)
    }
}
