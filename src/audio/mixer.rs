//! Clip mixing with ffmpeg.
//!
//! Clips are joined with the concat demuxer, with a short silence clip between them.

use crate::error::{PodcastError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument};

async fn run_ffmpeg(command: &mut Command) -> Result<()> {
    let result = command
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(PodcastError::ToolFailed(format!("ffmpeg: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PodcastError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(PodcastError::Audio(format!("ffmpeg error: {e}"))),
    }
}

/// Render a mono silence clip.
#[instrument]
pub async fn generate_silence(path: &Path, seconds: f64, sample_rate: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    run_ffmpeg(
        Command::new("ffmpeg")
            .arg("-y")
            .arg("-f").arg("lavfi")
            .arg("-i").arg(format!("anullsrc=r={}:cl=mono", sample_rate))
            .arg("-t").arg(seconds.to_string())
            .arg("-q:a").arg("2")
            .arg(path),
    )
    .await?;
    info!("Silence clip generated");
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Concat demuxer input: every clip, with `silence` between clips but not after the last.
pub fn concat_list(clips: &[PathBuf], silence: Option<&Path>) -> String {
    let mut list = String::new();
    for (i, clip) in clips.iter().enumerate() {
        list.push_str(&format!("file '{}'\n", absolute(clip).display()));
        if let Some(silence) = silence {
            if i + 1 < clips.len() {
                list.push_str(&format!("file '{}'\n", absolute(silence).display()));
            }
        }
    }
    list
}

/// Write the concat list file.
pub fn write_concat_list(clips: &[PathBuf], silence: Option<&Path>, path: &Path) -> Result<()> {
    std::fs::write(path, concat_list(clips, silence))?;
    Ok(())
}

/// Join the clips in `list` into an MP3.
#[instrument]
pub async fn concat_to_mp3(list: &Path, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    run_ffmpeg(
        Command::new("ffmpeg")
            .arg("-y")
            .arg("-f").arg("concat")
            .arg("-safe").arg("0")
            .arg("-i").arg(list)
            .arg("-acodec").arg("libmp3lame")
            .arg("-q:a").arg("2")
            .arg(output),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_interleaves_silence() {
        let clips = vec![PathBuf::from("/a/line_0.wav"), PathBuf::from("/a/line_3.wav")];
        let list = concat_list(&clips, Some(Path::new("/a/silence.wav")));
        assert_eq!(
            list,
            "file '/a/line_0.wav'\nfile '/a/silence.wav'\nfile '/a/line_3.wav'\n"
        );
    }

    #[test]
    fn test_concat_list_without_silence() {
        let clips = vec![PathBuf::from("/a/1.wav"), PathBuf::from("/a/2.wav")];
        let list = concat_list(&clips, None);
        assert_eq!(list.lines().count(), 2);
        assert!(!list.contains("silence"));
    }

    #[test]
    fn test_concat_list_single_clip() {
        let list = concat_list(&[PathBuf::from("/a/1.wav")], Some(Path::new("/a/s.wav")));
        assert_eq!(list, "file '/a/1.wav'\n");
    }

    #[test]
    fn test_concat_list_makes_paths_absolute() {
        let list = concat_list(&[PathBuf::from("rel.wav")], None);
        let path = list.trim().trim_start_matches("file '").trim_end_matches('\'');
        assert!(Path::new(path).is_absolute());
    }
}
