use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::JoinHandle;

use crate::encode::group::EncodeJobRequest;
use crate::encode::manifest::{InputKind, InputManifest, write_input_manifest};
use crate::encode::settings::EncoderSettings;
use crate::foundation::error::{RenderherdError, RenderherdResult};
use crate::foundation::template::{expand_tokens, split_command_args};
use crate::queue::pipeline::{FilenameResolver, format_version};

/// Resolve the final movie path for one encode job: substitute `{version}`
/// and the per-job tokens into the filename template, normalize, and make
/// sure the parent directory exists.
///
/// Directory creation failures are logged but not fatal; the encoder
/// itself will fail to open the output if the directory is truly
/// unusable, which surfaces through its exit.
pub fn resolve_output_path(
    template: &str,
    resolver: &dyn FilenameResolver,
    overrides: &BTreeMap<String, String>,
) -> RenderherdResult<PathBuf> {
    let versioned = template.replace("{version}", &format_version(resolver.resolve_version()));
    let path = resolver.resolve(&versioned, overrides)?;

    if let Some(parent) = path.parent()
        && let Err(err) = std::fs::create_dir_all(parent)
    {
        tracing::error!(
            dir = %parent.display(),
            %err,
            "failed to create directory for encoder output path"
        );
    }
    Ok(path)
}

/// Build the full encoder argument string for one job from the settings
/// templates, the job's shared named arguments, the generated manifests
/// and the resolved output path.
pub fn build_command_line(
    settings: &EncoderSettings,
    request: &EncodeJobRequest,
    manifests: &[InputManifest],
    output_path: &Path,
) -> String {
    let mut video_inputs = String::new();
    let mut audio_inputs = String::new();

    for manifest in manifests {
        let mut input_args = BTreeMap::new();
        input_args.insert(
            "InputFile".to_string(),
            manifest.path.display().to_string(),
        );
        match manifest.kind {
            InputKind::Video => {
                if let Some(rate) = request.named_args.get("FrameRate") {
                    input_args.insert("FrameRate".to_string(), rate.clone());
                }
                video_inputs.push(' ');
                video_inputs.push_str(&expand_tokens(&settings.video_input_format, &input_args));
            }
            InputKind::Audio => {
                audio_inputs.push(' ');
                audio_inputs.push_str(&expand_tokens(&settings.audio_input_format, &input_args));
            }
        }
    }

    let mut final_args = request.named_args.clone();
    final_args.insert("VideoInputs".to_string(), video_inputs);
    final_args.insert("AudioInputs".to_string(), audio_inputs);
    final_args.insert("OutputPath".to_string(), output_path.display().to_string());

    expand_tokens(&settings.command_line_format, &final_args)
}

/// A spawned encoder subprocess with its merged output stream.
///
/// Stdout and stderr are pumped by two background threads into one
/// channel, so the supervisor can drain everything the process printed
/// without ever blocking. The pump threads exit on their own when the
/// process closes its pipes.
#[derive(Debug)]
pub struct SpawnedEncoder {
    /// OS child handle.
    pub child: Child,
    /// Merged, chunked stdout+stderr content.
    pub output_rx: Receiver<String>,
    /// Pump threads, joined during job cleanup.
    pub pumps: Vec<JoinHandle<()>>,
}

fn pump_stream(
    mut reader: impl std::io::Read + Send + 'static,
    tx: Sender<String>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match std::io::Read::read(&mut reader, &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                    if tx.send(chunk).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Generate the input manifests for one job, one per extension bucket.
pub fn write_job_manifests(
    request: &EncodeJobRequest,
    manifest_dir: &Path,
    frame_rate: f64,
    write_frame_durations: bool,
) -> RenderherdResult<Vec<InputManifest>> {
    use anyhow::Context as _;
    std::fs::create_dir_all(manifest_dir)
        .with_context(|| format!("create manifest directory '{}'", manifest_dir.display()))?;

    let mut manifests = Vec::with_capacity(request.files_by_extension.len());
    for (extension, files) in &request.files_by_extension {
        manifests.push(write_input_manifest(
            manifest_dir,
            extension,
            files,
            frame_rate,
            write_frame_durations,
        )?);
    }
    Ok(manifests)
}

/// Spawn the encoder for an assembled command line.
///
/// The executable is launched directly (no shell), with stdin closed and
/// stdout/stderr piped and pumped. Returns a launch error when the OS
/// refuses to start the process, which callers treat as fatal for the
/// whole render job.
pub fn spawn_encoder(executable: &str, command_line: &str) -> RenderherdResult<SpawnedEncoder> {
    let args = split_command_args(command_line);
    tracing::info!(%executable, args = %command_line, "launching encoder");

    let mut child = Command::new(executable)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| {
            RenderherdError::launch(format!("failed to launch encoder '{executable}': {err}"))
        })?;

    let (tx, output_rx) = std::sync::mpsc::channel();
    let mut pumps = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        pumps.push(pump_stream(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        pumps.push(pump_stream(stderr, tx));
    }

    Ok(SpawnedEncoder {
        child,
        output_rx,
        pumps,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/command.rs"]
mod tests;
