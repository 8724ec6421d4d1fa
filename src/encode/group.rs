use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::queue::output::{PassId, ShotOutputData};
use crate::queue::shot::WeakShot;

/// One encoder invocation waiting to be launched: everything needed to
/// build the input manifests and the final command line for a single
/// logical output stream. Built once per render pass by
/// [`group_shot_outputs`] and consumed once by the launcher.
#[derive(Clone, Debug, Default)]
pub struct EncodeJobRequest {
    /// The render pass this stream carries.
    pub pass: PassId,
    /// Input file paths bucketed by extension, in production order.
    pub files_by_extension: BTreeMap<String, Vec<PathBuf>>,
    /// Sum of contributing shots' known frame counts; 0 when unknown,
    /// which disables progress and ETA for the job.
    pub expected_frame_count: u64,
    /// Representative shot for status propagation and filename tokens.
    pub shot: WeakShot,
    /// Named arguments shared by every job of this export (executable,
    /// codecs, frame rate, quality, extra args). The resolved output path
    /// is added per job at launch time.
    pub named_args: BTreeMap<String, String>,
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Group per-shot render output into one [`EncodeJobRequest`] per non-audio
/// render pass.
///
/// Audio-pass files are attached to every video group of the same shot, so
/// each produced movie carries the full mix. Shots with an unknown frame
/// count contribute their files but not to `expected_frame_count`. When
/// `clear_source_records` is set, each shot's pass records are emptied
/// after grouping so later consumers cannot pick up paths that are about
/// to be deleted.
pub fn group_shot_outputs(
    output_data: &mut [ShotOutputData],
    shared_args: &BTreeMap<String, String>,
    clear_source_records: bool,
) -> Vec<EncodeJobRequest> {
    let mut groups: BTreeMap<PassId, EncodeJobRequest> = BTreeMap::new();

    for data in output_data.iter_mut() {
        for (pass, files) in &data.render_pass_data {
            if pass.is_audio() {
                continue;
            }

            let group = groups.entry(pass.clone()).or_insert_with(|| EncodeJobRequest {
                pass: pass.clone(),
                named_args: shared_args.clone(),
                ..EncodeJobRequest::default()
            });

            if !group.shot.is_alive() {
                group.shot = data.shot.clone();
            }
            if let Some(shot) = data.shot.upgrade() {
                let frames = shot.frame_count();
                if frames > 0 {
                    group.expected_frame_count += frames;
                }
            }

            for path in files {
                group
                    .files_by_extension
                    .entry(extension_of(path))
                    .or_default()
                    .push(path.clone());
            }

            // Audio is attached to every render pass of this shot.
            for (inner_pass, audio_files) in &data.render_pass_data {
                if !inner_pass.is_audio() {
                    continue;
                }
                for path in audio_files {
                    group
                        .files_by_extension
                        .entry(extension_of(path))
                        .or_default()
                        .push(path.clone());
                }
            }
        }

        if clear_source_records {
            data.render_pass_data.clear();
        }
    }

    groups.into_values().collect()
}

/// Whether any shot produced more than one non-audio render pass. When it
/// did, the output filename template must contain `{render_pass}` or the
/// per-pass movies would overwrite each other.
pub fn has_multiple_render_passes(output_data: &[ShotOutputData]) -> bool {
    output_data.iter().any(|data| {
        data.render_pass_data
            .keys()
            .filter(|pass| !pass.is_audio())
            .count()
            > 1
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/group.rs"]
mod tests;
