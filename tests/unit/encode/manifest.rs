use super::*;

#[test]
fn classification_only_treats_wav_as_audio() {
    assert_eq!(classify_extension("wav"), InputKind::Audio);
    assert_eq!(classify_extension("WAV"), InputKind::Audio);
    assert_eq!(classify_extension("png"), InputKind::Video);
    assert_eq!(classify_extension("exr"), InputKind::Video);
    assert_eq!(classify_extension(""), InputKind::Video);
}

#[test]
fn body_lists_files_with_durations_in_order() {
    let files = vec![
        PathBuf::from("/r/a.0001.png"),
        PathBuf::from("/r/a.0002.png"),
        PathBuf::from("/r/a.0003.png"),
    ];
    let body = render_manifest_body(&files, Some(1.0 / 30.0));

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "file '/r/a.0001.png'");
    assert_eq!(lines[1], "duration 0.033333");
    assert_eq!(lines[2], "file '/r/a.0002.png'");
    assert_eq!(lines[4], "file '/r/a.0003.png'");
}

#[test]
fn body_omits_durations_when_disabled() {
    let files = vec![PathBuf::from("/r/mix.wav")];
    let body = render_manifest_body(&files, None);
    assert_eq!(body, "file '/r/mix.wav'\n");
}

#[test]
fn written_manifest_round_trips_and_audio_never_gets_durations() {
    let dir = tempfile::tempdir().unwrap();
    let frames: Vec<PathBuf> = (1..=4)
        .map(|i| PathBuf::from(format!("/r/seq.{:04}.png", i)))
        .collect();

    let video = write_input_manifest(dir.path(), "png", &frames, 24.0, true).unwrap();
    assert_eq!(video.kind, InputKind::Video);
    let text = std::fs::read_to_string(&video.path).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("file '")).count(), 4);
    assert_eq!(text.lines().filter(|l| l.starts_with("duration ")).count(), 4);

    let audio = write_input_manifest(
        dir.path(),
        "wav",
        &[PathBuf::from("/r/mix.wav")],
        24.0,
        true,
    )
    .unwrap();
    assert_eq!(audio.kind, InputKind::Audio);
    let text = std::fs::read_to_string(&audio.path).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("duration ")).count(), 0);

    // Unique names: the two manifests landed side by side.
    assert_ne!(video.path, audio.path);
}
