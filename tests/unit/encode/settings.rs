use super::*;

#[test]
fn defaults_pass_validation() {
    assert!(EncoderSettings::default().validation_errors().is_empty());
}

#[test]
fn missing_fields_each_produce_an_error() {
    let settings = EncoderSettings {
        executable_path: String::new(),
        video_codec: String::new(),
        audio_codec: String::new(),
        output_file_extension: String::new(),
        ..EncoderSettings::default()
    };
    let errors = settings.validation_errors();
    assert_eq!(errors.len(), 4);
    assert!(errors.iter().any(|e| e.contains("executable")));
    assert!(errors.iter().any(|e| e.contains("video")));
    assert!(errors.iter().any(|e| e.contains("audio")));
    assert!(errors.iter().any(|e| e.contains("extension")));
}

#[test]
fn quality_tiers_map_to_their_argument_strings() {
    let settings = EncoderSettings::default();
    assert_eq!(settings.quality_args(EncodeQuality::Low), "-crf 28");
    assert_eq!(settings.quality_args(EncodeQuality::Medium), "-crf 23");
    assert_eq!(settings.quality_args(EncodeQuality::High), "-crf 20");
    assert_eq!(settings.quality_args(EncodeQuality::Epic), "-crf 16");
}

#[test]
fn partial_settings_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encoder.json");
    std::fs::write(&path, r#"{ "executable_path": "/opt/ffmpeg/bin/ffmpeg" }"#).unwrap();

    let settings = EncoderSettings::from_path(&path).unwrap();
    assert_eq!(settings.executable_path, "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(settings.video_codec, "libx264");
    assert!(settings.command_line_format.contains("{OutputPath}"));
}

#[test]
fn unreadable_settings_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(EncoderSettings::from_path(&dir.path().join("missing.json")).is_err());
}

#[test]
fn probe_fails_for_nonexistent_executable() {
    let settings = EncoderSettings {
        executable_path: "/nonexistent/encoder-binary".to_string(),
        ..EncoderSettings::default()
    };
    assert!(!settings.is_encoder_available());
}
