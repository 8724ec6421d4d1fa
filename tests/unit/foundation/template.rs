use super::*;

fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn expand_replaces_known_tokens_and_keeps_unknown() {
    let out = expand_tokens(
        "{Executable} -r {FrameRate} {Mystery}",
        &args(&[("Executable", "ffmpeg"), ("FrameRate", "30")]),
    );
    assert_eq!(out, "ffmpeg -r 30 {Mystery}");
}

#[test]
fn expand_handles_adjacent_and_repeated_tokens() {
    let out = expand_tokens("{a}{a}-{b}", &args(&[("a", "x"), ("b", "y")]));
    assert_eq!(out, "xx-y");
}

#[test]
fn expand_leaves_unterminated_braces_alone() {
    let out = expand_tokens("literal { brace", &args(&[]));
    assert_eq!(out, "literal { brace");
}

#[test]
fn split_honors_quotes_and_whitespace() {
    let argv = split_command_args(r#"-y -i "/tmp/with space/in.txt" -c:v libx264 '/out dir/a.mp4'"#);
    assert_eq!(
        argv,
        vec![
            "-y",
            "-i",
            "/tmp/with space/in.txt",
            "-c:v",
            "libx264",
            "/out dir/a.mp4",
        ]
    );
}

#[test]
fn split_keeps_empty_quoted_argument() {
    let argv = split_command_args(r#"-metadata comment="" done"#);
    assert_eq!(argv, vec!["-metadata", "comment=", "done"]);
}

#[test]
fn split_drops_blank_runs() {
    let argv = split_command_args("  a   b  ");
    assert_eq!(argv, vec!["a", "b"]);
}

#[test]
fn normalize_collapses_dot_segments() {
    let normalized = normalize_path(std::path::Path::new("/tmp/renders/./shots/../out.mp4"));
    assert_eq!(normalized, std::path::PathBuf::from("/tmp/renders/out.mp4"));
}

#[test]
fn normalize_makes_relative_paths_absolute() {
    let normalized = normalize_path(std::path::Path::new("frames/out.mp4"));
    assert!(normalized.is_absolute());
    assert!(normalized.ends_with("frames/out.mp4"));
}
