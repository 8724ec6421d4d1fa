use super::*;

use crate::queue::output::AUDIO_PASS;
use crate::queue::shot::ShotHandle;

fn shot_data(shot: &ShotHandle, passes: &[(&str, &[&str])]) -> ShotOutputData {
    let mut data = ShotOutputData {
        shot: shot.downgrade(),
        ..ShotOutputData::default()
    };
    for (pass, files) in passes {
        data.add_pass_files(PassId::new(*pass), files.iter().map(|f| PathBuf::from(*f)));
    }
    data
}

#[test]
fn each_video_pass_becomes_one_group_with_audio_attached() {
    let shot = ShotHandle::new("shot01", "cam01", 50);
    let mut output = vec![shot_data(
        &shot,
        &[
            ("beauty", &["/r/beauty.0001.png", "/r/beauty.0002.png"][..]),
            ("depth", &["/r/depth.0001.png", "/r/depth.0002.png"][..]),
            (AUDIO_PASS, &["/r/mix.wav"][..]),
        ],
    )];

    let groups = group_shot_outputs(&mut output, &BTreeMap::new(), false);
    assert_eq!(groups.len(), 2);

    for group in &groups {
        assert_eq!(group.expected_frame_count, 50);
        assert_eq!(group.files_by_extension["wav"], vec![PathBuf::from("/r/mix.wav")]);
        assert_eq!(group.files_by_extension["png"].len(), 2);
    }

    let passes: Vec<&str> = groups.iter().map(|g| g.pass.name()).collect();
    assert_eq!(passes, vec!["beauty", "depth"]);
}

#[test]
fn audio_alone_produces_no_group() {
    let shot = ShotHandle::new("shot01", "cam01", 10);
    let mut output = vec![shot_data(&shot, &[(AUDIO_PASS, &["/r/mix.wav"][..])])];

    let groups = group_shot_outputs(&mut output, &BTreeMap::new(), false);
    assert!(groups.is_empty());
}

#[test]
fn frame_counts_accumulate_across_shots_and_skip_unknown() {
    let a = ShotHandle::new("shot01", "cam01", 30);
    let b = ShotHandle::new("shot02", "cam01", 0);
    let c = ShotHandle::new("shot03", "cam01", 20);
    let mut output = vec![
        shot_data(&a, &[("beauty", &["/r/a.0001.png"][..])]),
        shot_data(&b, &[("beauty", &["/r/b.0001.png"][..])]),
        shot_data(&c, &[("beauty", &["/r/c.0001.png"][..])]),
    ];

    let groups = group_shot_outputs(&mut output, &BTreeMap::new(), false);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].expected_frame_count, 50);
    assert_eq!(groups[0].files_by_extension["png"].len(), 3);
}

#[test]
fn clearing_source_records_happens_after_copying() {
    let shot = ShotHandle::new("shot01", "cam01", 10);
    let mut output = vec![shot_data(&shot, &[("beauty", &["/r/a.0001.png"][..])])];

    let groups = group_shot_outputs(&mut output, &BTreeMap::new(), true);
    assert_eq!(groups[0].files_by_extension["png"].len(), 1);
    assert!(output[0].render_pass_data.is_empty());
}

#[test]
fn shared_arguments_are_copied_into_every_group() {
    let shot = ShotHandle::new("shot01", "cam01", 10);
    let shared: BTreeMap<String, String> =
        [("FrameRate".to_string(), "30".to_string())].into();
    let mut output = vec![shot_data(
        &shot,
        &[("beauty", &["/r/a.png"][..]), ("depth", &["/r/d.png"][..])],
    )];

    let groups = group_shot_outputs(&mut output, &shared, false);
    for group in &groups {
        assert_eq!(group.named_args.get("FrameRate").map(String::as_str), Some("30"));
    }
}

#[test]
fn multiple_pass_detection_ignores_audio() {
    let shot = ShotHandle::new("shot01", "cam01", 10);
    let single = vec![shot_data(
        &shot,
        &[("beauty", &["/r/a.png"][..]), (AUDIO_PASS, &["/r/m.wav"][..])],
    )];
    assert!(!has_multiple_render_passes(&single));

    let double = vec![shot_data(
        &shot,
        &[("beauty", &["/r/a.png"][..]), ("depth", &["/r/d.png"][..])],
    )];
    assert!(has_multiple_render_passes(&double));
}

#[test]
fn group_keeps_a_live_shot_reference() {
    let a = ShotHandle::new("shot01", "cam01", 10);
    let mut output = vec![shot_data(&a, &[("beauty", &["/r/a.png"][..])])];

    let groups = group_shot_outputs(&mut output, &BTreeMap::new(), false);
    let shot = groups[0].shot.upgrade().expect("shot should be alive");
    assert_eq!(shot.outer_name(), "shot01");
}
