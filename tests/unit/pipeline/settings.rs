use super::*;

#[test]
fn defaults_fill_missing_keys() {
    let s: ProjectSettings = serde_json::from_str(r#"{"fps": 24, "quality": "high"}"#).unwrap();
    assert_eq!(s.fps, 24);
    assert_eq!(s.quality, Quality::High);
    assert_eq!((s.width, s.height), (1280, 720));
    assert_eq!((s.grid_rows, s.grid_cols), (8, 8));
    assert_eq!(s.seed, 42);
    assert_eq!(s.progress_every, 15);
    assert!(s.validate().is_ok());
}

#[test]
fn validation_rejects_bad_settings() {
    let bad = [
        ProjectSettings {
            width: 641,
            ..ProjectSettings::default()
        },
        ProjectSettings {
            height: 9000,
            ..ProjectSettings::default()
        },
        ProjectSettings {
            fps: 0,
            ..ProjectSettings::default()
        },
        ProjectSettings {
            fps: 241,
            ..ProjectSettings::default()
        },
        ProjectSettings {
            grid_rows: 13,
            ..ProjectSettings::default()
        },
        ProjectSettings {
            progress_every: 0,
            ..ProjectSettings::default()
        },
        ProjectSettings {
            threads: Some(0),
            ..ProjectSettings::default()
        },
        ProjectSettings {
            duration_seconds: Some(-1.0),
            ..ProjectSettings::default()
        },
    ];
    for s in bad {
        let err = s.validate().unwrap_err();
        assert!(matches!(err, PixbeatError::Validation(_)), "{s:?}");
    }
}

#[test]
fn render_duration_caps_at_song_length() {
    let s = ProjectSettings {
        duration_seconds: Some(3.0),
        ..ProjectSettings::default()
    };
    assert_eq!(s.render_duration(10.0), 3.0);
    assert_eq!(s.render_duration(2.0), 2.0);
    assert_eq!(ProjectSettings::default().render_duration(7.5), 7.5);
}

#[test]
fn request_accepts_features_or_timeline() {
    let r: RenderJobRequest = serde_json::from_str(
        r#"{"audioFeatures": {"tempoBpm": 100, "durationSeconds": 4, "mood": "Energetic"},
            "templateId": "square_boom", "settings": {"width": 320, "height": 180}}"#,
    )
    .unwrap();
    assert_eq!(r.style().unwrap(), VisualStyle::SquareBoomGrid);
    assert_eq!(r.settings.width, 320);
    assert_eq!(r.timeline().unwrap().beats().len(), 7);

    let r: RenderJobRequest = serde_json::from_str(
        r#"{"timeline": {"duration": 2.0, "bpm": 60.0},
            "templateId": "waveform",
            "songInfo": {"genre": "Pop", "key": "C", "mode": "major", "mood": "", "confidence": 1.0}}"#,
    )
    .unwrap();
    let tl = r.timeline().unwrap();
    assert_eq!(tl.info().genre, "Pop");
    assert_eq!(r.settings, ProjectSettings::default());
}

#[test]
fn unreadable_request_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("req.json");
    std::fs::write(&path, "{not json").unwrap();
    let err = RenderJobRequest::from_path(&path).unwrap_err();
    assert!(matches!(err, PixbeatError::Serde(_)));
    assert!(err.to_string().contains("req.json"));

    let err = RenderJobRequest::from_path(dir.path().join("missing.json")).unwrap_err();
    assert_eq!(err.stage(), Stage::Analysis);
    let msg = err.to_string();
    assert!(msg.starts_with("analysis failed: failed to read render request"), "{msg}");
    // The OS cause follows the context line.
    assert!(msg.matches(": ").count() >= 2, "{msg}");
}

#[test]
fn unreadable_feature_files_fail_in_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let err = AudioFeatures::from_path(dir.path().join("features.json")).unwrap_err();
    assert_eq!(err.stage(), Stage::Analysis);
    let err = AnalysisTimeline::from_path(dir.path().join("timeline.json")).unwrap_err();
    assert_eq!(err.stage(), Stage::Analysis);
}
