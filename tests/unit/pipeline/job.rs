use super::*;
use crate::pipeline::progress::NoProgress;

fn request(hint: Option<&str>) -> RenderJobRequest {
    let mut json = serde_json::json!({
        "audioFeatures": {
            "tempoBpm": 120.0,
            "energyLevels": [0.2, 0.8],
            "durationSeconds": 1.0
        },
        "templateId": "waveform",
        "settings": { "width": 32, "height": 18, "fps": 5 }
    });
    if let Some(h) = hint {
        json["outputDirectoryHint"] = serde_json::Value::from(h);
    }
    serde_json::from_value(json).unwrap()
}

struct NeverCalled;

impl Encoder for NeverCalled {
    fn encode(&self, _request: &EncodeRequest) -> PixbeatResult<PathBuf> {
        panic!("encoder must not run");
    }
}

#[test]
fn output_defaults_to_hint_and_template() {
    let job = RenderJob::new(request(Some("/videos")));
    assert_eq!(job.output(), Path::new("/videos/pixbeat_waveform.mp4"));
    let job = job.with_output("song.mp4");
    assert_eq!(job.output(), Path::new("/videos/song.mp4"));
    let job = RenderJob::new(request(None)).with_output("/abs/out.mp4");
    assert_eq!(job.output(), Path::new("/abs/out.mp4"));
}

#[test]
fn missing_audio_fails_before_rendering() {
    let work = tempfile::tempdir().unwrap();
    let job = RenderJob::new(request(None))
        .with_audio(work.path().join("nope.wav"))
        .with_work_dir(work.path());
    let err = job
        .run(&NeverCalled, &CancellationToken::new(), &NoProgress)
        .unwrap_err();
    assert!(matches!(err, PixbeatError::MissingInput(_)));
    assert_eq!(err.stage(), Stage::Analysis);
}

#[test]
fn unwritable_output_dir_fails_in_encoding() {
    let work = tempfile::tempdir().unwrap();
    let blocker = work.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();
    let job = RenderJob::new(request(None))
        .with_work_dir(work.path())
        .with_output(blocker.join("clip.mp4"));
    let err = job
        .run(&NeverCalled, &CancellationToken::new(), &NoProgress)
        .unwrap_err();
    assert!(matches!(err, PixbeatError::Encode(_)));
    assert_eq!(err.stage(), Stage::Encoding);
    assert!(err.to_string().contains("failed to create output directory"));
    // Only the blocking file is left; the frames are gone.
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 1);
}

#[test]
fn cancelled_job_is_not_an_error() {
    let work = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let job = RenderJob::new(request(None)).with_work_dir(work.path());
    let outcome = job.run(&NeverCalled, &cancel, &NoProgress).unwrap();
    assert_eq!(outcome, JobOutcome::Cancelled);
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
}
