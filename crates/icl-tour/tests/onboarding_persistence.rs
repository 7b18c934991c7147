//! First-run gating across simulated application launches.

use icl_tour::onboarding::{OnboardingWalkthrough, default_onboarding_steps};
use icl_tour::seen_flag::{FileSeenFlag, SeenFlag};

fn launch(flag: &FileSeenFlag) -> OnboardingWalkthrough {
    let mut walkthrough =
        OnboardingWalkthrough::new(default_onboarding_steps()).expect("default steps");
    walkthrough.open_if_first_run(flag);
    walkthrough
}

#[test]
fn onboarding_shows_once_per_state_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let flag = FileSeenFlag::new(dir.path().join("icl").join("onboarding.json"));

    let mut first = launch(&flag);
    assert!(first.is_visible());
    while first.next() {}
    assert_eq!(first.progress_label(), "Step 5 of 5");
    first.finish(&flag).expect("persist flag");

    let second = launch(&FileSeenFlag::new(flag.path()));
    assert!(!second.is_visible());
    assert!(second.current().is_none());
}

#[test]
fn reset_brings_onboarding_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let flag = FileSeenFlag::new(dir.path().join("onboarding.json"));
    flag.store(true).expect("store");
    assert!(!launch(&flag).is_visible());

    OnboardingWalkthrough::reset(&flag).expect("reset");
    assert!(launch(&flag).is_visible());
}

#[test]
fn unreadable_flag_counts_as_first_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("onboarding.json");
    std::fs::write(&path, "{").expect("write");
    let flag = FileSeenFlag::new(&path);
    assert!(flag.load().is_err());
    assert!(launch(&flag).is_visible());
}
