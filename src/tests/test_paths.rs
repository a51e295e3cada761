use std::path::{Path, PathBuf};

use crate::paths::resolve_task_paths;

#[test]
fn test_default_paths() {
    let (model, curve) = resolve_task_paths("cartpole", None);
    assert_eq!(model, PathBuf::from("outputs/cartpole.bin"));
    assert_eq!(curve, PathBuf::from("outputs/cartpole.txt"));
}

#[test]
fn test_file_path_wins() {
    let output = Path::new("run/my_model.bin");
    let (model, curve) = resolve_task_paths("cartpole", Some(output));
    assert_eq!(model, PathBuf::from("run/my_model.bin"));
    assert_eq!(curve, PathBuf::from("run/my_model.txt"));
}

#[test]
fn test_directory_path() {
    let output = Path::new("run/artifacts");
    let (model, curve) = resolve_task_paths("cliff_walking", Some(output));
    assert_eq!(model, PathBuf::from("run/artifacts/cliff_walking.bin"));
    assert_eq!(curve, PathBuf::from("run/artifacts/cliff_walking.txt"));
}
