// Unit tests for kernel spec loading and discovery

use crate::error::kernelspec::KernelSpecError;
use crate::kernelspec::{InterruptMode, KernelSpec, list_kernels_in};

use std::path::Path;

use tempfile::TempDir;

fn write_spec(dir: &Path, name: &str, contents: &str) {
    let kernel_dir = dir.join("kernels").join(name);
    std::fs::create_dir_all(&kernel_dir).unwrap();
    std::fs::write(kernel_dir.join("kernel.json"), contents).unwrap();
}

/// **VALUE**: Verifies a standard ipykernel spec loads with defaults for omitted fields.
#[test]
fn given_ipykernel_spec_when_loaded_then_fields_parsed() {
    // GIVEN: A typical kernel.json
    let temp = TempDir::new().unwrap();
    write_spec(
        temp.path(),
        "python3",
        r#"{
            "argv": ["python", "-m", "ipykernel_launcher", "-f", "{connection_file}"],
            "display_name": "Python 3 (ipykernel)",
            "language": "python",
            "metadata": { "debugger": true }
        }"#,
    );

    // WHEN: Loading it
    let spec = KernelSpec::load(&temp.path().join("kernels/python3")).unwrap();

    // THEN: Fields parsed, unknown keys ignored, defaults applied
    assert_eq!(spec.argv.len(), 5);
    assert_eq!(spec.argv[4], "{connection_file}");
    assert_eq!(spec.display_name, "Python 3 (ipykernel)");
    assert_eq!(spec.language, "python");
    assert_eq!(spec.interrupt_mode, InterruptMode::Signal);
    assert!(spec.env.is_empty());
}

/// **VALUE**: Verifies an empty argv is rejected at load time.
///
/// **WHY THIS MATTERS**: Launch would otherwise fail later with a less specific error.
#[test]
fn given_empty_argv_when_loaded_then_validation_error() {
    // GIVEN: A spec with no argv entries
    let temp = TempDir::new().unwrap();
    write_spec(temp.path(), "broken", r#"{ "argv": [], "display_name": "Broken" }"#);

    // WHEN: Loading it
    let result = KernelSpec::load(&temp.path().join("kernels/broken"));

    // THEN: Validation error
    assert!(matches!(result, Err(KernelSpecError::Validation { .. })));
}

/// **VALUE**: Verifies a missing kernel.json is a read error that names the path.
#[test]
fn given_missing_spec_when_loaded_then_read_error() {
    // GIVEN: An empty dir
    let temp = TempDir::new().unwrap();

    // WHEN: Loading
    let err = KernelSpec::load(temp.path()).unwrap_err();

    // THEN: Read error with the file path
    assert!(matches!(err, KernelSpecError::Read { .. }));
    assert!(err.to_string().contains("kernel.json"));
}

/// **VALUE**: Verifies listing skips malformed specs and sorts the rest.
#[test]
fn given_mixed_kernels_dir_when_listed_then_valid_specs_sorted() {
    // GIVEN: Two valid specs and one malformed
    let temp = TempDir::new().unwrap();
    write_spec(temp.path(), "zeta", r#"{ "argv": ["zeta-kernel"], "display_name": "Zeta" }"#);
    write_spec(temp.path(), "alpha", r#"{ "argv": ["alpha-kernel"], "display_name": "Alpha", "interrupt_mode": "message", "env": {"A": "1"} }"#);
    write_spec(temp.path(), "garbage", "not json");

    // WHEN: Listing
    let kernels = list_kernels_in(temp.path());

    // THEN: Two specs in name order
    let names: Vec<&str> = kernels.iter().map(|(_, s)| s.display_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
    assert_eq!(kernels[0].1.interrupt_mode, InterruptMode::Message);
    assert_eq!(kernels[0].1.env.get("A").map(String::as_str), Some("1"));
}

/// **VALUE**: Verifies a data dir without a kernels directory lists nothing.
#[test]
fn given_no_kernels_dir_when_listed_then_empty() {
    let temp = TempDir::new().unwrap();

    assert!(list_kernels_in(temp.path()).is_empty());
}
