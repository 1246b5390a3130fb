use std::{error::Error, path::Path};

use test_utils::check_failing_script_contains;

const SRC_PATH: &str = "./tests/fixtures/division_by_zero.spy";

#[test]
fn dividing_by_zero_is_a_runtime_error() -> Result<(), Box<dyn Error>> {
    check_failing_script_contains(Path::new(SRC_PATH), &["Division by zero", "runtime breach"])
}
