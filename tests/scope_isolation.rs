use std::{error::Error, path::Path};

use test_utils::{check_script, Expected};

const SRC_PATH: &str = "./tests/fixtures/scope_isolation.spy";
const EXPECTED: Expected = Expected {
    stdout: "1\n",
    stderr: "",
};

#[test]
fn assignment_inside_mission_does_not_leak_out() -> Result<(), Box<dyn Error>> {
    check_script(Path::new(SRC_PATH), EXPECTED)
}
