use std::{error::Error, path::Path};

use test_utils::{check_script, Expected};

const SRC_PATH: &str = "./tests/fixtures/closures.spy";
const EXPECTED: Expected = Expected {
    stdout: "8\n",
    stderr: "",
};

#[test]
fn nested_mission_captures_outer_locals() -> Result<(), Box<dyn Error>> {
    check_script(Path::new(SRC_PATH), EXPECTED)
}
