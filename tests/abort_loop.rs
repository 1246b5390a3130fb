use std::{error::Error, path::Path};

use test_utils::{check_script, Expected};

const SRC_PATH: &str = "./tests/fixtures/abort_loop.spy";
const EXPECTED: Expected = Expected {
    stdout: "0\n1\n2\n",
    stderr: "",
};

#[test]
fn abort_stops_the_innermost_loop() -> Result<(), Box<dyn Error>> {
    check_script(Path::new(SRC_PATH), EXPECTED)
}
