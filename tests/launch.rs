use std::{error::Error, path::Path};

use test_utils::{check_script, Expected};

const SRC_PATH: &str = "./tests/fixtures/launch_shares_globals.spy";
const EXPECTED: Expected = Expected {
    stdout: "child script running\n1973\n",
    stderr: "",
};

#[test]
fn launch_shares_the_global_environment() -> Result<(), Box<dyn Error>> {
    check_script(Path::new(SRC_PATH), EXPECTED)
}
