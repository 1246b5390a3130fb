use std::{error::Error, path::Path};

use test_utils::{check_script, Expected};

const SRC_PATH: &str = "./tests/fixtures/fact.spy";
const EXPECTED: Expected = Expected {
    stdout: "120\n",
    stderr: "",
};

#[test]
fn recursive_factorial() -> Result<(), Box<dyn Error>> {
    check_script(Path::new(SRC_PATH), EXPECTED)
}
