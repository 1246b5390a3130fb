use std::{error::Error, path::Path};

use test_utils::{check_script, Expected};

const SRC_PATH: &str = "./tests/fixtures/arithmetic.spy";
const EXPECTED: Expected = Expected {
    stdout: "7\n",
    stderr: "",
};

#[test]
fn operator_precedence() -> Result<(), Box<dyn Error>> {
    check_script(Path::new(SRC_PATH), EXPECTED)
}
