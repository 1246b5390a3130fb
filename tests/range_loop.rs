use std::{error::Error, path::Path};

use test_utils::{check_script, Expected};

const SRC_PATH: &str = "./tests/fixtures/range_loop.spy";
const EXPECTED: Expected = Expected {
    stdout: "1\n4\n9\n",
    stderr: "",
};

#[test]
fn each_over_inclusive_range() -> Result<(), Box<dyn Error>> {
    check_script(Path::new(SRC_PATH), EXPECTED)
}
