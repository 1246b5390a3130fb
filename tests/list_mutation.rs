use std::{error::Error, path::Path};

use test_utils::{check_script, Expected};

const SRC_PATH: &str = "./tests/fixtures/list_mutation.spy";
const EXPECTED: Expected = Expected {
    stdout: "4\n",
    stderr: "",
};

#[test]
fn add_agent_mutates_in_place() -> Result<(), Box<dyn Error>> {
    check_script(Path::new(SRC_PATH), EXPECTED)
}
