//! Helpers for driving the compiled `spylang` binary from integration tests.

use std::{
    error::Error,
    path::Path,
    process::{Command, Output},
    str,
};

const SPYLANG_PATH: &str = "./target/debug/spylang";

pub struct Expected<'a> {
    pub stdout: &'a str,
    pub stderr: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        assert_eq!(str::from_utf8(&output.stderr)?, self.stderr);
        Ok(())
    }
}

fn run_script(src_path: &Path) -> Result<Output, std::io::Error> {
    Command::new(SPYLANG_PATH).arg(src_path).output()
}

/// Run `src_path` as a batch script and assert its stdout/stderr match
/// `expected`. Also asserts the process exited successfully.
pub fn check_script(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_script(src_path)?;

    println!("{}", str::from_utf8(&output.stdout)?);
    expected.assert_matches(&output)?;
    assert!(
        output.status.success(),
        "spylang exited with status {:?}",
        output.status.code()
    );

    Ok(())
}

/// Run `src_path` expecting it to fail (a lexical, syntax, or runtime
/// error), and assert its stdout matches `expected_stdout` exactly.
pub fn check_failing_script(src_path: &Path, expected_stdout: &str) -> Result<(), Box<dyn Error>> {
    let output = run_script(src_path)?;

    assert!(
        !output.status.success(),
        "expected spylang to exit with a failure status for {}",
        src_path.display()
    );
    assert_eq!(str::from_utf8(&output.stdout)?, expected_stdout);

    Ok(())
}

/// Like [`check_failing_script`], but only requires the error text to
/// *contain* each of `expected_fragments` - used when the exact rendering
/// (colored caret underline, column spacing) isn't worth pinning down.
pub fn check_failing_script_contains(
    src_path: &Path,
    expected_fragments: &[&str],
) -> Result<(), Box<dyn Error>> {
    let output = run_script(src_path)?;

    assert!(
        !output.status.success(),
        "expected spylang to exit with a failure status for {}",
        src_path.display()
    );

    let stdout = str::from_utf8(&output.stdout)?;
    for fragment in expected_fragments {
        assert!(
            stdout.contains(fragment),
            "expected stdout of {} to contain {fragment:?}, got:\n{stdout}",
            src_path.display()
        );
    }

    Ok(())
}
