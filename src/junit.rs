use junit_report::{Duration, ReportBuilder, TestCaseBuilder, TestSuiteBuilder};
use std::path::Path;

use crate::error::{TbError, TbResult};
use crate::test::TbTests;

pub(crate) fn create_junit_xml(path: &Path, suite: &str, tests: &TbTests) -> TbResult<()> {
    let mut test_cases = Vec::new();

    for t in tests.iter().map(|obj| obj.get()) {
        let duration = Duration::seconds_f64(t.time_secs);
        let tc = match t.result.as_ref() {
            Some(Ok(_)) => TestCaseBuilder::success(&t.name, duration),
            Some(Err(e)) => TestCaseBuilder::failure(&t.name, duration, "failure", &e.to_string()),
            None => TestCaseBuilder::failure(&t.name, duration, "failure", "test did not run"),
        }
        .build();
        test_cases.push(tc);
    }

    let test_suite = TestSuiteBuilder::new(suite)
        .add_testcases(test_cases)
        .build();
    let report = ReportBuilder::new().add_testsuite(test_suite).build();
    let file = std::fs::File::create(path)
        .map_err(|e| TbError::Report(format!("{}: {}", path.display(), e)))?;
    report
        .write_xml(file)
        .map_err(|e| TbError::Report(format!("{}: {:?}", path.display(), e)))
}
