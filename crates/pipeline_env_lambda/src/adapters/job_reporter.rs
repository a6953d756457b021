pub trait JobReporter {
    fn report_success(&self, job_id: &str) -> Result<(), String>;
    fn report_failure(&self, job_id: &str, message: &str) -> Result<(), String>;
}
