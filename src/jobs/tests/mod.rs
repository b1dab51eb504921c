pub(crate) mod diff_job_tests;
