pub(crate) mod queue_repository_tests;
pub(crate) mod skip_list_tests;
