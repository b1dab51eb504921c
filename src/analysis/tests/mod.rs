pub(crate) mod context_tests;
