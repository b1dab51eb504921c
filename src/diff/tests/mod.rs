pub(crate) mod noise_classifier_tests;
pub(crate) mod significance_tests;
