mod compare_tests;
mod stats_tests;
mod support;
