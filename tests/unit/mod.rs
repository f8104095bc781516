mod config_tests;
mod resequencing_tests;
mod sequence_tests;
