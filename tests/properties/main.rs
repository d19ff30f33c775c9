//! Property tests for the descriptor parser and the check engine.

mod determinism_tests;
mod parser_tests;
