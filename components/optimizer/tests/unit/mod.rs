//! Unit test runner for the optimizer crate

mod test_compile;
mod test_fold;
mod test_minify;
mod test_printer;
