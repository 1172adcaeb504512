mod test_utils;
mod reader_tests;
mod writer_tests;
