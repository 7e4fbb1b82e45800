//! Option builders for tests

use base::BaseOptions;
use clap::Parser;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    base: BaseOptions,
}

/// Parses `args` as if they followed the binary name
pub fn test_options(args: &[&str]) -> BaseOptions {
    let mut argv = vec!["testbot"];
    argv.extend_from_slice(args);
    TestCli::parse_from(argv).base
}
