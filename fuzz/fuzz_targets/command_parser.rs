#![no_main]

use hookprof::command::{StartCommand, DEFAULT_COMMAND};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Split like the console does; parsing must never panic
        let args: Vec<&str> = input.split_whitespace().collect();
        let _ = StartCommand::parse(DEFAULT_COMMAND, args.as_slice());
    }
});
