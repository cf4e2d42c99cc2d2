#![no_main]

use libfuzzer_sys::fuzz_target;
use simprod_replay::archive::KeyFilter;
use simprod_replay::reader::ArchiveReader;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must end in a clean EOF or a decode fault, never a panic
    let filter = KeyFilter::new(["Skip.*"]).unwrap();
    let mut reader = ArchiveReader::new("fuzz", data, filter);

    for _ in 0..1000 {
        if reader.pop().is_none() {
            break;
        }
    }
    let _ = reader.exhaustion();
});
