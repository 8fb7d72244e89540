#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let kind = fang::observables::classify(&text);
    let observable = fang::observables::inspect(&text);
    assert_eq!(kind, observable.kind);
});
