#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let once = fang::observables::refang(text);
    let twice = fang::observables::refang(&once);
    assert_eq!(once, twice);
    assert_eq!(fang::observables::is_defanged(text), once != text);
});
