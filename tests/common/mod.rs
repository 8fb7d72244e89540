//! Common test utilities and helpers.

use std::path::{Path, PathBuf};

/// Get the full path to a sample file
pub fn sample_file_path<P: AsRef<Path>>(relative_path: P) -> PathBuf {
    Path::new("samples").join(relative_path)
}

/// Read a sample text file, or `None` (with a note on stderr) when absent.
pub fn read_sample_text<P: AsRef<Path>>(relative_path: P) -> Option<String> {
    let path = sample_file_path(relative_path);
    if !path.exists() {
        eprintln!("Sample not present; skipping (expected at {})", path.display());
        return None;
    }
    match std::fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) => {
            eprintln!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Tokens mixing every marker family with canonical and hostile input.
pub fn token_corpus() -> Vec<String> {
    let mut tokens: Vec<String> = [
        "",
        " ",
        "example.com",
        "example[.]com",
        "example(.)com",
        "example{.}com",
        "example[dot]com",
        "user[@]example.com",
        "user(at)example[.]com",
        "hxxp://evil.com",
        "HXXPS://EVIL[.]COM/A",
        "h[xx]ps://evil[.]com",
        "hxxp[://]evil.com",
        "meow://evil.com",
        "fxp://files[.]example[.]org",
        "192[.]168[.]1[.]1",
        "192.168.1.1",
        "a[[.]]b",
        "[[[[.]]]]",
        "x[:[/]/]y",
        "hxxhxxpp",
        "(at)(at)(at)",
        "[.][.][.]",
        "[.",
        ".]",
        "h[xx",
        "CVE-2021-44228",
        "T1566.001",
        "d41d8cd98f00b204e9800998ecf8427e",
        "00:1a:2b:3c:4d:5e",
        "2001:db8::1",
        "AS15169",
        "0x52908400098527886E0F7030069857D2E4169EE7",
        "ünïcödé[.]テスト",
        "random text",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    // Long repeated separators
    tokens.push("[.]".repeat(5_000));
    tokens.push("[".repeat(2_000) + "." + &"]".repeat(2_000));
    tokens.push("hxxp".repeat(3_000));
    tokens.push("a.".repeat(4_000) + "com");
    tokens
}
