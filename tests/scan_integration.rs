//! Integration test for observable extraction from a defanged report.

mod common;

use fang::observables::{default_engine, scan_text, summarize, IndicatorType, ScanBudget};

#[test]
fn observables_detected_in_sample_report() {
    let Some(text) = common::read_sample_text("reports/defanged_report.txt") else {
        return;
    };

    let budget = ScanBudget {
        max_matches_total: 256,
        max_matches_per_kind: 32,
        time_guard_ms: 1_000,
    };
    let matches = scan_text(default_engine(), &text, &budget);
    let count = |k: IndicatorType| matches.iter().filter(|m| m.kind == k).count();

    assert_eq!(count(IndicatorType::Url), 2, "expected two URLs");
    assert_eq!(count(IndicatorType::EmailAddr), 1);
    assert_eq!(count(IndicatorType::FileName), 2);
    assert_eq!(count(IndicatorType::FileHash), 1);
    assert_eq!(count(IndicatorType::AttackPattern), 1);
    assert_eq!(count(IndicatorType::Vulnerability), 2);
    assert_eq!(count(IndicatorType::Ipv6Addr), 1);
    assert_eq!(count(IndicatorType::Hostname), 1);
    assert_eq!(count(IndicatorType::AutonomousSystem), 1);
    assert_eq!(count(IndicatorType::CryptocurrencyWallet), 1);
    assert_eq!(count(IndicatorType::MacAddr), 1);

    let urls: Vec<&str> = matches
        .iter()
        .filter(|m| m.kind == IndicatorType::Url)
        .map(|m| m.value.as_str())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://cdn.invoice-portal.net/gate.php",
            "http://185.220.101.47/s2.bin"
        ]
    );

    // spans point back into the original text
    for m in &matches {
        assert_eq!(&text[m.start..m.end], m.raw);
    }
}

#[test]
fn summary_of_sample_report_lines() {
    let Some(text) = common::read_sample_text("reports/defanged_report.txt") else {
        return;
    };
    let counts = summarize(default_engine(), text.lines(), 16);
    assert_eq!(counts.get(&IndicatorType::Vulnerability), Some(&2));
    assert_eq!(counts.get(&IndicatorType::DomainName), None);
}

#[test]
fn zero_budget_returns_nothing() {
    let budget = ScanBudget {
        max_matches_total: 0,
        ..ScanBudget::default()
    };
    assert!(scan_text(default_engine(), "evil[.]com 8.8.8.8", &budget).is_empty());
}
