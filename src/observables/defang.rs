//! Defang detection over the same marker set the refanger uses.

use super::patterns::RE_HXXP;
use super::refang::MarkerSet;

/// Location of one obfuscation marker in the inspected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl MarkerSet {
    /// True iff `input` carries at least one marker the refanger rewrites.
    pub fn is_defanged(&self, input: &str) -> bool {
        self.automaton.is_match(input)
            || RE_HXXP.is_match(input)
            || self.alias_re.as_ref().is_some_and(|re| re.is_match(input))
    }

    /// Byte spans of the markers as they appear in `input`, ordered by start.
    ///
    /// Only markers present in the input are reported; markers that would
    /// appear after an earlier rewrite (`[[.]]`) count once.
    pub fn find_markers(&self, input: &str) -> Vec<MarkerHit> {
        let mut hits: Vec<MarkerHit> = self
            .automaton
            .find_iter(input)
            .map(|m| MarkerHit {
                start: m.start(),
                end: m.end(),
                text: input[m.start()..m.end()].to_string(),
            })
            .collect();
        hits.extend(RE_HXXP.find_iter(input).map(|m| MarkerHit {
            start: m.start(),
            end: m.end(),
            text: m.as_str().to_string(),
        }));
        if let Some(re) = &self.alias_re {
            // span covers the placeholder word only
            hits.extend(re.captures_iter(input).filter_map(|c| c.get(1)).map(|m| {
                MarkerHit {
                    start: m.start(),
                    end: m.end(),
                    text: m.as_str().to_string(),
                }
            }));
        }
        hits.sort_by_key(|h| (h.start, h.end));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observables::config::ObservableConfig;

    fn set() -> MarkerSet {
        MarkerSet::new(&ObservableConfig::default()).unwrap()
    }

    #[test]
    fn detects_each_family() {
        let m = set();
        assert!(m.is_defanged("192[.]168[.]1[.]1"));
        assert!(m.is_defanged("user[@]example.com"));
        assert!(m.is_defanged("HXXP://x"));
        assert!(m.is_defanged("h[xx]ps://x"));
        assert!(m.is_defanged("evil[://]x"));
        assert!(m.is_defanged("meow://x"));
        assert!(m.is_defanged("corp(DOT)example"));
    }

    #[test]
    fn canonical_is_not_defanged() {
        let m = set();
        for s in ["", "192.168.1.1", "https://example.com", "[x]", "(note)"] {
            assert!(!m.is_defanged(s), "{s}");
        }
    }

    #[test]
    fn detection_agrees_with_refang() {
        let m = set();
        let samples = [
            "hxxps://evil[.]com/path",
            "a[[.]]b",
            "nothing to see",
            "xxxx://a",
            "hxxxx://a",
            "mail(at)x",
            "(a)t",
            "例[.]例",
        ];
        for s in samples {
            assert_eq!(m.is_defanged(s), m.refang(s) != s, "{s}");
        }
    }

    #[test]
    fn marker_spans() {
        let m = set();
        let hits = m.find_markers("hxxps://evil[.]com(.)net");
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["hxxps", "[.]", "(.)"]);
        assert_eq!((hits[1].start, hits[1].end), (12, 15));

        let hits = m.find_markers("MEOW://x");
        assert_eq!(hits[0].text, "MEOW");
    }
}
