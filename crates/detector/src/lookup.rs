use lingo_kit_core::{PrefixRule, Region};

/// Maps a client IP to a region.
///
/// The bundled [`PrefixTable`] is a development stand-in. Deployments that
/// need real geolocation plug a geo-IP dataset in behind this trait.
pub trait RegionLookup: Send + Sync {
    fn lookup(&self, ip_address: &str) -> Option<Region>;
}

/// Ordered list of IP prefix rules; the first matching prefix wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTable {
    rules: Vec<PrefixRule>,
}

impl PrefixTable {
    pub fn new(rules: Vec<PrefixRule>) -> Self {
        Self { rules }
    }

    /// Table used for local development and tests
    pub fn development() -> Self {
        const RULES: &[(&str, Region)] = &[
            ("200.", Region::Br),
            ("189.", Region::Br),
            ("185.", Region::Pt),
            ("203.", Region::Us),
            ("198.", Region::Us),
            ("192.", Region::Gb),
        ];

        Self::new(
            RULES
                .iter()
                .map(|(prefix, region)| PrefixRule {
                    prefix: prefix.to_string(),
                    region: *region,
                })
                .collect(),
        )
    }

    /// Configured rules, or the development table when none are given
    pub fn from_rules(rules: &[PrefixRule]) -> Self {
        if rules.is_empty() {
            Self::development()
        } else {
            Self::new(rules.to_vec())
        }
    }

    pub fn rules(&self) -> &[PrefixRule] {
        &self.rules
    }
}

impl RegionLookup for PrefixTable {
    fn lookup(&self, ip_address: &str) -> Option<Region> {
        let ip = ip_address.trim();
        self.rules
            .iter()
            .find(|rule| ip.starts_with(rule.prefix.as_str()))
            .map(|rule| rule.region)
    }
}
