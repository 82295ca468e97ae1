use lightningcss::targets::Browsers;
use std::collections::HashSet;

/// ------------------------------
/// 1. Selector capabilities
/// ------------------------------

/// Selector features whose support differs between rendering engines.
/// Putting an unsupported selector into a shared list makes an engine drop
/// the whole list, so every feature used by a merged list must be supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `>`, `+`, `[attr]`, `[attr=v]`, `[attr~=v]`, `[attr|=v]`, `:hover`, ...
    Css2Selectors,
    /// `~`, `[attr^=v]`, `[attr$=v]`, `[attr*=v]`, structural pseudo-classes, `:not`.
    Css3Selectors,
    /// `:before` / `:after`.
    GeneratedContent,
    /// `::before` rather than `:before` for the CSS2 pseudo-elements.
    DoubleColonPseudoElements,
    FirstLetter,
    FirstLine,
    /// `[attr="v" i]`.
    CaseInsensitiveAttributes,
    InOutOfRange,
    DefaultPseudo,
    DirPseudo,
    FocusWithin,
    FocusVisible,
    Has,
    IndeterminatePseudo,
    /// `:matches()`, `:is()`, `:where()`.
    MatchesPseudo,
    OptionalPseudo,
    PlaceholderShown,
    /// `::backdrop`.
    Dialog,
    MarkerPseudo,
    /// `::placeholder`.
    Placeholder,
    /// `::selection`.
    Selection,
}

impl Capability {
    pub const ALL: [Capability; 21] = [
        Capability::Css2Selectors,
        Capability::Css3Selectors,
        Capability::GeneratedContent,
        Capability::DoubleColonPseudoElements,
        Capability::FirstLetter,
        Capability::FirstLine,
        Capability::CaseInsensitiveAttributes,
        Capability::InOutOfRange,
        Capability::DefaultPseudo,
        Capability::DirPseudo,
        Capability::FocusWithin,
        Capability::FocusVisible,
        Capability::Has,
        Capability::IndeterminatePseudo,
        Capability::MatchesPseudo,
        Capability::OptionalPseudo,
        Capability::PlaceholderShown,
        Capability::Dialog,
        Capability::MarkerPseudo,
        Capability::Placeholder,
        Capability::Selection,
    ];
}

/// Capabilities required by a pseudo-class or pseudo-element, keyed by its
/// lowercase spelling including the colons. Unknown pseudos require nothing.
pub fn pseudo_requirements(pseudo: &str) -> &'static [Capability] {
    use Capability::*;
    match pseudo {
        ":active" | ":first-child" | ":focus" | ":hover" | ":lang" => &[Css2Selectors],
        ":checked" | ":disabled" | ":empty" | ":enabled" | ":first-of-type" | ":last-child"
        | ":last-of-type" | ":not" | ":nth-child" | ":nth-last-child" | ":nth-last-of-type"
        | ":nth-of-type" | ":only-child" | ":only-of-type" | ":root" | ":target" => {
            &[Css3Selectors]
        }
        ":after" | ":before" => &[GeneratedContent],
        "::after" | "::before" => &[GeneratedContent, DoubleColonPseudoElements],
        ":first-letter" => &[FirstLetter],
        "::first-letter" => &[FirstLetter, DoubleColonPseudoElements],
        ":first-line" => &[FirstLine],
        "::first-line" => &[FirstLine, DoubleColonPseudoElements],
        ":in-range" | ":out-of-range" => &[InOutOfRange],
        ":default" => &[DefaultPseudo],
        ":dir" => &[DirPseudo],
        ":focus-within" => &[FocusWithin],
        ":focus-visible" => &[FocusVisible],
        ":has" => &[Has],
        ":indeterminate" => &[IndeterminatePseudo],
        ":matches" | ":is" | ":where" => &[MatchesPseudo],
        ":optional" => &[OptionalPseudo],
        ":placeholder-shown" => &[PlaceholderShown],
        "::backdrop" => &[Dialog],
        "::marker" => &[MarkerPseudo],
        "::placeholder" => &[Placeholder],
        "::selection" => &[Selection],
        _ => &[],
    }
}

/// ------------------------------
/// 2. Support data
/// ------------------------------

/// Encodes a version the way lightningcss does: `major << 16 | minor << 8`.
const fn v(major: u32, minor: u32) -> Option<u32> {
    Some((major << 16) | (minor << 8))
}

/// First version of each engine that supports a capability; `None` means
/// no version does.
#[derive(Debug, Clone, Copy)]
struct MinVersions {
    android: Option<u32>,
    chrome: Option<u32>,
    edge: Option<u32>,
    firefox: Option<u32>,
    ie: Option<u32>,
    ios_saf: Option<u32>,
    opera: Option<u32>,
    safari: Option<u32>,
    samsung: Option<u32>,
}

fn min_versions(capability: Capability) -> MinVersions {
    use Capability::*;
    match capability {
        Css2Selectors => MinVersions {
            android: v(2, 1),
            chrome: v(4, 0),
            edge: v(12, 0),
            firefox: v(2, 0),
            ie: v(7, 0),
            ios_saf: v(3, 2),
            opera: v(9, 5),
            safari: v(3, 1),
            samsung: v(4, 0),
        },
        Css3Selectors => MinVersions {
            android: v(2, 1),
            chrome: v(4, 0),
            edge: v(12, 0),
            firefox: v(3, 5),
            ie: v(9, 0),
            ios_saf: v(3, 2),
            opera: v(9, 5),
            safari: v(3, 2),
            samsung: v(4, 0),
        },
        GeneratedContent => MinVersions {
            android: v(2, 1),
            chrome: v(4, 0),
            edge: v(12, 0),
            firefox: v(2, 0),
            ie: v(8, 0),
            ios_saf: v(3, 2),
            opera: v(9, 0),
            safari: v(3, 1),
            samsung: v(4, 0),
        },
        DoubleColonPseudoElements | FirstLetter | FirstLine => MinVersions {
            android: v(2, 1),
            chrome: v(4, 0),
            edge: v(12, 0),
            firefox: v(3, 0),
            ie: v(9, 0),
            ios_saf: v(3, 2),
            opera: v(9, 5),
            safari: v(3, 1),
            samsung: v(4, 0),
        },
        CaseInsensitiveAttributes => MinVersions {
            android: v(49, 0),
            chrome: v(49, 0),
            edge: v(79, 0),
            firefox: v(47, 0),
            ie: None,
            ios_saf: v(9, 0),
            opera: v(36, 0),
            safari: v(9, 0),
            samsung: v(5, 0),
        },
        InOutOfRange => MinVersions {
            android: v(53, 0),
            chrome: v(53, 0),
            edge: v(79, 0),
            firefox: v(50, 0),
            ie: None,
            ios_saf: v(10, 3),
            opera: v(40, 0),
            safari: v(10, 1),
            samsung: v(6, 2),
        },
        DefaultPseudo => MinVersions {
            android: v(4, 4),
            chrome: v(10, 0),
            edge: v(79, 0),
            firefox: v(4, 0),
            ie: None,
            ios_saf: v(5, 0),
            opera: v(10, 0),
            safari: v(5, 1),
            samsung: v(4, 0),
        },
        DirPseudo => MinVersions {
            android: v(120, 0),
            chrome: v(120, 0),
            edge: v(120, 0),
            firefox: v(49, 0),
            ie: None,
            ios_saf: v(16, 4),
            opera: v(106, 0),
            safari: v(16, 4),
            samsung: v(25, 0),
        },
        FocusWithin => MinVersions {
            android: v(60, 0),
            chrome: v(60, 0),
            edge: v(79, 0),
            firefox: v(52, 0),
            ie: None,
            ios_saf: v(10, 3),
            opera: v(47, 0),
            safari: v(10, 1),
            samsung: v(8, 2),
        },
        FocusVisible => MinVersions {
            android: v(86, 0),
            chrome: v(86, 0),
            edge: v(86, 0),
            firefox: v(85, 0),
            ie: None,
            ios_saf: v(15, 4),
            opera: v(72, 0),
            safari: v(15, 4),
            samsung: v(14, 0),
        },
        Has => MinVersions {
            android: v(105, 0),
            chrome: v(105, 0),
            edge: v(105, 0),
            firefox: v(121, 0),
            ie: None,
            ios_saf: v(15, 4),
            opera: v(91, 0),
            safari: v(15, 4),
            samsung: v(20, 0),
        },
        IndeterminatePseudo => MinVersions {
            android: v(39, 0),
            chrome: v(39, 0),
            edge: v(79, 0),
            firefox: v(51, 0),
            ie: None,
            ios_saf: v(10, 3),
            opera: v(26, 0),
            safari: v(10, 1),
            samsung: v(4, 0),
        },
        MatchesPseudo => MinVersions {
            android: v(88, 0),
            chrome: v(88, 0),
            edge: v(88, 0),
            firefox: v(78, 0),
            ie: None,
            ios_saf: v(14, 0),
            opera: v(74, 0),
            safari: v(14, 0),
            samsung: v(15, 0),
        },
        OptionalPseudo => MinVersions {
            android: v(4, 4),
            chrome: v(10, 0),
            edge: v(12, 0),
            firefox: v(4, 0),
            ie: v(10, 0),
            ios_saf: v(5, 0),
            opera: v(10, 0),
            safari: v(5, 0),
            samsung: v(4, 0),
        },
        PlaceholderShown => MinVersions {
            android: v(47, 0),
            chrome: v(47, 0),
            edge: v(79, 0),
            firefox: v(51, 0),
            ie: None,
            ios_saf: v(9, 0),
            opera: v(34, 0),
            safari: v(9, 0),
            samsung: v(5, 0),
        },
        Dialog => MinVersions {
            android: v(37, 0),
            chrome: v(37, 0),
            edge: v(79, 0),
            firefox: v(98, 0),
            ie: None,
            ios_saf: v(15, 4),
            opera: v(24, 0),
            safari: v(15, 4),
            samsung: v(3, 0),
        },
        MarkerPseudo => MinVersions {
            android: v(86, 0),
            chrome: v(86, 0),
            edge: v(86, 0),
            firefox: v(68, 0),
            ie: None,
            ios_saf: v(11, 3),
            opera: v(72, 0),
            safari: v(11, 1),
            samsung: v(14, 0),
        },
        Placeholder => MinVersions {
            android: v(57, 0),
            chrome: v(57, 0),
            edge: v(79, 0),
            firefox: v(51, 0),
            ie: None,
            ios_saf: v(10, 3),
            opera: v(44, 0),
            safari: v(10, 1),
            samsung: v(7, 2),
        },
        Selection => MinVersions {
            android: v(4, 4),
            chrome: v(4, 0),
            edge: v(12, 0),
            firefox: v(62, 0),
            ie: v(9, 0),
            ios_saf: None,
            opera: v(9, 5),
            safari: v(3, 1),
            samsung: v(4, 0),
        },
    }
}

impl MinVersions {
    /// True when every engine named in `targets` is at or above its minimum.
    fn covers(&self, targets: &Browsers) -> bool {
        let pairs = [
            (targets.android, self.android),
            (targets.chrome, self.chrome),
            (targets.edge, self.edge),
            (targets.firefox, self.firefox),
            (targets.ie, self.ie),
            (targets.ios_saf, self.ios_saf),
            (targets.opera, self.opera),
            (targets.safari, self.safari),
            (targets.samsung, self.samsung),
        ];
        pairs.iter().all(|(target, minimum)| match (target, minimum) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(version), Some(minimum)) => version >= minimum,
        })
    }
}

/// ------------------------------
/// 3. Resolved capability set
/// ------------------------------

/// Immutable set of selector capabilities shared by every target engine.
/// Built once per run and passed by reference into every comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySet {
    supported: HashSet<Capability>,
}

impl CapabilitySet {
    /// Support common to all engines in `targets`. Engines the table does not
    /// know about are simply not named in `Browsers` and so never restrict.
    pub fn compile(targets: &Browsers) -> Self {
        let supported = Capability::ALL
            .iter()
            .copied()
            .filter(|capability| min_versions(*capability).covers(targets))
            .collect();
        CapabilitySet { supported }
    }

    /// Worst case: no optional selector feature may be combined.
    pub fn legacy() -> Self {
        CapabilitySet {
            supported: HashSet::new(),
        }
    }

    pub fn modern() -> Self {
        CapabilitySet {
            supported: Capability::ALL.iter().copied().collect(),
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.supported.contains(&capability)
    }

    pub fn supports_all(&self, capabilities: &[Capability]) -> bool {
        capabilities.iter().all(|capability| self.supports(*capability))
    }
}
