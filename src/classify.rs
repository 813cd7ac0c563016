//! Topic classifier: a priority-ordered rule cascade over keyword context
//! flags. Order matters — sports and finance share combative vocabulary with
//! real conflict, so strong signals fire first and contextual vocabulary is
//! used to downgrade ambiguous combative language, never to upgrade it.
//!
//! The cascade is explicit data (a fixed slice of named rules) so each rule
//! can be tested on its own.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Category;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("classifier regex")
}

static RE_SPORTS: Lazy<Regex> = Lazy::new(|| {
    re("sport|football|soccer|game|league|cup|player|team|score|win|match|olympic|nba|nfl|racing|moto|f1|prix|tournament|squad|coach|athlete|stadium|championship")
});
static RE_FINANCE: Lazy<Regex> = Lazy::new(|| {
    re("market|stock|economy|trade|tariff|bank|money|finance|inflation|rate|price|ceo|business|profit|loss|invest|fund|currency|crypto|bitcoin|nasdaq|dow jones")
});
static RE_HEALTH: Lazy<Regex> = Lazy::new(|| {
    re("health|virus|disease|doctor|hospital|medicine|flu|covid|cancer|pandemic|vaccine|patient|study|trial|drug|mental")
});
static RE_POLITICS: Lazy<Regex> = Lazy::new(|| {
    re("election|vote|policy|government|president|minister|law|bill|congress|senate|diploma|treaty|parliament|leader|campaign|poll|candidate|court|judge|legal")
});
static RE_TECH: Lazy<Regex> = Lazy::new(|| {
    re("tech|ai |cyber|data|science|space|nasa|robot|digital|software|app |launch|satellite|innovation|processor|quantum|chip")
});

// Explicit violence. "bomb"/"blast" are split out because they double as
// sports metaphors; the rest always wins over a sports context.
static RE_STRONG_LITERAL: Lazy<Regex> = Lazy::new(|| {
    re("missile|terror|hostage|genocide|invade|invasion|airstrike|warhead|execution|massacre|battlefield")
});
static RE_STRONG_METAPHOR: Lazy<Regex> = Lazy::new(|| re("bomb|blast"));

static RE_WEAK_CONFLICT: Lazy<Regex> = Lazy::new(|| {
    re("war|fight|kill|attack|gun|shoot|army|military|conflict|strike|dead|death|murder|crime|battle|troop|wound|casualty")
});
static RE_DISASTER: Lazy<Regex> = Lazy::new(|| {
    re("storm|quake|fire|flood|hurricane|tornado|tsunami|volcano|typhoon|earthquake|landslide|wildfire")
});
static RE_HUMANITARIAN: Lazy<Regex> = Lazy::new(|| {
    re("medical|aid|relief|rescue|peace|support|help|donate|offer|care|humanitarian")
});

/// Boolean context flags computed once per input text (lowercased).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextFlags {
    pub sports: bool,
    pub finance: bool,
    pub health: bool,
    pub politics: bool,
    pub tech: bool,
    pub strong_literal: bool,
    pub strong_metaphor: bool,
    pub weak_conflict: bool,
    pub disaster: bool,
    pub crash: bool,
    pub humanitarian: bool,
}

impl ContextFlags {
    pub fn scan(lower: &str) -> Self {
        Self {
            sports: RE_SPORTS.is_match(lower),
            finance: RE_FINANCE.is_match(lower),
            health: RE_HEALTH.is_match(lower),
            politics: RE_POLITICS.is_match(lower),
            tech: RE_TECH.is_match(lower),
            strong_literal: RE_STRONG_LITERAL.is_match(lower),
            strong_metaphor: RE_STRONG_METAPHOR.is_match(lower),
            weak_conflict: RE_WEAK_CONFLICT.is_match(lower),
            disaster: RE_DISASTER.is_match(lower),
            crash: lower.contains("crash"),
            humanitarian: RE_HUMANITARIAN.is_match(lower),
        }
    }

    fn strong_conflict(&self) -> bool {
        self.strong_literal || self.strong_metaphor
    }
}

/// One cascade step: first matching rule wins.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&ContextFlags) -> bool,
    pub category: Category,
}

/// The cascade, in priority order. Literal weapons vocabulary beats every
/// context; "bomb"/"blast" defer to a sports context ("long bomb"); weak
/// combative vocabulary defers to humanitarian wording first, then to each
/// topical context, and only defaults to conflict with no context at all.
pub static RULES: &[Rule] = &[
    Rule {
        name: "strong-conflict-literal",
        applies: |f| f.strong_literal,
        category: Category::Conflict,
    },
    Rule {
        name: "strong-conflict",
        applies: |f| f.strong_conflict() && !f.sports,
        category: Category::Conflict,
    },
    Rule {
        name: "disaster",
        applies: |f| f.disaster && !f.finance,
        category: Category::Disaster,
    },
    Rule {
        // "app crash" / "stock crash" / "crashed out of the cup" excluded
        name: "crash",
        applies: |f| f.crash && !f.finance && !f.sports && !f.tech,
        category: Category::Disaster,
    },
    Rule {
        // "army medical aid", "relief troops" — not conflict
        name: "weak-conflict-humanitarian",
        applies: |f| f.weak_conflict && f.humanitarian,
        category: Category::World,
    },
    Rule {
        // "fighting cancer"
        name: "weak-conflict-health",
        applies: |f| f.weak_conflict && f.health,
        category: Category::Health,
    },
    Rule {
        // "political battle", "attack ads"
        name: "weak-conflict-politics",
        applies: |f| f.weak_conflict && f.politics,
        category: Category::Politics,
    },
    Rule {
        // "trade war", "fighting inflation"
        name: "weak-conflict-finance",
        applies: |f| f.weak_conflict && f.finance,
        category: Category::Finance,
    },
    Rule {
        // "fighting for first place"
        name: "weak-conflict-sports",
        applies: |f| f.weak_conflict && f.sports,
        category: Category::Sports,
    },
    Rule {
        name: "weak-conflict",
        applies: |f| f.weak_conflict,
        category: Category::Conflict,
    },
    Rule {
        name: "tech",
        applies: |f| f.tech,
        category: Category::Tech,
    },
    Rule {
        name: "health",
        applies: |f| f.health,
        category: Category::Health,
    },
    Rule {
        name: "finance",
        applies: |f| f.finance,
        category: Category::Finance,
    },
    Rule {
        name: "politics",
        applies: |f| f.politics,
        category: Category::Politics,
    },
    Rule {
        // bare sports coverage maps to world on the map view
        name: "sports-as-world",
        applies: |f| f.sports,
        category: Category::World,
    },
];

/// Classify free text (title + raw markup, any case).
pub fn classify(text: &str) -> Category {
    let flags = ContextFlags::scan(&text.to_lowercase());
    RULES
        .iter()
        .find(|r| (r.applies)(&flags))
        .map(|r| r.category)
        .unwrap_or(Category::World)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_weapons_beat_sports_context() {
        assert_eq!(
            classify("Missile test overshadows football final"),
            Category::Conflict
        );
    }

    #[test]
    fn bomb_metaphor_defers_to_sports() {
        assert_ne!(
            classify("Last-minute bomb wins the championship game"),
            Category::Conflict
        );
    }

    #[test]
    fn humanitarian_wording_downgrades_weak_conflict() {
        let cat = classify("Army medical aid convoy reaches border");
        assert!(matches!(cat, Category::World | Category::Health));
        assert_ne!(cat, Category::Conflict);
    }

    #[test]
    fn weak_conflict_defers_to_each_context() {
        assert_eq!(classify("Senate battle over new bill"), Category::Politics);
        assert_eq!(classify("Trade war hits markets"), Category::Finance);
        assert_eq!(classify("Fighting cancer with new drug"), Category::Health);
    }

    #[test]
    fn weak_conflict_without_context_is_conflict() {
        assert_eq!(
            classify("Troops wounded in border shooting"),
            Category::Conflict
        );
    }

    #[test]
    fn crash_is_disaster_unless_contextual() {
        assert_eq!(classify("Bus crash on mountain road"), Category::Disaster);
        assert_ne!(classify("Stock market crash fears"), Category::Disaster);
        assert_ne!(
            classify("App crash after software update"),
            Category::Disaster
        );
    }

    #[test]
    fn natural_disasters_classify_as_disaster() {
        assert_eq!(
            classify("Earthquake shakes the capital region"),
            Category::Disaster
        );
    }

    #[test]
    fn bare_sports_maps_to_world() {
        assert_eq!(
            classify("Olympic tournament opens in style"),
            Category::World
        );
    }

    #[test]
    fn plain_text_defaults_to_world() {
        assert_eq!(classify("Village festival draws visitors"), Category::World);
    }
}
