//! Applies compile-time matching rules to newly-managed windows.

/// One configured rule. `None` patterns match anything; `Some` patterns
/// match by substring against the client's class, instance, and title.
pub struct Rule {
    pub class: Option<&'static str>,
    pub instance: Option<&'static str>,
    pub title: Option<&'static str>,
    pub tags: u32,
    pub isfloating: bool,
    pub monitor: i32,
}

/// Outcome of matching a client against the rule table: tags to OR in,
/// whether to float, and an optional target monitor index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome {
    pub tags: u32,
    pub isfloating: bool,
    pub monitor: Option<usize>,
}

fn matches(pattern: Option<&str>, subject: &str) -> bool {
    match pattern {
        None => true,
        Some(p) => subject.contains(p),
    }
}

/// Runs every rule against `(class, instance, title)` in order, folding the
/// matches together exactly as dwm's `applyrules` loop does: later matching
/// rules OR further tags in and overwrite the floating flag and monitor.
pub fn apply_rules(rules: &[Rule], class: &str, instance: &str, title: &str) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();
    for r in rules {
        if matches(r.title, title) && matches(r.class, class) && matches(r.instance, instance) {
            outcome.tags |= r.tags;
            outcome.isfloating = r.isfloating;
            if r.monitor >= 0 {
                outcome.monitor = Some(r.monitor as usize);
            }
        }
    }
    outcome
}

/// If no rule assigned any tag (or the assigned tags are all outside
/// `tagmask`), the client falls back to its monitor's current tagset.
pub fn resolve_tags(outcome_tags: u32, tagmask: u32, current_tagset: u32) -> u32 {
    let masked = outcome_tags & tagmask;
    if masked != 0 {
        masked
    } else {
        current_tagset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[Rule] = &[
        Rule {
            class: Some("Firefox"),
            instance: None,
            title: None,
            tags: 1 << 2,
            isfloating: false,
            monitor: -1,
        },
        Rule {
            class: None,
            instance: None,
            title: Some("float-me"),
            tags: 0,
            isfloating: true,
            monitor: 1,
        },
    ];

    #[test]
    fn matching_rule_assigns_tags() {
        let out = apply_rules(RULES, "Firefox", "Navigator", "Mozilla Firefox");
        assert_eq!(out.tags, 1 << 2);
        assert!(!out.isfloating);
        assert_eq!(out.monitor, None);
    }

    #[test]
    fn title_only_rule_floats_and_relocates() {
        let out = apply_rules(RULES, "Xterm", "xterm", "float-me please");
        assert!(out.isfloating);
        assert_eq!(out.monitor, Some(1));
    }

    #[test]
    fn no_match_falls_back_to_current_tagset() {
        let out = apply_rules(RULES, "Other", "other", "nothing here");
        let tagmask = (1 << 9) - 1;
        assert_eq!(resolve_tags(out.tags, tagmask, 4), 4);
    }

    #[test]
    fn masked_zero_result_falls_back_too() {
        // a rule's tags bits all land outside of tagmask
        let tagmask = (1 << 9) - 1;
        assert_eq!(resolve_tags(1 << 20, tagmask, 7), 7);
    }
}
