//! Named, ordered rule lists.
//!
//! Each pass (block, inline) runs its enabled rules in order until one
//! matches. Rules can also be listed in named alternation chains, e.g. the
//! block rules allowed to interrupt a paragraph.

/// One named rule.
struct Rule<R> {
    name: &'static str,
    enabled: bool,
    func: R,
    alt: &'static [&'static str],
}

/// Ordered list of named rules of function type `R`.
pub(crate) struct Ruler<R> {
    rules: Vec<Rule<R>>,
}

impl<R: Copy> Ruler<R> {
    pub(crate) fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append an enabled rule that also belongs to the `alt` chains.
    pub(crate) fn push(&mut self, name: &'static str, func: R, alt: &'static [&'static str]) {
        self.rules.push(Rule {
            name,
            enabled: true,
            func,
            alt,
        });
    }

    /// Enable a rule by name. Returns `false` if no such rule exists.
    pub(crate) fn enable(&mut self, name: &str) -> bool {
        self.set_enabled(name, true)
    }

    /// Disable a rule by name. Returns `false` if no such rule exists.
    pub(crate) fn disable(&mut self, name: &str) -> bool {
        self.set_enabled(name, false)
    }

    pub(crate) fn is_enabled(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name == name && rule.enabled)
    }

    /// Enabled rules in order.
    pub(crate) fn rules(&self) -> impl Iterator<Item = R> + '_ {
        self.rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| rule.func)
    }

    /// Enabled rules of an alternation chain, in order.
    pub(crate) fn alt<'a>(&'a self, chain: &'a str) -> impl Iterator<Item = R> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.enabled && rule.alt.iter().any(|&name| name == chain))
            .map(|rule| rule.func)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let Some(rule) = self.rules.iter_mut().find(|rule| rule.name == name) else {
            return false;
        };
        if rule.enabled != enabled {
            tracing::debug!(rule = name, enabled, "Toggled parser rule");
        }
        rule.enabled = enabled;
        true
    }
}
