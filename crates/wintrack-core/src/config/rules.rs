/// Window rule types and evaluation logic.
///
/// Rules let users override which windows wintrack manages. User rules
/// are evaluated in order after the built-in class and process
/// exclusions, then the built-in shell rules; the first matching rule
/// wins.
use serde::{Deserialize, Serialize};

/// A rule that decides whether matching windows are managed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRule {
    /// Match windows with this exact class name (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_class: Option<String>,
    /// Match windows whose title contains this string (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_title: Option<String>,
    /// Whether matching windows should be managed.
    pub manage: bool,
}

/// Returns the built-in shell rules.
///
/// These exclude shell surfaces that report a normal class and a
/// title but never host user content.
pub fn default_rules() -> Vec<WindowRule> {
    [
        "Windows Shell Experience Host",
        "Microsoft Text Input Application",
        "Windows Input Experience",
        "NVIDIA GeForce Overlay",
    ]
    .into_iter()
    .map(|title| WindowRule {
        match_class: None,
        match_title: Some(title.into()),
        manage: false,
    })
    .collect()
}

/// Returns the `manage` value of the first rule matching the window,
/// or `None` when no rule matches.
pub fn first_match(class: &str, title: &str, rules: &[WindowRule]) -> Option<bool> {
    rules
        .iter()
        .find(|rule| matches_rule(class, title, rule))
        .map(|rule| rule.manage)
}

fn matches_rule(class: &str, title: &str, rule: &WindowRule) -> bool {
    if let Some(ref mc) = rule.match_class
        && !class.eq_ignore_ascii_case(mc)
    {
        return false;
    }
    if let Some(ref mt) = rule.match_title
        && !title
            .to_ascii_lowercase()
            .contains(&mt.to_ascii_lowercase())
    {
        return false;
    }
    rule.match_class.is_some() || rule.match_title.is_some()
}
