//! Unused rule removal
//!
//! A selector survives when every class, id and type name in it is either
//! used or safelisted. Pseudo classes, attribute selectors and the universal
//! selector never cause a removal.

use super::PipelineError;
use crate::extract::{tokenize, UsedTokenSet};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::properties::Property;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::selector::{Component, Selector};
use lightningcss::stylesheet::{PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Optional extra pruning passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOptions {
    pub font_face: bool,
    pub keyframes: bool,
    pub variables: bool,
}

/// What the pruner removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub removed_rules: usize,
    pub removed_selectors: usize,
    pub removed_keyframes: usize,
    pub removed_font_faces: usize,
    pub removed_variables: usize,
}

impl PruneStats {
    pub fn total(&self) -> usize {
        self.removed_rules
            + self.removed_selectors
            + self.removed_keyframes
            + self.removed_font_faces
            + self.removed_variables
    }
}

fn keyframes_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"@(?:-[a-z]+-)?keyframes\s+"?([^\s"{]+)"?"#).expect("keyframes pattern is valid")
    })
}

fn font_family_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"font-family:\s*(?:"([^"]+)"|'([^']+)'|([^;}\n]+))"#)
            .expect("font-family pattern is valid")
    })
}

fn var_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"var\(\s*(--[A-Za-z0-9_-]+)").expect("var() pattern is valid")
    })
}

/// Removes style rules whose selectors reference unused tokens
pub struct Pruner<'a> {
    used: &'a UsedTokenSet,
    safelist: HashSet<&'a str>,
    options: PruneOptions,
}

impl<'a> Pruner<'a> {
    pub fn new(used: &'a UsedTokenSet, safelist: &'a [String], options: PruneOptions) -> Self {
        Self {
            used,
            safelist: safelist.iter().map(String::as_str).collect(),
            options,
        }
    }

    /// Prune a parsed style sheet in place
    pub fn prune(&self, sheet: &mut StyleSheet) -> Result<PruneStats, PipelineError> {
        let mut stats = PruneStats::default();

        self.prune_selectors(&mut sheet.rules, &mut stats);

        if self.options.keyframes || self.options.font_face {
            let mut style_text = String::new();
            collect_style_text(&sheet.rules, &mut style_text);
            let style_tokens: HashSet<String> = tokenize(&style_text).into_iter().collect();
            let mut families = HashSet::new();
            collect_font_families(&sheet.rules, &mut families);
            self.prune_at_rules(&mut sheet.rules, &style_tokens, &families, &mut stats);
        }

        if self.options.variables {
            let printed = sheet
                .to_css(PrinterOptions::default())
                .map_err(|e| PipelineError::Print(e.to_string()))?;
            let referenced: HashSet<&str> = var_reference_pattern()
                .captures_iter(&printed.code)
                .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
                .collect();
            self.prune_variables(&mut sheet.rules, &referenced, &mut stats);
        }

        debug!(
            "Pruned {} rules, {} selectors, {} keyframes, {} font faces, {} variables",
            stats.removed_rules,
            stats.removed_selectors,
            stats.removed_keyframes,
            stats.removed_font_faces,
            stats.removed_variables
        );

        Ok(stats)
    }

    fn is_kept(&self, token: &str) -> bool {
        self.used.contains(token) || self.safelist.contains(token)
    }

    /// Check whether every class, id and type name in a selector is kept
    pub fn is_selector_used(&self, selector: &Selector) -> bool {
        selector.iter_raw_match_order().all(|component| match component {
            Component::Class(class) => self.is_kept(&class.0),
            Component::ID(id) => self.is_kept(&id.0),
            Component::LocalName(local) => {
                self.is_kept(&local.name.0) || self.is_kept(&local.lower_name.0)
            }
            _ => true,
        })
    }

    fn prune_selectors(&self, rules: &mut CssRuleList, stats: &mut PruneStats) {
        rules.0.retain_mut(|rule| match rule {
            CssRule::Style(style) => {
                let before = style.selectors.0.len();
                style
                    .selectors
                    .0
                    .retain(|selector| self.is_selector_used(selector));
                let after = style.selectors.0.len();

                if after == 0 {
                    trace!("Removing rule with {} unused selectors", before);
                    stats.removed_rules += 1;
                    return false;
                }

                stats.removed_selectors += before - after;
                self.prune_selectors(&mut style.rules, stats);
                true
            }
            CssRule::Media(media) => self.prune_block(&mut media.rules, stats),
            CssRule::Supports(supports) => self.prune_block(&mut supports.rules, stats),
            CssRule::LayerBlock(layer) => self.prune_block(&mut layer.rules, stats),
            CssRule::Container(container) => self.prune_block(&mut container.rules, stats),
            _ => true,
        });
    }

    /// Prune a conditional block; returns whether anything is left in it
    fn prune_block(&self, rules: &mut CssRuleList, stats: &mut PruneStats) -> bool {
        if rules.0.is_empty() {
            return true;
        }
        self.prune_selectors(rules, stats);
        !rules.0.is_empty()
    }

    fn prune_at_rules(
        &self,
        rules: &mut CssRuleList,
        style_tokens: &HashSet<String>,
        families: &HashSet<String>,
        stats: &mut PruneStats,
    ) {
        rules.0.retain_mut(|rule| {
            match rule {
                CssRule::Keyframes(_) if self.options.keyframes => {
                    let Some(name) = keyframes_name(rule) else {
                        return true;
                    };
                    let keep = style_tokens.contains(&name) || self.safelist.contains(name.as_str());
                    if !keep {
                        trace!("Removing unused @keyframes {}", name);
                        stats.removed_keyframes += 1;
                    }
                    keep
                }
                CssRule::FontFace(_) if self.options.font_face => {
                    let Some(family) = font_face_family(rule) else {
                        return true;
                    };
                    let keep =
                        families.contains(&family) || self.safelist.contains(family.as_str());
                    if !keep {
                        trace!("Removing unused @font-face {}", family);
                        stats.removed_font_faces += 1;
                    }
                    keep
                }
                CssRule::Media(media) => {
                    self.prune_at_rules(&mut media.rules, style_tokens, families, stats);
                    !media.rules.0.is_empty()
                }
                CssRule::Supports(supports) => {
                    self.prune_at_rules(&mut supports.rules, style_tokens, families, stats);
                    !supports.rules.0.is_empty()
                }
                CssRule::LayerBlock(layer) => {
                    self.prune_at_rules(&mut layer.rules, style_tokens, families, stats);
                    !layer.rules.0.is_empty()
                }
                CssRule::Container(container) => {
                    self.prune_at_rules(&mut container.rules, style_tokens, families, stats);
                    !container.rules.0.is_empty()
                }
                _ => true,
            }
        });
    }

    fn prune_variables(
        &self,
        rules: &mut CssRuleList,
        referenced: &HashSet<&str>,
        stats: &mut PruneStats,
    ) {
        for rule in rules.0.iter_mut() {
            match rule {
                CssRule::Style(style) => {
                    self.retain_variables(&mut style.declarations, referenced, stats);
                    self.prune_variables(&mut style.rules, referenced, stats);
                }
                CssRule::Media(media) => self.prune_variables(&mut media.rules, referenced, stats),
                CssRule::Supports(supports) => {
                    self.prune_variables(&mut supports.rules, referenced, stats)
                }
                CssRule::LayerBlock(layer) => {
                    self.prune_variables(&mut layer.rules, referenced, stats)
                }
                CssRule::Container(container) => {
                    self.prune_variables(&mut container.rules, referenced, stats)
                }
                _ => {}
            }
        }
    }

    fn retain_variables(
        &self,
        block: &mut DeclarationBlock,
        referenced: &HashSet<&str>,
        stats: &mut PruneStats,
    ) {
        for declarations in [&mut block.declarations, &mut block.important_declarations] {
            let before = declarations.len();
            declarations.retain(|property| {
                let id = property.property_id();
                let name = id.name();
                !name.starts_with("--")
                    || referenced.contains(name)
                    || self.safelist.contains(name)
                    || self.safelist.contains(name.trim_start_matches("--"))
            });
            stats.removed_variables += before - declarations.len();
        }
    }
}

/// Count style rules, including ones nested in conditional blocks
pub fn count_style_rules(rules: &CssRuleList) -> usize {
    rules
        .0
        .iter()
        .map(|rule| match rule {
            CssRule::Style(style) => 1 + count_style_rules(&style.rules),
            CssRule::Media(media) => count_style_rules(&media.rules),
            CssRule::Supports(supports) => count_style_rules(&supports.rules),
            CssRule::LayerBlock(layer) => count_style_rules(&layer.rules),
            CssRule::Container(container) => count_style_rules(&container.rules),
            _ => 0,
        })
        .sum()
}

/// Family names read by `font-family` and `font` declarations of style rules
fn collect_font_families(rules: &CssRuleList, out: &mut HashSet<String>) {
    for rule in &rules.0 {
        match rule {
            CssRule::Style(style) => {
                let block = &style.declarations;
                for property in block.declarations.iter().chain(&block.important_declarations) {
                    let families = match property {
                        Property::FontFamily(families) => families,
                        Property::Font(font) => &font.family,
                        _ => continue,
                    };
                    for family in families {
                        if let Ok(name) = family.to_css_string(PrinterOptions::default()) {
                            out.insert(unquote(&name).to_string());
                        }
                    }
                }
                collect_font_families(&style.rules, out);
            }
            CssRule::Media(media) => collect_font_families(&media.rules, out),
            CssRule::Supports(supports) => collect_font_families(&supports.rules, out),
            CssRule::LayerBlock(layer) => collect_font_families(&layer.rules, out),
            CssRule::Container(container) => collect_font_families(&container.rules, out),
            _ => {}
        }
    }
}

fn unquote(name: &str) -> &str {
    name.trim().trim_matches(|c| c == '"' || c == '\'')
}

/// Serialized text of every style rule; used to find references to keyframes names
fn collect_style_text(rules: &CssRuleList, out: &mut String) {
    for rule in &rules.0 {
        match rule {
            CssRule::Style(_) => {
                if let Ok(text) = rule.to_css_string(PrinterOptions::default()) {
                    out.push_str(&text);
                    out.push('\n');
                }
            }
            CssRule::Media(media) => collect_style_text(&media.rules, out),
            CssRule::Supports(supports) => collect_style_text(&supports.rules, out),
            CssRule::LayerBlock(layer) => collect_style_text(&layer.rules, out),
            CssRule::Container(container) => collect_style_text(&container.rules, out),
            _ => {}
        }
    }
}

fn keyframes_name(rule: &CssRule) -> Option<String> {
    let text = rule.to_css_string(PrinterOptions::default()).ok()?;
    let cap = keyframes_name_pattern().captures(&text)?;
    Some(cap.get(1)?.as_str().to_string())
}

fn font_face_family(rule: &CssRule) -> Option<String> {
    let text = rule.to_css_string(PrinterOptions::default()).ok()?;
    let cap = font_family_pattern().captures(&text)?;
    let family = cap.get(1).or_else(|| cap.get(2)).or_else(|| cap.get(3))?;
    Some(unquote(family.as_str()).to_string())
}
