//! Rule registration: target patterns, dependency templates, and recipes.
//!
//! A rule pairs a regex that must match the whole target name with two
//! lists of child-name templates and a recipe. Registration validates the
//! pattern and templates eagerly so a bad rulebook fails before any build
//! starts. Recipes attach through a [`RuleBinder`], which can fan one
//! pattern out into several independent rules.

pub(crate) mod template;

use std::sync::Arc;

use regex::Regex;

use crate::error::Error;

/// Uniform recipe shape: target name, dependency names, prerequisite names.
///
/// Recipes that ignore an argument take it as `_`; the scheduler always
/// passes all three.
pub type RecipeFn = Arc<dyn Fn(&str, &[String], &[String]) -> anyhow::Result<()> + Send + Sync>;

/// One registered rule.
pub(crate) struct Rule {
    pub(crate) matcher: Regex,
    pub(crate) recipe: RecipeFn,
    pub(crate) depends: Vec<String>,
    pub(crate) prerequisites: Vec<String>,
    pub(crate) is_phony: bool,
}

/// Ordered collection of build rules.
///
/// Rules are matched in registration order. The registry is mutated only
/// while rules are being declared; builds take it by shared reference.
#[derive(Default)]
pub struct Registry {
    rules: Vec<Rule>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule whose recipe is expected to produce the target file.
    pub fn output(
        &mut self,
        pattern: &str,
        depends: &[&str],
        prerequisites: &[&str],
    ) -> Result<RuleBinder<'_>, Error> {
        self.binder(pattern, depends, prerequisites, false)
    }

    /// Declare a rule whose target is a task name, not a file on disk.
    pub fn phony(
        &mut self,
        pattern: &str,
        depends: &[&str],
        prerequisites: &[&str],
    ) -> Result<RuleBinder<'_>, Error> {
        self.binder(pattern, depends, prerequisites, true)
    }

    fn binder(
        &mut self,
        pattern: &str,
        depends: &[&str],
        prerequisites: &[&str],
        is_phony: bool,
    ) -> Result<RuleBinder<'_>, Error> {
        let matcher = compile_anchored(pattern)?;
        let group_count = matcher.captures_len() - 1;
        for tmpl in depends.iter().chain(prerequisites.iter()) {
            template::validate_groups(tmpl, group_count)?;
        }
        Ok(RuleBinder {
            registry: self,
            matcher,
            depends: depends.iter().map(|s| s.to_string()).collect(),
            prerequisites: prerequisites.iter().map(|s| s.to_string()).collect(),
            is_phony,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Compile a target pattern anchored at both ends; partial matches never
/// select a rule.
pub(crate) fn compile_anchored(pattern: &str) -> Result<Regex, Error> {
    Regex::new(&format!(r"\A(?:{pattern})\z"))
        .map_err(|err| Error::MakefileUsage(format!("Invalid target pattern '{pattern}': {err}")))
}

/// Attaches recipes to a validated pattern and template set.
///
/// Nothing is registered until [`RuleBinder::run`] is called; each call
/// adds one rule, so calling it twice declares two rules that both match
/// the pattern (and will collide as duplicates if one target resolves
/// through both).
#[must_use = "a rule is not registered until a recipe is attached with run()"]
pub struct RuleBinder<'a> {
    registry: &'a mut Registry,
    matcher: Regex,
    depends: Vec<String>,
    prerequisites: Vec<String>,
    is_phony: bool,
}

impl RuleBinder<'_> {
    /// Attach `recipe` and register the rule.
    pub fn run<F>(&mut self, recipe: F) -> &mut Self
    where
        F: Fn(&str, &[String], &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.registry.rules.push(Rule {
            matcher: self.matcher.clone(),
            recipe: Arc::new(recipe),
            depends: self.depends.clone(),
            prerequisites: self.prerequisites.clone(),
            is_phony: self.is_phony,
        });
        self
    }

    pub(crate) fn matcher(&self) -> &Regex {
        &self.matcher
    }
}
