//! Dependency tree construction from the rule registry


use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::Error;
use crate::rules::template;
use crate::rules::{RecipeFn, Registry, Rule};

/// A resolved node in the dependency tree.
///
/// `depends` children feed their timestamps into the parent's staleness
/// decision; `prerequisites` children only gate on existence. A name can
/// appear in several places in one tree (reached along different edges);
/// the scheduler keys progress on the name, so each name still builds at
/// most once per run.
#[derive(Clone)]
pub struct Node {
    pub name: String,
    pub is_phony: bool,
    /// True when this node was reached over a prerequisite edge.
    pub is_prerequisite: bool,
    pub recipe: RecipeFn,
    pub depends: Vec<Node>,
    pub prerequisites: Vec<Node>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("is_phony", &self.is_phony)
            .field("is_prerequisite", &self.is_prerequisite)
            .field("depends", &self.depends)
            .field("prerequisites", &self.prerequisites)
            .finish_non_exhaustive()
    }
}

/// Resolve `goal` against the registry into an immutable dependency tree.
///
/// Children are fully resolved before their parent; no recipe runs during
/// construction. Cycle checks compare each expanded child name against the
/// set of names on the path from the goal down to it.
pub fn build(registry: &Registry, goal: &str) -> Result<Node, Error> {
    resolve(registry, goal, &HashSet::new(), false)
}

fn resolve(
    registry: &Registry,
    name: &str,
    ancestors: &HashSet<String>,
    is_prerequisite: bool,
) -> Result<Node, Error> {
    let mut resolved: Option<Node> = None;
    // Missing-target error from the last matching rule whose subtree could
    // not be completed; surfaced only if nothing else applies.
    let mut fallback: Option<Error> = None;

    for rule in registry.rules() {
        let Some(groups) = captured_groups(rule, name) else {
            continue;
        };
        match resolve_rule(registry, rule, name, &groups, ancestors, is_prerequisite) {
            Ok(node) => {
                if resolved.is_some() {
                    return Err(Error::DuplicateTarget(name.to_string()));
                }
                resolved = Some(node);
            }
            // A matching rule whose children cannot be made is inapplicable
            // rather than fatal; other rules may still produce this name.
            Err(missing @ Error::MissingTarget(_)) => fallback = Some(missing),
            Err(other) => return Err(other),
        }
    }

    if let Some(node) = resolved {
        return Ok(node);
    }

    // No rule makes this name. A file that already exists stands in as a
    // source leaf; its recipe only re-asserts the file is still there.
    if Path::new(name).exists() {
        return Ok(source_leaf(name, is_prerequisite));
    }

    Err(fallback.unwrap_or_else(|| Error::MissingTarget(name.to_string())))
}

fn resolve_rule(
    registry: &Registry,
    rule: &Rule,
    name: &str,
    groups: &[&str],
    ancestors: &HashSet<String>,
    is_prerequisite: bool,
) -> Result<Node, Error> {
    let depends = resolve_children(registry, &rule.depends, name, groups, ancestors, false)?;
    let prerequisites =
        resolve_children(registry, &rule.prerequisites, name, groups, ancestors, true)?;
    Ok(Node {
        name: name.to_string(),
        is_phony: rule.is_phony,
        is_prerequisite,
        recipe: Arc::clone(&rule.recipe),
        depends,
        prerequisites,
    })
}

fn resolve_children(
    registry: &Registry,
    templates: &[String],
    parent: &str,
    groups: &[&str],
    ancestors: &HashSet<String>,
    is_prerequisite: bool,
) -> Result<Vec<Node>, Error> {
    let mut children = Vec::with_capacity(templates.len());
    for tmpl in templates {
        let child = template::expand_groups(tmpl, groups);
        if ancestors.contains(&child) {
            return Err(Error::CircularDependency {
                target: parent.to_string(),
                ancestor: child,
            });
        }
        let mut path = ancestors.clone();
        path.insert(child.clone());
        children.push(resolve(registry, &child, &path, is_prerequisite)?);
    }
    Ok(children)
}

/// Capture groups for `name` if the rule's pattern matches it in full.
/// Groups that did not participate in the match come back empty.
fn captured_groups<'n>(rule: &Rule, name: &'n str) -> Option<Vec<&'n str>> {
    let caps = rule.matcher.captures(name)?;
    Some(
        (1..caps.len())
            .map(|i| caps.get(i).map_or("", |m| m.as_str()))
            .collect(),
    )
}

fn source_leaf(name: &str, is_prerequisite: bool) -> Node {
    let recipe: RecipeFn = Arc::new(|target: &str, _: &[String], _: &[String]| {
        if Path::new(target).exists() {
            Ok(())
        } else {
            Err(Error::MissingTarget(target.to_string()).into())
        }
    });
    Node {
        name: name.to_string(),
        is_phony: false,
        is_prerequisite,
        recipe,
        depends: Vec::new(),
        prerequisites: Vec::new(),
    }
}
