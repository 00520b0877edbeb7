//! Declarative makefiles
//!
//! A makefile is the file-based way to fill a [`Registry`]: YAML rule
//! entries whose recipes run shell commands in order. Command lines accept
//! `{target}`, `{depends}` and `{prereqs}` placeholders plus the `{N}`
//! capture groups of the rule's own target pattern.

mod schema;


use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::Error;
use crate::rules::template::{self, Piece};
use crate::rules::Registry;
use crate::shell;

pub use schema::{ListOrString, Manifest, RuleDef};

impl Manifest {
    /// Read and parse a makefile.
    pub fn load(path: &Path) -> Result<Manifest, Error> {
        let text = fs::read_to_string(path).map_err(|err| {
            Error::MakefileUsage(format!("Cannot read makefile '{}': {err}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// Parse makefile text. Placeholder and shape errors are caught later,
    /// at registration; this only enforces YAML structure.
    pub fn parse(text: &str) -> Result<Manifest, Error> {
        serde_yaml::from_str(text)
            .map_err(|err| Error::MakefileUsage(format!("Invalid makefile syntax: {err}")))
    }

    /// Validate every entry and declare it in `registry`, in file order.
    pub fn register(self, registry: &mut Registry) -> Result<(), Error> {
        for rule in self.rules {
            register_rule(registry, rule)?;
        }
        Ok(())
    }
}

fn register_rule(registry: &mut Registry, def: RuleDef) -> Result<(), Error> {
    let depends = def.depends.into_list("depends")?;
    let prerequisites = def.prerequisites.into_list("prerequisites")?;
    let commands = def.commands.into_list("commands")?;

    let depend_refs: Vec<&str> = depends.iter().map(String::as_str).collect();
    let prereq_refs: Vec<&str> = prerequisites.iter().map(String::as_str).collect();
    let mut binder = if def.phony {
        registry.phony(&def.target, &depend_refs, &prereq_refs)?
    } else {
        registry.output(&def.target, &depend_refs, &prereq_refs)?
    };

    let matcher = binder.matcher().clone();
    let group_count = matcher.captures_len() - 1;
    for command in &commands {
        validate_command(command, group_count)?;
    }

    binder.run(command_recipe(matcher, commands));
    Ok(())
}

/// Recipe that renders each command line against the concrete target name
/// and runs it through the shell, stopping at the first failure.
fn command_recipe(
    matcher: Regex,
    commands: Vec<String>,
) -> impl Fn(&str, &[String], &[String]) -> anyhow::Result<()> + Send + Sync + 'static {
    move |target: &str, depends: &[String], prereqs: &[String]| {
        let groups: Vec<String> = matcher.captures(target).map_or_else(Vec::new, |caps| {
            (1..caps.len())
                .map(|i| caps.get(i).map_or("", |m| m.as_str()).to_string())
                .collect()
        });
        for command in &commands {
            let line = render_command(command, target, depends, prereqs, &groups);
            shell::sh(&line)?;
        }
        Ok(())
    }
}

fn validate_command(template: &str, group_count: usize) -> Result<(), Error> {
    for piece in template::parse(template)? {
        match piece {
            Piece::Literal(_) => {}
            Piece::Group(index) if index < group_count => {}
            Piece::Group(index) => {
                return Err(Error::MakefileUsage(format!(
                    "Command '{template}' uses capture group {index} but the pattern only captures {group_count}"
                )));
            }
            Piece::Named("target" | "depends" | "prereqs") => {}
            Piece::Named(name) => {
                return Err(Error::MakefileUsage(format!(
                    "Command '{template}' uses unknown placeholder '{{{name}}}'"
                )));
            }
        }
    }
    Ok(())
}

fn render_command(
    template: &str,
    target: &str,
    depends: &[String],
    prereqs: &[String],
    groups: &[String],
) -> String {
    let Ok(pieces) = template::parse(template) else {
        return template.to_string();
    };
    let mut line = String::with_capacity(template.len());
    for piece in pieces {
        match piece {
            Piece::Literal(text) => line.push_str(text),
            Piece::Group(index) => {
                line.push_str(groups.get(index).map(String::as_str).unwrap_or(""));
            }
            Piece::Named("target") => line.push_str(target),
            Piece::Named("depends") => line.push_str(&depends.join(" ")),
            Piece::Named("prereqs") => line.push_str(&prereqs.join(" ")),
            Piece::Named(_) => {}
        }
    }
    line
}
