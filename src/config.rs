// src/config.rs
//! Trigger config interpreter.
//!
//! Format, one record per line:
//! ```text
//! // comment
//! name,TITLE,some phrase
//! name,DESCRIPTION,some phrase
//! name,BEFORE,18 Sep 2016 09:00:00
//! name,AFTER,18 Sep 2016 09:00:00
//! name,NOT,other
//! name,AND,left,right
//! name,OR,left,right
//! ADD,name1,name2,...
//! ```
//! Lines are read top to bottom in a single pass, so every name must be defined
//! before it is used. Redefining a name only affects later lines.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{ConfigWarning, TriggerConfigError};
use crate::trigger::{Trigger, TriggerRef};

// --- env defaults & names ---
pub const DEFAULT_TRIGGER_CONFIG_PATH: &str = "config/triggers.txt";
pub const ENV_TRIGGER_CONFIG_PATH: &str = "TRIGGER_CONFIG_PATH";

const ACTIVATE: &str = "ADD";

/// Resolve the trigger file path: `$TRIGGER_CONFIG_PATH` or `config/triggers.txt`.
pub fn trigger_config_path() -> PathBuf {
    std::env::var(ENV_TRIGGER_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_TRIGGER_CONFIG_PATH))
}

/// Result of a successful load: the active triggers in declaration order.
#[derive(Debug, Clone, Default)]
pub struct TriggerConfig {
    pub triggers: Vec<TriggerRef>,
    pub warnings: Vec<ConfigWarning>,
}

impl TriggerConfig {
    /// Interpret config text. Any error aborts the whole load.
    pub fn parse(text: &str) -> Result<Self, TriggerConfigError> {
        let mut interp = Interpreter::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            interp.line(idx + 1, line)?;
        }

        for w in &interp.warnings {
            warn!(target: "triggers", warning = %w, "trigger config warning");
        }
        info!(
            target: "triggers",
            defined = interp.registry.len(),
            active = interp.active.len(),
            "trigger config loaded"
        );

        Ok(Self {
            triggers: interp.active,
            warnings: interp.warnings,
        })
    }

    /// Read and interpret the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, TriggerConfigError> {
        let content = fs::read_to_string(path).map_err(|source| TriggerConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }
}

/// Parse config text into the active trigger list.
pub fn parse_trigger_config(text: &str) -> Result<Vec<TriggerRef>, TriggerConfigError> {
    TriggerConfig::parse(text).map(|c| c.triggers)
}

/// Read a config file into the active trigger list.
pub fn read_trigger_config(path: impl AsRef<Path>) -> Result<Vec<TriggerRef>, TriggerConfigError> {
    TriggerConfig::from_path(path.as_ref()).map(|c| c.triggers)
}

/// Per-call parse state. The registry never outlives one `parse`.
#[derive(Default)]
struct Interpreter {
    registry: HashMap<String, TriggerRef>,
    active: Vec<TriggerRef>,
    warnings: Vec<ConfigWarning>,
}

impl Interpreter {
    fn line(&mut self, line: usize, text: &str) -> Result<(), TriggerConfigError> {
        let fields: Vec<&str> = text.split(',').collect();
        if fields[0].trim() == ACTIVATE {
            self.activate(line, &fields[1..])
        } else {
            self.define(line, &fields)
        }
    }

    fn activate(&mut self, line: usize, names: &[&str]) -> Result<(), TriggerConfigError> {
        if names.is_empty() {
            return Err(TriggerConfigError::syntax(
                line,
                "ADD needs at least one trigger name",
            ));
        }
        for name in names {
            let t = self.lookup(line, name)?;
            self.active.push(t);
        }
        Ok(())
    }

    fn define(&mut self, line: usize, fields: &[&str]) -> Result<(), TriggerConfigError> {
        if fields.len() < 3 {
            return Err(TriggerConfigError::syntax(
                line,
                format!("expected `name,KIND,arg[,arg2]`, got {} field(s)", fields.len()),
            ));
        }
        let name = checked_name(line, fields[0])?;
        let kind = fields[1].trim();

        let trigger = match kind {
            "TITLE" | "DESCRIPTION" => {
                expect_fields(line, kind, fields, 3)?;
                let t = if kind == "TITLE" {
                    Trigger::title(fields[2])
                } else {
                    Trigger::description(fields[2])
                };
                if let Trigger::Title(p) | Trigger::Description(p) = &t {
                    if p.is_empty() {
                        self.warnings.push(ConfigWarning::EmptyPhrase {
                            line,
                            name: name.to_string(),
                        });
                    }
                }
                t
            }
            "BEFORE" | "AFTER" => {
                expect_fields(line, kind, fields, 3)?;
                let parsed = if kind == "BEFORE" {
                    Trigger::before(fields[2])
                } else {
                    Trigger::after(fields[2])
                };
                parsed.map_err(|source| TriggerConfigError::TimeParse { line, source })?
            }
            "NOT" => {
                expect_fields(line, kind, fields, 3)?;
                Trigger::not(self.lookup(line, fields[2])?)
            }
            "AND" | "OR" => {
                expect_fields(line, kind, fields, 4)?;
                let left = self.lookup(line, fields[2])?;
                let right = self.lookup(line, fields[3])?;
                if kind == "AND" {
                    Trigger::and(left, right)
                } else {
                    Trigger::or(left, right)
                }
            }
            other => {
                return Err(TriggerConfigError::syntax(
                    line,
                    format!("unknown trigger kind `{other}`"),
                ))
            }
        };

        debug!(target: "triggers", line, name, kind, "trigger defined");
        self.registry.insert(name.to_string(), Arc::new(trigger));
        Ok(())
    }

    fn lookup(&self, line: usize, name: &str) -> Result<TriggerRef, TriggerConfigError> {
        let name = checked_name(line, name)?;
        self.registry
            .get(name)
            .cloned()
            .ok_or_else(|| TriggerConfigError::UnresolvedReference {
                line,
                name: name.to_string(),
            })
    }
}

fn checked_name(line: usize, raw: &str) -> Result<&str, TriggerConfigError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(TriggerConfigError::syntax(line, "empty trigger name"));
    }
    Ok(name)
}

fn expect_fields(
    line: usize,
    kind: &str,
    fields: &[&str],
    want: usize,
) -> Result<(), TriggerConfigError> {
    if fields.len() != want {
        return Err(TriggerConfigError::syntax(
            line,
            format!("{kind} takes {want} fields, got {}", fields.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::Story;
    use chrono::DateTime;

    fn story(title: &str, description: &str) -> Story {
        Story::new(
            "id",
            title,
            description,
            "",
            DateTime::parse_from_rfc3339("2016-10-01T12:00:00Z").unwrap(),
        )
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let cfg = TriggerConfig::parse(
            "// header\n\n   \nt1,TITLE,cat   \n// t2,TITLE,dog\nADD,t1\n",
        )
        .unwrap();
        assert_eq!(cfg.triggers.len(), 1);
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn add_lines_accumulate_in_order() {
        let triggers =
            parse_trigger_config("a,TITLE,alpha\nb,TITLE,beta\nADD,b\nADD,a,b\n").unwrap();
        assert_eq!(triggers.len(), 3);
        let s = story("alpha", "");
        let fired: Vec<bool> = triggers.iter().map(|t| t.evaluate(&s)).collect();
        assert_eq!(fired, vec![false, true, false]);
    }

    #[test]
    fn not_resolves_its_operand() {
        let triggers = parse_trigger_config("t1,TITLE,cat\nt2,NOT,t1\nADD,t2\n").unwrap();
        assert!(!triggers[0].evaluate(&story("a cat", "")));
        assert!(triggers[0].evaluate(&story("a dog", "")));
    }

    #[test]
    fn redefinition_is_not_retroactive() {
        let triggers = parse_trigger_config(
            "t1,TITLE,cat\nt2,NOT,t1\nt1,TITLE,dog\nADD,t1,t2\n",
        )
        .unwrap();
        let s = story("cat", "");
        // new t1 looks for "dog"; t2 still wraps the old "cat" trigger
        assert!(!triggers[0].evaluate(&s));
        assert!(!triggers[1].evaluate(&s));
        assert!(triggers[1].evaluate(&story("dog", "")));
    }

    #[test]
    fn forward_reference_is_unresolved() {
        let err = parse_trigger_config("t2,NOT,t1\nt1,TITLE,cat\nADD,t2\n").unwrap_err();
        match err {
            TriggerConfigError::UnresolvedReference { line, name } => {
                assert_eq!(line, 1);
                assert_eq!(name, "t1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let cases = [
            ("t1,TITLE\n", 1),
            ("// c\nt1,SUBJECT,x\n", 2),
            ("t1,TITLE,a,b\n", 1),
            ("t1,TITLE,a\nt2,AND,t1\n", 2),
            ("ADD\n", 1),
            ("t1,TITLE,a\nADD,t1,\n", 2),
            (",TITLE,a\n", 1),
        ];
        for (text, want) in cases {
            match parse_trigger_config(text) {
                Err(TriggerConfigError::Syntax { line, .. }) => assert_eq!(line, want, "{text:?}"),
                other => panic!("{text:?}: expected syntax error, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_phrase_warns_but_loads() {
        let cfg = TriggerConfig::parse("t1,TITLE, ... \nADD,t1\n").unwrap();
        assert_eq!(cfg.triggers.len(), 1);
        assert_eq!(
            cfg.warnings,
            vec![ConfigWarning::EmptyPhrase {
                line: 1,
                name: "t1".into()
            }]
        );
        assert!(!cfg.triggers[0].evaluate(&story("anything", "at all")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_trigger_config("/definitely/not/here/triggers.txt").unwrap_err();
        assert!(matches!(err, TriggerConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here/triggers.txt"));
    }

    #[serial_test::serial]
    #[test]
    fn config_path_honors_env() {
        std::env::remove_var(ENV_TRIGGER_CONFIG_PATH);
        assert_eq!(
            trigger_config_path(),
            PathBuf::from(DEFAULT_TRIGGER_CONFIG_PATH)
        );
        std::env::set_var(ENV_TRIGGER_CONFIG_PATH, "/tmp/other.txt");
        assert_eq!(trigger_config_path(), PathBuf::from("/tmp/other.txt"));
        std::env::remove_var(ENV_TRIGGER_CONFIG_PATH);
    }
}
