//! Parser configuration
//!
//! All options have defaults, so an empty TOML file (or none at all) yields
//! the standard behavior. Keys use kebab-case:
//!
//! ```toml
//! max-origin-span = 500
//!
//! [flatten]
//! include-commands = ["input", "include"]
//!
//! [[flatten.command-rules]]
//! name = "added"
//! arguments = 1
//! keep = 1
//!
//! [detex]
//! math-placeholder = "M"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Ranges longer than this many bytes only keep their tail when resolved.
pub const DEFAULT_MAX_ORIGIN_SPAN: usize = 1000;

/// Configuration for [`LatexParser`](crate::LatexParser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserConfig {
    pub flatten: FlattenOptions,
    pub detex: DetexOptions,
    /// Upper bound on the flat-source length of a range passed to origin
    /// resolution; longer ranges are cut down to their last bytes.
    pub max_origin_span: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            flatten: FlattenOptions::default(),
            detex: DetexOptions::default(),
            max_origin_span: DEFAULT_MAX_ORIGIN_SPAN,
        }
    }
}

impl ParserConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ParseError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Options for [`InputFlattener`](crate::InputFlattener).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FlattenOptions {
    /// Commands whose single braced argument names a file to inline.
    pub include_commands: Vec<String>,
    /// Comment that starts a region excluded from checking.
    pub pause_marker: String,
    /// Comment that ends a region started by `pause_marker`.
    pub continue_marker: String,
    /// Commands rewritten while flattening. Setting this replaces the
    /// whole default list.
    pub command_rules: Vec<CommandRule>,
}

/// Rewrites one command in the flat source.
///
/// The command, its optional star, its `[...]` options and its braced
/// arguments are removed. If `keep` names an argument, that argument's
/// content takes the command's place and is flattened like any other
/// content, so its bytes keep their file origins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandRule {
    pub name: String,
    /// Number of braced arguments the command takes.
    pub arguments: usize,
    /// One-based index of the argument kept in place of the command.
    #[serde(default)]
    pub keep: Option<usize>,
}

impl CommandRule {
    /// A command removed together with its arguments.
    pub fn dropped(name: impl Into<String>, arguments: usize) -> Self {
        CommandRule {
            name: name.into(),
            arguments,
            keep: None,
        }
    }

    /// A command replaced by its argument number `keep`.
    pub fn keeping(name: impl Into<String>, arguments: usize, keep: usize) -> Self {
        CommandRule {
            name: name.into(),
            arguments,
            keep: Some(keep),
        }
    }
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            include_commands: vec![
                "input".to_string(),
                "include".to_string(),
                "subfile".to_string(),
            ],
            pause_marker: "%%PAUSE-CHECKING".to_string(),
            continue_marker: "%%CONTINUE-CHECKING".to_string(),
            command_rules: vec![
                // changes
                CommandRule::keeping("added", 1, 1),
                CommandRule::dropped("deleted", 1),
                CommandRule::keeping("replaced", 2, 1),
                // todonotes
                CommandRule::dropped("todo", 1),
                CommandRule::dropped("missingfigure", 1),
                CommandRule::dropped("listoftodos", 0),
            ],
        }
    }
}

/// Options for [`BasicDetexer`](crate::BasicDetexer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DetexOptions {
    /// Replacement text for inline and display math.
    pub math_placeholder: String,
    /// Replacement text for `\ref` and friends.
    pub reference_placeholder: String,
    /// Replacement text for `\cite` and friends.
    pub citation_placeholder: String,
    /// Environments removed together with their content.
    pub skip_environments: Vec<String>,
    /// Environments replaced by `math_placeholder`.
    pub math_environments: Vec<String>,
}

impl Default for DetexOptions {
    fn default() -> Self {
        let strings = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        DetexOptions {
            math_placeholder: "X".to_string(),
            reference_placeholder: "0".to_string(),
            citation_placeholder: "[0]".to_string(),
            skip_environments: strings(&["verbatim", "lstlisting", "minted", "comment"]),
            math_environments: strings(&[
                "equation",
                "equation*",
                "align",
                "align*",
                "gather",
                "gather*",
                "multline",
                "multline*",
                "eqnarray",
                "eqnarray*",
                "displaymath",
                "math",
            ]),
        }
    }
}
