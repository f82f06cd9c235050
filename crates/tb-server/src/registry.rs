//! Static command table.
//!
//! Every method the bridge serves is declared here once: its parameter
//! schema and where it routes. The registry is built at startup and never
//! mutated afterwards; registration order is the order `list_commands`
//! reports.

use std::collections::HashMap;

use serde_json::{json, Value};
use tb_types::{ProviderKey, ProviderOperation};
use thiserror::Error;

/// Parameter types the validation chain can coerce and check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    /// JSON number, or a numeric string which is coerced.
    Number,
    StringArray,
    /// String drawn from a fixed set.
    Enum(&'static [&'static str]),
}

/// Format constraints applied after type coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// `PROJ-123` style issue key
    IssueKey,
    /// Uppercase project key, e.g. `PROJ`
    ProjectKey,
    /// Uppercase space key, e.g. `DOCS`
    SpaceKey,
    /// Decimal digits only
    PageId,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub constraint: Option<Constraint>,
}

impl ParamSpec {
    pub fn required(name: &'static str, param_type: ParamType) -> Self {
        Self {
            name,
            param_type,
            required: true,
            default: None,
            constraint: None,
        }
    }

    pub fn optional(name: &'static str, param_type: ParamType) -> Self {
        Self {
            name,
            param_type,
            required: false,
            default: None,
            constraint: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }
}

/// Where a registered command routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    /// Handled by a provider strategy as one domain operation.
    Provider {
        key: ProviderKey,
        operation: ProviderOperation,
    },
    /// Answered by the dispatcher itself.
    System(SystemCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommand {
    Ping,
    Health,
    ListCommands,
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    pub params: Vec<ParamSpec>,
    /// Field names of which at least one must be present. Empty disables the
    /// rule; update commands use it so an empty update cannot reach the
    /// backend.
    pub requires_any: &'static [&'static str],
    pub target: CommandTarget,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("duplicate command registration: {0}")]
pub struct DuplicateCommand(pub String);

/// Ordered, immutable-after-startup command table.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandSpec>,
    index: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one command. Names are unique; a second registration under the
    /// same name is refused so later extensions cannot shadow existing
    /// commands silently.
    pub fn register(&mut self, spec: CommandSpec) -> Result<(), DuplicateCommand> {
        if self.index.contains_key(spec.name) {
            return Err(DuplicateCommand(spec.name.to_string()));
        }
        self.index.insert(spec.name, self.commands.len());
        self.commands.push(spec);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.index.get(name).map(|&position| &self.commands[position])
    }

    /// Command names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|spec| spec.name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// The full command surface, in the order `list_commands` reports it.
pub fn default_registry() -> Result<CommandRegistry, DuplicateCommand> {
    use CommandTarget::{Provider, System};
    use ParamType::{Number, String as Str, StringArray};
    use ProviderKey::{IssueTracker, Wiki};
    use ProviderOperation as Op;

    let mut registry = CommandRegistry::new();

    registry.register(CommandSpec {
        name: "create_issue",
        params: vec![
            ParamSpec::required("project", Str).with_constraint(Constraint::ProjectKey),
            ParamSpec::required("summary", Str),
            ParamSpec::required("issuetype", Str),
            ParamSpec::optional("description", Str),
            ParamSpec::optional("assignee", Str),
            ParamSpec::optional("labels", StringArray),
            ParamSpec::optional("epic", Str).with_constraint(Constraint::IssueKey),
        ],
        requires_any: &[],
        target: Provider {
            key: IssueTracker,
            operation: Op::Create,
        },
    })?;

    registry.register(CommandSpec {
        name: "update_issue",
        params: vec![
            ParamSpec::required("key", Str).with_constraint(Constraint::IssueKey),
            ParamSpec::optional("summary", Str),
            ParamSpec::optional("description", Str),
            ParamSpec::optional("assignee", Str),
            ParamSpec::optional("labels", StringArray),
            ParamSpec::optional("issuetype", Str),
        ],
        requires_any: &["summary", "description", "assignee", "labels", "issuetype"],
        target: Provider {
            key: IssueTracker,
            operation: Op::Update,
        },
    })?;

    registry.register(CommandSpec {
        name: "delete_issue",
        params: vec![ParamSpec::required("key", Str).with_constraint(Constraint::IssueKey)],
        requires_any: &[],
        target: Provider {
            key: IssueTracker,
            operation: Op::Delete,
        },
    })?;

    registry.register(CommandSpec {
        name: "create_subtask",
        params: vec![
            ParamSpec::required("parentKey", Str).with_constraint(Constraint::IssueKey),
            ParamSpec::required("summary", Str),
            ParamSpec::required("issuetype", Str),
            ParamSpec::optional("description", Str),
            ParamSpec::optional("assignee", Str),
            ParamSpec::optional("labels", StringArray),
        ],
        requires_any: &[],
        target: Provider {
            key: IssueTracker,
            operation: Op::Create,
        },
    })?;

    registry.register(CommandSpec {
        name: "search_issues",
        params: vec![
            ParamSpec::required("project", Str).with_constraint(Constraint::ProjectKey),
            ParamSpec::optional("epic", Str).with_constraint(Constraint::IssueKey),
            ParamSpec::optional("assignee", Str),
            ParamSpec::optional("status", Str),
            ParamSpec::optional("issuetype", Str),
            ParamSpec::optional("maxResults", Number).with_default(json!(50)),
        ],
        requires_any: &[],
        target: Provider {
            key: IssueTracker,
            operation: Op::Search,
        },
    })?;

    registry.register(CommandSpec {
        name: "debug_issue_provider",
        params: vec![],
        requires_any: &[],
        target: Provider {
            key: IssueTracker,
            operation: Op::Debug,
        },
    })?;

    registry.register(CommandSpec {
        name: "create_page",
        params: vec![
            ParamSpec::required("space", Str).with_constraint(Constraint::SpaceKey),
            ParamSpec::required("title", Str),
            ParamSpec::required("content", Str),
            ParamSpec::optional("parent", Str).with_constraint(Constraint::PageId),
        ],
        requires_any: &[],
        target: Provider {
            key: Wiki,
            operation: Op::Create,
        },
    })?;

    registry.register(CommandSpec {
        name: "update_page",
        params: vec![
            ParamSpec::required("pageId", Str).with_constraint(Constraint::PageId),
            ParamSpec::optional("title", Str),
            ParamSpec::optional("content", Str),
            ParamSpec::optional("space", Str).with_constraint(Constraint::SpaceKey),
        ],
        requires_any: &["title", "content", "space"],
        target: Provider {
            key: Wiki,
            operation: Op::Update,
        },
    })?;

    registry.register(CommandSpec {
        name: "delete_page",
        params: vec![ParamSpec::required("pageId", Str).with_constraint(Constraint::PageId)],
        requires_any: &[],
        target: Provider {
            key: Wiki,
            operation: Op::Delete,
        },
    })?;

    registry.register(CommandSpec {
        name: "search_pages",
        params: vec![
            ParamSpec::required("space", Str).with_constraint(Constraint::SpaceKey),
            ParamSpec::optional("title", Str),
            ParamSpec::optional("limit", Number).with_default(json!(50)),
        ],
        requires_any: &[],
        target: Provider {
            key: Wiki,
            operation: Op::Search,
        },
    })?;

    registry.register(CommandSpec {
        name: "search_pages_by_parent",
        params: vec![
            ParamSpec::required("parentId", Str).with_constraint(Constraint::PageId),
            ParamSpec::optional("limit", Number).with_default(json!(50)),
        ],
        requires_any: &[],
        target: Provider {
            key: Wiki,
            operation: Op::SearchByParent,
        },
    })?;

    registry.register(CommandSpec {
        name: "debug_wiki_provider",
        params: vec![],
        requires_any: &[],
        target: Provider {
            key: Wiki,
            operation: Op::Debug,
        },
    })?;

    registry.register(CommandSpec {
        name: "ping",
        params: vec![],
        requires_any: &[],
        target: System(SystemCommand::Ping),
    })?;

    registry.register(CommandSpec {
        name: "health",
        params: vec![],
        requires_any: &[],
        target: System(SystemCommand::Health),
    })?;

    registry.register(CommandSpec {
        name: "list_commands",
        params: vec![],
        requires_any: &[],
        target: System(SystemCommand::ListCommands),
    })?;

    Ok(registry)
}
