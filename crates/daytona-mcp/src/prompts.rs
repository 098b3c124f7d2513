//! Static prompt templates.
//!
//! Prompts never touch the network. Placeholders of the form `{name}` are
//! replaced with the matching argument.

use serde_json::{json, Map, Value};

/// A declared prompt argument.
#[derive(Debug)]
pub struct PromptArg {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// A named prompt template.
#[derive(Debug)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [PromptArg],
    pub template: &'static str,
}

/// Error rendering a prompt.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
}

/// All prompts offered by the server.
pub const PROMPTS: &[PromptTemplate] = &[
    PromptTemplate {
        name: "sandbox_assistant",
        description: "Persona for an agent that manages Daytona sandboxes.",
        arguments: &[],
        template: "You are an assistant that manages remote Daytona sandboxes. \
Use list_sandboxes to see what exists and get_sandbox_info to check a sandbox's state \
before working in it. Create sandboxes from Git repositories with create_sandbox. \
Inside a running sandbox, use execute_command to run shell commands, list_files to \
explore directories, and read_file / write_file to inspect and change files. \
Report exit codes and errors faithfully, and remove sandboxes with remove_sandbox \
once they are no longer needed.",
    },
    PromptTemplate {
        name: "explore_repository",
        description: "Create a sandbox from a repository and survey its contents.",
        arguments: &[PromptArg {
            name: "repository_url",
            description: "URL of the Git repository to explore.",
            required: true,
        }],
        template: "Create a Daytona sandbox from {repository_url} using create_sandbox. \
Wait until get_sandbox_info reports it as running. Then list the repository root with \
list_files, read the README and the build manifest with read_file, and summarise what \
the project does, how it is built, and how its tests are run.",
    },
    PromptTemplate {
        name: "run_task",
        description: "Carry out a task inside an existing sandbox.",
        arguments: &[
            PromptArg {
                name: "sandbox_id",
                description: "ID of the sandbox to work in.",
                required: true,
            },
            PromptArg {
                name: "task",
                description: "What to accomplish.",
                required: true,
            },
        ],
        template: "Work inside Daytona sandbox {sandbox_id}. Your task: {task}\n\n\
Use execute_command for shell commands and check every exit code. Use list_files and \
read_file to inspect the workspace and write_file to change it. When you are done, \
report what you changed and the output of any verification commands you ran.",
    },
];

/// Look up a prompt by name.
pub fn find(name: &str) -> Result<&'static PromptTemplate, PromptError> {
    PROMPTS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| PromptError::UnknownPrompt(name.to_string()))
}

impl PromptTemplate {
    /// Substitute arguments into the template.
    ///
    /// Optional arguments that were not supplied render as empty strings.
    pub fn render(&self, args: Option<&Map<String, Value>>) -> Result<String, PromptError> {
        let mut text = self.template.to_string();

        for arg in self.arguments {
            let value = match args.and_then(|a| a.get(arg.name)) {
                Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
                Some(Value::String(_)) | Some(Value::Null) | None => {
                    if arg.required {
                        return Err(PromptError::MissingArgument(arg.name));
                    }
                    String::new()
                }
                Some(other) => other.to_string(),
            };
            text = text.replace(&format!("{{{}}}", arg.name), &value);
        }

        Ok(text)
    }

    /// MCP `Prompt` descriptor as JSON.
    pub fn descriptor(&self) -> Value {
        let arguments: Vec<Value> = self
            .arguments
            .iter()
            .map(|a| {
                json!({
                    "name": a.name,
                    "description": a.description,
                    "required": a.required,
                })
            })
            .collect();

        json!({
            "name": self.name,
            "description": self.description,
            "arguments": arguments,
        })
    }
}
