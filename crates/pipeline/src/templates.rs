//! Fixed prompt text.
//!
//! [`SYSTEM_FRAMING`] and [`TASK_FRAMING`] are program constants sent with every
//! completion. [`DIRECTIVE_GENERATOR`] is only the *default* directive template;
//! the active one lives in [`crate::Configuration`] and is user-editable.

/// System message: capability framing.
pub const SYSTEM_FRAMING: &str =
    "You are an artificial intelligence natural language template transformation executor.";

/// First user message: task framing instructions.
pub const TASK_FRAMING: &str = "You are tasked with creating a new document from the following markdown AI execution template. You are to read the template and follow its instructions. Instructions for performing the task are provided in the template. Read the question, perform the task, and provide your answer IN MARKDOWN.";

/// Default meta-template that turns a task description into a directive.
pub const DIRECTIVE_GENERATOR: &str = r#"# Build a Directive to accomplish the given Task

_.Build a Directive to accomplish the task outlined at the end of this document._

## Required Inputs

ONLY generate the directive if the following inputs are provided along with the task. If any of the following inputs are not provided, the task should fail.:

  * `name` - The name of the directive
  * `description` - A description of the directive

## Optional Inputs

  * `author` - The author of the directive
  * `version` - The version of the directive
  * `license` - The license of the directive
  * `tags` - A list of tags to associate with the directive
  * `parameters` - A list of parameters to associate with the directive
  * `output` - A list of outputs to associate with the directive
  * `dependencies` - A list of dependencies to associate with the directive
  * `examples` - A list of examples to associate with the directive

## Output

A directive, formatted in Markdown, which when executed by a LLM along with the appropriate inputs, will accomplish the task outlined at the end of this document. The directive must contain the following information:

    * `name` - The name of the directive
    * `description` - A description of the directive
    * `author` - The author of the directive
    * `version` - The version of the directive
    * `tags` - A list of tags to associate with the directive
    * `parameters` - A list of parameters to associate with the directive
    * `output` - A list of outputs to associate with the directive
    * `dependencies` - A list of dependencies to associate with the directive
    * `examples` - A list of examples to associate with the directive

The Directive must contain the following sections:

    * `Description` - A description of the directive
    * `Parameters` - A list of parameters to associate with the directive
    * `Output` - A list of outputs to associate with the directive
    * `Dependencies` - A list of dependencies to associate with the directive
    * `Examples` - A list of examples to associate with the directive

## Task

"#;

/// Sections every generated directive must contain.
pub const DIRECTIVE_SECTIONS: [&str; 5] =
    ["Description", "Parameters", "Output", "Dependencies", "Examples"];

/// Builds the payload for directive generation: template, newline, task text.
pub fn directive_payload(template: &str, task: &str) -> String {
    format!("{template}\n{task}")
}
