//! Parser for the post-request script DSL.
//!
//! One command per line:
//! - `set("name", "value")` - write an environment variable
//! - `log("message")` - print a line
//! - `assert("left == right", "message")` - fail the script unless the condition holds
//!
//! Blank lines and lines starting with `//` or `#` are ignored.

use courier_application::DispatchError;
use thiserror::Error;

/// One parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Write a variable.
    Set {
        /// Variable name
        name: String,
        /// Value template
        value: String,
    },
    /// Print a line.
    Log {
        /// Message template
        message: String,
    },
    /// Check a condition.
    Assert {
        /// Condition template
        condition: String,
        /// Failure message
        message: Option<String>,
    },
}

/// Error type for script parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown command.
    #[error("unknown command at line {line}: {name}")]
    UnknownCommand {
        /// The line number of the command.
        line: usize,
        /// The command name.
        name: String,
    },
    /// Invalid syntax.
    #[error("invalid syntax at line {line}: {message}")]
    InvalidSyntax {
        /// The line number where the error occurred.
        line: usize,
        /// The error message.
        message: String,
    },
    /// Wrong number of arguments.
    #[error("wrong arguments for {command} at line {line}: expected {expected}")]
    MissingArgument {
        /// The line number of the command.
        line: usize,
        /// The command name.
        command: String,
        /// The expected argument description.
        expected: String,
    },
}

impl From<ParseError> for DispatchError {
    fn from(err: ParseError) -> Self {
        Self::ScriptExecution(err.to_string())
    }
}

/// Parses a script into a list of commands.
///
/// # Errors
///
/// Returns an error if the script contains invalid syntax.
pub fn parse_script(script: &str) -> Result<Vec<ScriptCommand>, ParseError> {
    script
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !(line.is_empty() || line.starts_with("//") || line.starts_with('#')))
        .map(|(line_num, line)| parse_line(line, line_num))
        .collect()
}

fn parse_line(line: &str, line_num: usize) -> Result<ScriptCommand, ParseError> {
    let line = line.strip_suffix(';').unwrap_or(line).trim_end();
    let Some(paren_pos) = line.find('(') else {
        return Err(ParseError::InvalidSyntax {
            line: line_num,
            message: "expected '(' after command name".to_string(),
        });
    };

    let command_name = line[..paren_pos].trim();
    let Some(args_content) = line[paren_pos + 1..].strip_suffix(')') else {
        return Err(ParseError::InvalidSyntax {
            line: line_num,
            message: "missing closing ')'".to_string(),
        });
    };
    let mut args = parse_arguments(args_content, line_num)?.into_iter();

    let missing = |expected: &str| ParseError::MissingArgument {
        line: line_num,
        command: command_name.to_string(),
        expected: expected.to_string(),
    };

    match command_name {
        "set" => match (args.next(), args.next(), args.next()) {
            (Some(name), Some(value), None) => Ok(ScriptCommand::Set { name, value }),
            _ => Err(missing("2 arguments (name, value)")),
        },
        "log" => {
            let parts: Vec<String> = args.collect();
            if parts.is_empty() {
                return Err(missing("at least 1 argument (message)"));
            }
            Ok(ScriptCommand::Log {
                message: parts.join(", "),
            })
        }
        "assert" => match (args.next(), args.next(), args.next()) {
            (Some(condition), message, None) => Ok(ScriptCommand::Assert { condition, message }),
            _ => Err(missing("1-2 arguments (condition, optional message)")),
        },
        _ => Err(ParseError::UnknownCommand {
            line: line_num,
            name: command_name.to_string(),
        }),
    }
}

fn parse_arguments(args_str: &str, line_num: usize) -> Result<Vec<String>, ParseError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for ch in args_str.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        match (ch, quote) {
            ('\\', Some(_)) => escape_next = true,
            ('"' | '\'', None) => quote = Some(ch),
            (c, Some(q)) if c == q => quote = None,
            (',', None) => {
                let arg = current.trim().to_string();
                if !arg.is_empty() {
                    args.push(arg);
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if quote.is_some() {
        return Err(ParseError::InvalidSyntax {
            line: line_num,
            message: "unterminated string".to_string(),
        });
    }
    let arg = current.trim().to_string();
    if !arg.is_empty() {
        args.push(arg);
    }

    Ok(args)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_set() {
        let commands = parse_script(r#"set("token", "abc123")"#).unwrap();
        assert_eq!(
            commands,
            vec![ScriptCommand::Set {
                name: "token".to_string(),
                value: "abc123".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_log_keeps_commas_inside_strings() {
        let commands = parse_script(r#"log("Hello, World!");"#).unwrap();
        assert_eq!(
            commands,
            vec![ScriptCommand::Log {
                message: "Hello, World!".to_string(),
            }]
        );
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let script = r#"
            // extract the session
            # legacy comment
            set('sid', '{{$header.X-Session}}')

            log("done")
        "#;
        assert_eq!(parse_script(script).unwrap().len(), 2);
    }

    #[test]
    fn test_escaped_quotes() {
        let commands = parse_script(r#"log("He said \"hello\"")"#).unwrap();
        assert_eq!(
            commands,
            vec![ScriptCommand::Log {
                message: r#"He said "hello""#.to_string(),
            }]
        );
    }

    #[test]
    fn test_assert_with_optional_message() {
        let commands =
            parse_script("assert(\"{{$status}} == 200\", \"expected success\")\nassert(\"{{ok}}\")")
                .unwrap();
        assert_eq!(
            commands[0],
            ScriptCommand::Assert {
                condition: "{{$status}} == 200".to_string(),
                message: Some("expected success".to_string()),
            }
        );
        assert_eq!(
            commands[1],
            ScriptCommand::Assert {
                condition: "{{ok}}".to_string(),
                message: None,
            }
        );
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse_script("log(\"a\")\nunknown(\"x\")"),
            Err(ParseError::UnknownCommand {
                line: 2,
                name: "unknown".to_string(),
            })
        );
        assert!(matches!(
            parse_script("set"),
            Err(ParseError::InvalidSyntax { line: 1, .. })
        ));
        assert!(matches!(
            parse_script(r#"set("only-name")"#),
            Err(ParseError::MissingArgument { .. })
        ));
        assert!(matches!(
            parse_script(r#"log("open)"#),
            Err(ParseError::InvalidSyntax { .. })
        ));
    }
}
