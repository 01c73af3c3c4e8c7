//! User prompting implementation

use anyhow::Result;
use async_trait::async_trait;
use std::io::{self, Write};

/// Trait for user prompting
#[async_trait]
pub trait UserPrompter: Send + Sync {
    /// Prompt for yes/no confirmation
    async fn prompt_yes_no(&self, message: &str) -> Result<bool>;

    /// Prompt for text input
    async fn prompt_text(&self, message: &str, default: Option<&str>) -> Result<String>;

    /// Prompt for choice from list
    async fn prompt_choice(&self, message: &str, choices: &[String]) -> Result<usize>;
}

/// Real implementation of user prompter
pub struct UserPrompterImpl;

impl Default for UserPrompterImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl UserPrompterImpl {
    pub fn new() -> Self {
        Self
    }

    fn read_line() -> Result<String> {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Validate and parse a choice input
    /// Returns Some(index) if valid, None if invalid
    pub fn validate_choice_input(input: &str, num_choices: usize) -> Option<usize> {
        if num_choices == 0 {
            return None;
        }

        input.parse::<usize>().ok().and_then(|num| {
            if num > 0 && num <= num_choices {
                Some(num - 1)
            } else {
                None
            }
        })
    }

    /// Format choice prompt message
    pub fn format_choice_prompt(message: &str, choices: &[String]) -> String {
        let mut output = String::new();
        output.push_str(message);
        output.push('\n');
        for (i, choice) in choices.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, choice));
        }
        output
    }

    /// Format choice input prompt
    pub fn format_choice_input_prompt(num_choices: usize) -> String {
        format!("Enter choice (1-{num_choices}): ")
    }

    /// Format invalid choice message  
    pub fn format_invalid_choice_message(num_choices: usize) -> String {
        format!("Invalid choice. Please enter a number between 1 and {num_choices}: ")
    }
}

#[async_trait]
impl UserPrompter for UserPrompterImpl {
    async fn prompt_yes_no(&self, message: &str) -> Result<bool> {
        print!("{} [Y/n]: ", message);
        io::stdout().flush()?;

        let input = Self::read_line()?;
        let input = input.to_lowercase();

        Ok(input.is_empty() || input == "y" || input == "yes")
    }

    async fn prompt_text(&self, message: &str, default: Option<&str>) -> Result<String> {
        if let Some(default_value) = default {
            print!("{message} [{default_value}]: ");
        } else {
            print!("{message}: ");
        }
        io::stdout().flush()?;

        let input = Self::read_line()?;

        if input.is_empty() {
            if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Ok(input)
            }
        } else {
            Ok(input)
        }
    }

    async fn prompt_choice(&self, message: &str, choices: &[String]) -> Result<usize> {
        if choices.is_empty() {
            anyhow::bail!("No choices provided");
        }

        print!("{}", Self::format_choice_prompt(message, choices));
        print!("{}", Self::format_choice_input_prompt(choices.len()));
        io::stdout().flush()?;

        loop {
            let input = Self::read_line()?;
            if let Some(index) = Self::validate_choice_input(&input, choices.len()) {
                return Ok(index);
            }
            print!("{}", Self::format_invalid_choice_message(choices.len()));
            io::stdout().flush()?;
        }
    }
}
