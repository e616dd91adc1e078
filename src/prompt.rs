use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Narrow interface to the interactive front-end. The engine never talks to
/// stdin/stdout directly, so tests can script every answer.
pub trait Prompter {
    /// Free-text input. With a default, an empty entry returns the default;
    /// without one, an empty entry stays empty (callers treat that as a
    /// deliberate skip).
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Picks one of `choices` by number. Empty entry selects `default`.
    fn select(&mut self, message: &str, choices: &[&str], default: usize) -> Result<usize>;
}

/// Stdin/stdout prompter for attended runs.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl Prompter for ConsolePrompter {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) if !default.is_empty() => print!("{} [{}] ", message, default),
            _ => print!("{} ", message),
        }
        io::stdout().flush()?;
        let entry = self.read_line()?;
        if entry.is_empty() {
            if let Some(default) = default {
                return Ok(default.to_string());
            }
        }
        Ok(entry)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            print!("{} ({}) ", message, hint);
            io::stdout().flush()?;
            let entry = self.read_line()?.to_lowercase();
            match entry.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("Please answer y or n."),
            }
        }
    }

    fn select(&mut self, message: &str, choices: &[&str], default: usize) -> Result<usize> {
        println!("{}", message);
        for (index, choice) in choices.iter().enumerate() {
            println!("  {}) {}", index + 1, choice);
        }
        loop {
            print!("Choice [{}] ", default + 1);
            io::stdout().flush()?;
            let entry = self.read_line()?;
            if entry.is_empty() {
                return Ok(default);
            }
            match entry.parse::<usize>() {
                Ok(number) if number >= 1 && number <= choices.len() => return Ok(number - 1),
                _ => println!("Enter a number between 1 and {}.", choices.len()),
            }
        }
    }
}
