use media_catalog_core::Prompt;
use std::io::{self, Write};
use std::path::PathBuf;

/// Answers catalog questions from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        prompt_confirm(question, Some(true)).unwrap_or(false)
    }

    fn choose_folder(&self, question: &str) -> Option<PathBuf> {
        prompt_path(question).ok().flatten()
    }
}

pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

/// Reads a directory path, re-asking until it names an existing directory.
/// An empty answer gives `None`.
pub fn prompt_path(prompt: &str) -> io::Result<Option<PathBuf>> {
    let mut input = String::new();

    loop {
        input.clear();
        print!("{}: ", prompt);
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }

        let answer = input.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        let path = PathBuf::from(answer);
        if path.is_dir() {
            return Ok(Some(path));
        }
        println!("Not a directory: {}", answer);
    }
}
