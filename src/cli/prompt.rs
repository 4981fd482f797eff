//! # Prompts
//!
//! Every question the menus ask goes through [`Prompter`]. The rich
//! implementation renders with `dialoguer`; the plain one prints numbered
//! choices and reads lines, so it works over pipes and in tests.

use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::io::{self, BufRead, IsTerminal, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Input stream closed.")]
    Closed,
    #[error("Prompt failed: {0}")]
    Dialog(#[from] dialoguer::Error),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub type PromptResult<T> = Result<T, PromptError>;

pub trait Prompter {
    /// Picks one of `items`. `None` means the user backed out.
    fn select(&mut self, prompt: &str, items: &[String], default: usize)
    -> PromptResult<Option<usize>>;

    /// Reads a line of text. An empty answer yields `default`, or `""`.
    fn input(&mut self, prompt: &str, default: Option<&str>) -> PromptResult<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> PromptResult<bool>;
}

/// Whether both stdin and stdout are attached to a terminal.
pub fn has_terminal() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for DialoguerPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> PromptResult<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default.min(items.len() - 1))
            .interact_opt()?)
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> PromptResult<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> PromptResult<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

/// Numbered-text prompts over any reader and writer.
///
/// Selections accept the item number, `0` or `q` to back out, or an empty line
/// for the default. Anything else prints a notice and asks again.
pub struct PlainPrompter<R, W> {
    reader: R,
    writer: W,
    invalid_notice: String,
}

impl PlainPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PlainPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            invalid_notice: "Invalid choice, try again.".to_string(),
        }
    }

    /// Replaces the message printed after an unusable answer.
    pub fn with_invalid_notice(mut self, notice: impl Into<String>) -> Self {
        self.invalid_notice = notice.into();
        self
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn read_answer(&mut self) -> PromptResult<String> {
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim().to_string())
    }

    fn notice(&mut self) -> PromptResult<()> {
        writeln!(self.writer, "{}", self.invalid_notice)?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for PlainPrompter<R, W> {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> PromptResult<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }
        let default = default.min(items.len() - 1);
        loop {
            writeln!(self.writer, "{}", prompt)?;
            for (i, item) in items.iter().enumerate() {
                writeln!(self.writer, "  {}) {}", i + 1, item)?;
            }
            write!(self.writer, "[{}]> ", default + 1)?;

            let answer = self.read_answer()?;
            if answer.is_empty() {
                return Ok(Some(default));
            }
            if answer.eq_ignore_ascii_case("q") || answer == "0" {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=items.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => self.notice()?,
            }
        }
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> PromptResult<String> {
        match default {
            Some(d) => write!(self.writer, "{} [{}]: ", prompt, d)?,
            None => write!(self.writer, "{}: ", prompt)?,
        }
        let answer = self.read_answer()?;
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> PromptResult<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.writer, "{} [{}]: ", prompt, hint)?;
            let answer = self.read_answer()?.to_lowercase();
            match answer.as_str() {
                "" => return Ok(default),
                "y" | "yes" | "s" | "si" | "sí" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.notice()?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> PlainPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        PlainPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn items() -> Vec<String> {
        vec!["Run task".into(), "Run profile".into(), "Exit".into()]
    }

    #[test]
    fn test_select_reprompts_on_malformed_input() {
        let mut p = prompter("abc\n7\n2\n").with_invalid_notice("Nope");
        assert_eq!(p.select("Menu", &items(), 0).unwrap(), Some(1));
        let out = String::from_utf8(p.into_writer()).unwrap();
        assert_eq!(out.matches("Nope").count(), 2);
        assert!(out.contains("  3) Exit"));
    }

    #[test]
    fn test_select_default_and_back_out() {
        let mut p = prompter("\nq\n");
        assert_eq!(p.select("Menu", &items(), 2).unwrap(), Some(2));
        assert_eq!(p.select("Menu", &items(), 0).unwrap(), None);
    }

    #[test]
    fn test_input_uses_default_on_empty_line() {
        let mut p = prompter("\n  vim  \n");
        assert_eq!(p.input("Name", Some("git")).unwrap(), "git");
        assert_eq!(p.input("Name", None).unwrap(), "vim");
    }

    #[test]
    fn test_confirm_accepts_spanish_yes_and_reprompts() {
        let mut p = prompter("maybe\nsí\n\n");
        assert!(p.confirm("Delete?", false).unwrap());
        assert!(!p.confirm("Delete?", false).unwrap());
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut p = prompter("");
        assert!(matches!(p.input("Name", None), Err(PromptError::Closed)));
    }
}
