//! Interactive wizard facade. The first-boot scripts talk to this instead of
//! driving the prompt toolkit directly: every prompt runs inside a retry loop
//! that turns an interrupt (Ctrl-C / Esc) into a "Do you really want to
//! quit?" confirmation, and validation failures into an error box plus
//! re-prompt.
//!
//! Set `DIALOG_DEBUG` to trace every prompt and outcome (password values are
//! redacted).

use std::io;

use dialoguer::console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use thiserror::Error;

use crate::validate::{password_complexity, EMAIL_RE};

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of a prompt that offers a cancel/skip label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    Value(String),
    Cancelled,
}

pub struct Dialog {
    backtitle: String,
    width: usize,
    theme: ColorfulTheme,
    term: Term,
}

impl Dialog {
    pub fn new(backtitle: &str) -> Self {
        Self {
            backtitle: backtitle.to_string(),
            width: 60,
            theme: ColorfulTheme::default(),
            term: Term::stderr(),
        }
    }

    /// Wrap `text` at the dialog width, preserving explicit line breaks.
    fn wrap(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for line in text.lines() {
            if line.len() <= self.width {
                lines.push(line.to_string());
                continue;
            }
            let mut current = String::new();
            for word in line.split(' ') {
                if !current.is_empty() && current.len() + 1 + word.len() > self.width {
                    lines.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }
        lines
    }

    fn render(&self, title: Option<&str>, text: &str) -> Result<(), DialogError> {
        self.term.write_line("")?;
        self.term
            .write_line(&style(&self.backtitle).dim().to_string())?;
        if let Some(title) = title {
            self.term
                .write_line(&style(title).bold().to_string())?;
        }
        for line in self.wrap(text) {
            self.term.write_line(&line)?;
        }
        Ok(())
    }

    /// Run one prompt, mapping an interrupt to the quit confirmation. Any
    /// other failure is rendered and re-prompted, matching the behavior of
    /// the toolkit wrapper this replaces.
    fn attempt<T>(
        &self,
        what: &str,
        mut f: impl FnMut() -> Result<T, dialoguer::Error>,
    ) -> Result<T, DialogError> {
        loop {
            match f() {
                Ok(v) => {
                    tracing::debug!(dialog = what, "prompt completed");
                    return Ok(v);
                }
                Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => {
                    tracing::debug!(dialog = what, "prompt interrupted");
                    if self.confirm_quit()? {
                        std::process::exit(0);
                    }
                }
                Err(dialoguer::Error::IO(err)) => {
                    tracing::error!(dialog = what, %err, "prompt failed");
                    self.error(&format!("Caught exception\n\n{err}"))?;
                }
            }
        }
    }

    fn confirm_quit(&self) -> Result<bool, DialogError> {
        match Confirm::with_theme(&self.theme)
            .with_prompt("Do you really want to quit?")
            .default(false)
            .interact_on(&self.term)
        {
            Ok(answer) => Ok(answer),
            // interrupted twice: take the hint
            Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => Ok(true),
            Err(dialoguer::Error::IO(err)) => Err(DialogError::Io(err)),
        }
    }

    pub fn error(&self, text: &str) -> Result<(), DialogError> {
        self.msgbox("Error", text)
    }

    /// Message box: render and wait for acknowledgement.
    pub fn msgbox(&self, title: &str, text: &str) -> Result<(), DialogError> {
        tracing::debug!(title, "msgbox");
        self.render(Some(title), text)?;
        self.term
            .write_line(&style("[ press Enter to continue ]").dim().to_string())?;
        self.term.read_line()?;
        Ok(())
    }

    /// Progress note with no interaction.
    pub fn infobox(&self, text: &str) -> Result<(), DialogError> {
        tracing::debug!(text, "infobox");
        self.render(None, text)
    }

    /// Free-text input. An empty answer maps to `Cancelled` when a cancel
    /// label is offered, otherwise it is returned as-is and the caller
    /// decides (the `get_*` helpers re-prompt).
    pub fn inputbox(
        &self,
        title: &str,
        text: &str,
        init: &str,
        ok_label: &str,
        cancel_label: &str,
    ) -> Result<InputResult, DialogError> {
        tracing::debug!(title, init, ok_label, cancel_label, "inputbox");
        self.render(Some(title), text)?;
        let prompt = if cancel_label.is_empty() {
            ok_label.to_string()
        } else {
            format!("{ok_label} (empty = {cancel_label})")
        };
        let value = self.attempt("inputbox", || {
            Input::<String>::with_theme(&self.theme)
                .with_prompt(prompt.as_str())
                .allow_empty(true)
                .with_initial_text(init)
                .interact_text_on(&self.term)
        })?;

        if value.is_empty() && !cancel_label.is_empty() {
            return Ok(InputResult::Cancelled);
        }
        Ok(InputResult::Value(value))
    }

    pub fn yesno(
        &self,
        title: &str,
        text: &str,
        yes_label: &str,
        no_label: &str,
    ) -> Result<bool, DialogError> {
        self.render(Some(title), text)?;
        let answer = self.attempt("yesno", || {
            Confirm::with_theme(&self.theme)
                .with_prompt(format!("{yes_label}? (no = {no_label})"))
                .default(true)
                .interact_on(&self.term)
        })?;
        tracing::debug!(title, yes_label, no_label, answer, "yesno");
        Ok(answer)
    }

    /// Menu of `(tag, description)` choices; returns the selected tag.
    pub fn menu(
        &self,
        title: &str,
        text: &str,
        choices: &[(&str, &str)],
    ) -> Result<String, DialogError> {
        tracing::debug!(title, choices = choices.len(), "menu");
        self.render(Some(title), text)?;
        let items: Vec<String> = choices
            .iter()
            .map(|(tag, item)| format!("{tag}  {item}"))
            .collect();
        let index = self.attempt("menu", || {
            Select::with_theme(&self.theme)
                .with_prompt(title)
                .items(&items)
                .default(0)
                .interact_on(&self.term)
        })?;
        Ok(choices[index].0.to_string())
    }

    /// Prompt for a password until it satisfies the requirements and is
    /// entered identically twice.
    pub fn get_password(
        &self,
        title: &str,
        text: &str,
        pass_req: usize,
        min_complexity: u8,
        blacklist: &[char],
    ) -> Result<String, DialogError> {
        let mut req_string = format!(
            "\nPassword Requirements\n - must be at least {pass_req} characters long\n \
             - must contain characters from at least {min_complexity} of the following \
             categories: uppercase, lowercase, numbers, symbols"
        );
        if !blacklist.is_empty() {
            req_string.push_str(&format!(
                ". Also must NOT contain these characters: {blacklist:?}"
            ));
        }

        self.render(Some(title), &format!("{text}{req_string}"))?;

        loop {
            let password = self.attempt("passwordbox", || {
                Password::with_theme(&self.theme)
                    .with_prompt(title)
                    .allow_empty_password(true)
                    .interact_on(&self.term)
            })?;
            tracing::debug!(len = password.len(), "password entered");

            if password.is_empty() {
                self.error("Please enter non-empty password!")?;
                continue;
            }
            if password.chars().count() < pass_req {
                self.error(&format!(
                    "Password must be at least {pass_req} characters."
                ))?;
                continue;
            }
            if password_complexity(&password) < min_complexity {
                if min_complexity <= 3 {
                    self.error(
                        "Insecure password! Mix uppercase, lowercase, and at least \
                         one number. Multiple words and punctuation are highly \
                         recommended but not strictly required.",
                    )?;
                } else {
                    self.error(
                        "Insecure password! Mix uppercase, lowercase, numbers and at \
                         least one special/punctuation character. Multiple words are \
                         highly recommended but not strictly required.",
                    )?;
                }
                continue;
            }
            let found: Vec<char> = blacklist
                .iter()
                .copied()
                .filter(|c| password.contains(*c))
                .collect();
            if !found.is_empty() {
                self.error(&format!(
                    "Password can NOT include these characters: {blacklist:?}. \
                     Found {found:?}"
                ))?;
                continue;
            }

            let confirm = self.attempt("passwordbox", || {
                Password::with_theme(&self.theme)
                    .with_prompt("Confirm password")
                    .allow_empty_password(true)
                    .interact_on(&self.term)
            })?;
            if password == confirm {
                return Ok(password);
            }
            self.error("Password mismatch, please try again.")?;
        }
    }

    /// Prompt for an email address until it looks valid.
    pub fn get_email(&self, title: &str, text: &str, init: &str) -> Result<String, DialogError> {
        tracing::debug!(title, init, "get_email");
        loop {
            let email = match self.inputbox(title, text, init, "Apply", "")? {
                InputResult::Value(email) => email,
                InputResult::Cancelled => String::new(),
            };
            tracing::debug!(email, "get_email answer");
            if email.is_empty() {
                self.error("Email is required.")?;
                continue;
            }
            if !EMAIL_RE.is_match(&email) {
                self.error("Email is not valid")?;
                continue;
            }
            return Ok(email);
        }
    }

    /// Prompt until a non-empty answer is given.
    pub fn get_input(&self, title: &str, text: &str, init: &str) -> Result<String, DialogError> {
        loop {
            let value = match self.inputbox(title, text, init, "Apply", "")? {
                InputResult::Value(value) => value,
                InputResult::Cancelled => String::new(),
            };
            if value.is_empty() {
                self.error(&format!("{title} is required."))?;
                continue;
            }
            return Ok(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width_and_line_breaks() {
        let d = Dialog::new("backtitle");
        let lines = d.wrap("short line\nanother");
        assert_eq!(lines, vec!["short line".to_string(), "another".to_string()]);

        let long = "word ".repeat(30);
        for line in d.wrap(long.trim_end()) {
            assert!(line.len() <= 60, "line too long: {line:?}");
        }
    }

    #[test]
    fn wrap_keeps_oversized_words_whole() {
        let d = Dialog::new("backtitle");
        let word = "x".repeat(80);
        assert_eq!(d.wrap(&word), vec![word]);
    }
}
