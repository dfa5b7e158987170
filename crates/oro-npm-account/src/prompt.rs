use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};

/// Everything an auth strategy needs from the person at the keyboard.
pub trait Prompter: Send + Sync {
    fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<String>;

    fn password(&self, prompt: &str) -> io::Result<String>;

    fn open_url(&self, url: &str) -> io::Result<()>;
}

/// Interactive terminal prompts, and the system browser for URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme);
        input.with_prompt(prompt);
        if let Some(default) = default {
            input.default(default.to_owned());
        }
        input.interact()
    }

    fn password(&self, prompt: &str) -> io::Result<String> {
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .interact()
    }

    fn open_url(&self, url: &str) -> io::Result<()> {
        eprintln!("Login URL: {url}");
        open::that(url)
    }
}
