use nu_ansi_term::{
    Color::{Cyan, Green, Red},
    Style,
};

/// Writes user facing messages to the console. Log records go through tracing instead, this is
/// only for what the user is meant to read (or copy) after a run.
#[derive(Clone, Copy, Debug)]
pub struct Console {
    ansi_colours: bool,
}

impl Console {
    /// Create a console printer. With `ansi_colours` unset everything is printed as plain text.
    pub fn new(ansi_colours: bool) -> Self {
        Self { ansi_colours }
    }

    /// Print info on console.
    pub fn info(&self, message: &str) {
        println!("{}", self.paint(Cyan.bold().italic(), message));
    }

    /// Print a shell command, surrounded by blank lines so that it's easy to pick out.
    pub fn command<S>(&self, words: &[S])
    where
        S: AsRef<str>,
    {
        println!();
        println!("{}", self.render_command(words));
        println!();
    }

    /// Print an error on the standard error stream.
    pub fn error(&self, message: &str, data: &str) {
        eprintln!(
            "{} \n {} ",
            self.paint(Cyan.bold().italic(), message),
            self.paint(Red.bold().italic(), data)
        );
    }

    /// Joins the command words with single spaces and styles the result.
    pub fn render_command<S>(&self, words: &[S]) -> String
    where
        S: AsRef<str>,
    {
        let line = words
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" ");
        self.paint(Green.bold(), line.as_str())
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.ansi_colours {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::Console;

    #[test]
    fn plain_command_is_space_separated() {
        let console = Console::new(false);
        assert_eq!(
            console.render_command(&["helm", "install", "web", "web-0.1.0.tgz"]),
            "helm install web web-0.1.0.tgz"
        );
    }

    #[test]
    fn coloured_command_carries_escape_codes() {
        let console = Console::new(true);
        let rendered = console.render_command(&["helm", "install"]);
        assert!(rendered.starts_with('\u{1b}'));
        assert!(rendered.contains("helm install"));
    }
}
