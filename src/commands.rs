use crate::utils;

pub const PROMPT_USER: &str = "guest";
pub const PROMPT_HOST: &str = "nicojpeg.tech";
pub const GALLERY_PATH: &str = "/photography/";
pub const TOUSEND_URL: &str = "https://tousend.me";
pub const REDIRECT_DELAY_MS: u32 = 650;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    About,
    Projects,
    Photography,
    Links,
    Contact,
    Clear,
    Help,
    Home,
    Tousend,
    Skibidi,
}

pub struct CommandDefinition {
    pub command: Command,
    /// Row text for `help`; hidden commands have none.
    pub help: Option<&'static str>,
}

/// Every command, in `help` order with the hidden ones last.
pub const COMMAND_DEFINITIONS: &[CommandDefinition] = &[
    CommandDefinition {
        command: Command::About,
        help: Some("Show about section"),
    },
    CommandDefinition {
        command: Command::Projects,
        help: Some("Show projects portfolio"),
    },
    CommandDefinition {
        command: Command::Photography,
        help: Some("Show photography section"),
    },
    CommandDefinition {
        command: Command::Links,
        help: Some("Show saved links/bookmarks"),
    },
    CommandDefinition {
        command: Command::Contact,
        help: Some("Show contact information"),
    },
    CommandDefinition {
        command: Command::Home,
        help: Some("Show banner again"),
    },
    CommandDefinition {
        command: Command::Clear,
        help: Some("Clear the screen"),
    },
    CommandDefinition {
        command: Command::Help,
        help: Some("Show this help"),
    },
    CommandDefinition {
        command: Command::Tousend,
        help: None,
    },
    CommandDefinition {
        command: Command::Skibidi,
        help: None,
    },
];

impl Command {
    pub const fn name(self) -> &'static str {
        match self {
            Command::About => "about",
            Command::Projects => "projects",
            Command::Photography => "photography",
            Command::Links => "links",
            Command::Contact => "contact",
            Command::Clear => "clear",
            Command::Help => "help",
            Command::Home => "home",
            Command::Tousend => "tousend",
            Command::Skibidi => "skibidi",
        }
    }

    pub fn lookup(input: &str) -> Option<Command> {
        let normalized = input.trim().to_lowercase();
        COMMAND_DEFINITIONS
            .iter()
            .find(|def| def.command.name() == normalized)
            .map(|def| def.command)
    }

    pub fn page_path(self) -> String {
        format!("/{}/", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    Clear,
    OutputHtml { html: String, kind: BlockKind },
    FetchSection { command: Command, path: String },
    Redirect { notice: String, url: &'static str },
    StartSkibidi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Section,
    Help,
    Photography,
    Redirect,
    Error,
    Skibidi,
}

impl BlockKind {
    pub fn class_name(self) -> &'static str {
        match self {
            BlockKind::Section => "command-result section-block",
            BlockKind::Skibidi => "command-result skibidi-eggs skibidi-box",
            BlockKind::Help | BlockKind::Photography | BlockKind::Redirect | BlockKind::Error => {
                "command-result"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("command not found: {command}")]
    NotFound { command: String },
    #[error("Error loading {path}: {message}")]
    Fetch { path: String, message: String },
    #[error("No content block found for {command}")]
    MissingSection { command: String },
}

impl CommandError {
    pub fn to_html(&self) -> String {
        format!(
            "<div class='error'>{}</div>",
            utils::escape_html(&self.to_string())
        )
    }
}

pub fn command_names() -> Vec<&'static str> {
    COMMAND_DEFINITIONS
        .iter()
        .map(|def| def.command.name())
        .collect()
}

pub fn autocomplete(prefix: &str) -> Option<&'static str> {
    if prefix.is_empty() {
        return None;
    }
    let lower = prefix.to_lowercase();
    let mut matches = command_names()
        .into_iter()
        .filter(|name| name.starts_with(&lower));
    let first = matches.next()?;
    if matches.next().is_none() {
        Some(first)
    } else {
        None
    }
}

pub fn execute(line: &str) -> Result<CommandAction, CommandError> {
    let command = Command::lookup(line).ok_or_else(|| CommandError::NotFound {
        command: line.trim().to_lowercase(),
    })?;

    let action = match command {
        Command::Clear | Command::Home => CommandAction::Clear,
        Command::Help => CommandAction::OutputHtml {
            html: render_help(),
            kind: BlockKind::Help,
        },
        // The gallery is its own page; the terminal only links to it.
        Command::Photography => CommandAction::OutputHtml {
            html: render_gallery_link(),
            kind: BlockKind::Photography,
        },
        Command::About | Command::Projects | Command::Links | Command::Contact => {
            CommandAction::FetchSection {
                command,
                path: command.page_path(),
            }
        }
        Command::Tousend => CommandAction::Redirect {
            notice: render_redirect_notice(TOUSEND_URL, "tousend.me"),
            url: TOUSEND_URL,
        },
        Command::Skibidi => CommandAction::StartSkibidi,
    };
    Ok(action)
}

pub fn render_prompt(command_text: &str) -> String {
    let mut html = format!(
        "<p><span class=\"grey\">{PROMPT_USER}</span><span class=\"dark\">@</span><span class=\"green\">{PROMPT_HOST}</span><span class=\"dark\">:$ ~</span> "
    );
    if !command_text.is_empty() {
        html.push_str(&format!(
            "<span class='grey'>{}</span>",
            utils::escape_html(command_text)
        ));
    }
    html.push_str("</p>");
    html
}

fn render_help() -> String {
    let rows: Vec<String> = COMMAND_DEFINITIONS
        .iter()
        .filter_map(|def| {
            def.help
                .map(|text| format!("{:14}{}", def.command.name(), text))
        })
        .collect();
    format!(
        "<div class='help'>\n  <span class='green'>Available commands</span>\n<pre class=\"help-block\">{}</pre></div>",
        rows.join("\n")
    )
}

fn render_gallery_link() -> String {
    format!(
        "<div class='photography-link line'>Open photography gallery: <a class='green' href='{GALLERY_PATH}' rel='noopener'>{GALLERY_PATH}</a></div>"
    )
}

fn render_redirect_notice(url: &str, label: &str) -> String {
    format!(
        "<div class='line'>Opening <a class='green' href='{}' target='_blank' rel='noopener'>{}</a> ...</div>",
        utils::escape_html(url),
        utils::escape_html(label)
    )
}
