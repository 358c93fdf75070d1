//! Operator chat command parser.
//!
//! A line is a command when its first whitespace-delimited token is one of
//! the directives below, compared case-insensitively. The second token is the
//! target booking identifier.

use scm_shared::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Close,
    Pending,
    Cancel,
    Delete,
}

impl Directive {
    pub const ALL: [Directive; 4] = [
        Directive::Close,
        Directive::Pending,
        Directive::Cancel,
        Directive::Delete,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Directive::Close => "/CLOSE",
            Directive::Pending => "/PENDING",
            Directive::Cancel => "/CANCEL",
            Directive::Delete => "/DELETE",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Directive::ALL
            .into_iter()
            .find(|d| d.token().eq_ignore_ascii_case(token))
    }

    /// Status the booking moves to, or `None` when the directive removes it.
    pub fn target_status(&self) -> Option<JobStatus> {
        match self {
            Directive::Close => Some(JobStatus::Close),
            Directive::Pending => Some(JobStatus::Pending),
            Directive::Cancel | Directive::Delete => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Plain conversation, stored without side effects.
    Chat,
    Command { directive: Directive, target: String },
    MissingTarget(Directive),
    UnknownDirective(String),
}

pub fn parse(line: &str) -> ChatInput {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return ChatInput::Chat;
    };

    if let Some(directive) = Directive::from_token(first) {
        return match tokens.next() {
            Some(target) => ChatInput::Command {
                directive,
                target: target.to_uppercase(),
            },
            None => ChatInput::MissingTarget(directive),
        };
    }

    if first.starts_with('/') {
        return ChatInput::UnknownDirective(first.to_uppercase());
    }

    ChatInput::Chat
}
