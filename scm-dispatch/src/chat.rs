//! Operations group chat: operator lines and slash commands.

use scm_core::command::{self, ChatInput, Directive};
use scm_core::message;
use scm_core::{CoreError, CoreResult};
use scm_shared::models::notification::new_notification_id;
use scm_shared::{Correlation, Notification};
use tracing::{info, warn};

use crate::service::{DispatchService, Outcome};

impl DispatchService {
    /// Store the operator's line, then carry out any command in it.
    ///
    /// Returns the notifications this line produced, operator line first.
    /// Command failures (unknown id, missing id, unknown directive) become
    /// bot replies rather than errors; only store failures are errors.
    pub async fn handle_chat(&self, line: &str) -> CoreResult<Outcome<Vec<Notification>>> {
        if line.trim().is_empty() {
            return Err(CoreError::ValidationError("Message cannot be empty".to_string()));
        }

        let operator_line = self.store_note(Notification::operator(line.to_string())).await?;
        let mut produced = vec![operator_line];
        let mut warnings = Vec::new();

        let reply = match command::parse(line) {
            ChatInput::Chat => None,
            ChatInput::MissingTarget(directive) => {
                Some((Correlation::Error, message::usage(directive)))
            }
            ChatInput::UnknownDirective(token) => {
                info!("Unknown chat directive {}", token);
                Some((Correlation::Help, message::help()))
            }
            ChatInput::Command { directive, target } => {
                Some(self.run_command(directive, &target, &mut warnings).await?)
            }
        };

        if let Some((request_id, content)) = reply {
            let note = self.bot_note(new_notification_id("SYS"), request_id, content);
            match self.record(note).await {
                Ok(saved) => produced.push(saved),
                Err(warning) => warnings.push(warning),
            }
        }

        Ok(Outcome::new(produced, warnings))
    }

    async fn run_command(
        &self,
        directive: Directive,
        target: &str,
        warnings: &mut Vec<String>,
    ) -> CoreResult<(Correlation, String)> {
        let Some(booking) = self.find(target).await? else {
            warn!("Chat {} for unknown booking {}", directive.token(), target);
            return Ok((Correlation::Error, message::not_found(target)));
        };

        match directive.target_status() {
            Some(status) => match self.change_status(booking, status).await {
                Ok(saved) => {
                    let text = message::confirmation(directive, &saved.id);
                    warnings.extend(self.forward(&text).await);
                    Ok((Correlation::Booking(saved.id), text))
                }
                Err(CoreError::NotFound(_)) => Ok(vanished(directive, target)),
                Err(e) => Err(e),
            },
            None if booking.status.is_closed() => {
                Ok((Correlation::Error, message::closed_cannot_delete(&booking.id)))
            }
            None => match self.remove(&booking).await {
                Ok(()) => {
                    let text = message::confirmation(directive, &booking.id);
                    warnings.extend(self.forward(&text).await);
                    Ok((Correlation::System, text))
                }
                Err(CoreError::NotFound(_)) => Ok(vanished(directive, target)),
                Err(e) => Err(e),
            },
        }
    }
}

/// The cache knew the booking but the store had already dropped it.
fn vanished(directive: Directive, target: &str) -> (Correlation, String) {
    warn!("Chat {} for booking {} that is gone from the store", directive.token(), target);
    (Correlation::Error, message::not_found(target))
}
