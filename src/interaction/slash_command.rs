//! The `/linkbot` slash command: a small control plane over the running bots.

use std::collections::BTreeSet;

use tracing::{info, instrument};

use crate::{
    base::{logging::LogControl, types::InvalidArgumentError},
    bot::{BotRegistry, compose::escape_html},
};

/// The command name as registered with the chat platform.
pub const NAME: &str = "linkbot";

const LINE_SEPARATOR: &str = "\n> ";

type Operation = fn(&SlashCommand, &str) -> String;

/// The supported operations, in help-listing order. Aliases share a row.
const OPERATIONS: &[(&[&str], &str, Operation)] = &[
    (&["help", "?", ""], "*[help|?|]* Offer this helpful message", SlashCommand::op_help),
    (&["debug"], "*debug [on|off]* Adjust verbose logging", SlashCommand::op_debug),
    (&["quips"], "*quips [on|off|reset]* Control link quip display", SlashCommand::op_quips),
    (&["links"], "*links* Show links I'm looking for", SlashCommand::op_links),
];

/// Dispatcher for `/linkbot` control commands.
#[derive(Clone)]
pub struct SlashCommand {
    registry: BotRegistry,
    log: LogControl,
}

impl SlashCommand {
    pub fn new(registry: BotRegistry, log: LogControl) -> Self {
        Self { registry, log }
    }

    /// Route a raw command text to its operation.
    ///
    /// The first whitespace token picks the operation (case-insensitively);
    /// the remainder is passed through as the argument.
    #[instrument(skip(self))]
    pub fn dispatch(&self, text: &str) -> String {
        let text = text.trim();
        let (operation, argument) = match text.split_once(char::is_whitespace) {
            Some((operation, argument)) => (operation, argument.trim()),
            None => (text, ""),
        };
        let operation = operation.to_lowercase();

        info!("Dispatching operation: {operation:?}");

        for (names, _, run) in OPERATIONS {
            if names.contains(&operation.as_str()) {
                return run(self, argument);
            }
        }

        format!("sorry, linkbot cannot *{operation}*")
    }

    fn op_help(&self, _argument: &str) -> String {
        let descriptions = OPERATIONS.iter().map(|(_, description, _)| (*description).to_string());

        indented_list("Hi! I'm linkbot and I can", descriptions)
    }

    fn op_debug(&self, argument: &str) -> String {
        if !argument.is_empty() {
            match parse_boolean(argument) {
                Ok(debug) => self.log.set_debug(debug),
                Err(err) => return format!("linkbot debug: {err}"),
            }
        }

        let state = if self.log.debug() { "on" } else { "off" };

        format!("linkbot debug is {state}")
    }

    fn op_quips(&self, argument: &str) -> String {
        match argument {
            "" => {
                // Bots may share templates; list each phrasing once.
                let quips: BTreeSet<String> = self
                    .registry
                    .bots()
                    .iter()
                    .flat_map(|bot| bot.quips().templates().iter().cloned())
                    .collect();

                indented_list("Current quips include", quips.into_iter())
            }
            "reset" => {
                for bot in self.registry.bots() {
                    bot.quips().reset();
                }

                "linkbot quips have been reset".to_string()
            }
            _ => match parse_boolean(argument) {
                Ok(enabled) => {
                    for bot in self.registry.bots() {
                        bot.quips().set_enabled(enabled);
                    }

                    let state = if enabled { "on" } else { "off" };

                    format!("Linkbot turned {state} quips")
                }
                Err(err) => format!("linkbot quips: {err}"),
            },
        }
    }

    fn op_links(&self, argument: &str) -> String {
        if !argument.is_empty() {
            return format!("unrecognized links option *{argument}*");
        }

        let searches = self
            .registry
            .bots()
            .iter()
            .map(|bot| format!("{}: {}", bot.name(), escape_html(bot.match_pattern())));

        indented_list("Linkbot link searches", searches)
    }
}

/// Accepts the usual toggle spellings; anything else is an error.
fn parse_boolean(argument: &str) -> Result<bool, InvalidArgumentError> {
    match argument.to_lowercase().as_str() {
        "on" | "1" | "true" | "yes" => Ok(true),
        "off" | "0" | "false" | "no" => Ok(false),
        _ => Err(InvalidArgumentError(argument.to_string())),
    }
}

fn indented_list(title: &str, items: impl Iterator<Item = String>) -> String {
    let body = items.collect::<Vec<_>>().join(LINE_SEPARATOR);

    format!("{title}:{LINE_SEPARATOR}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::config::BotDefinition;
    use crate::bot::LinkBot;

    fn control() -> SlashCommand {
        let definition = BotDefinition {
            match_pattern: Some("KB[0-9]+".to_string()),
            link: Some("<https://example.com/{}|{}>".to_string()),
            quips: Some(vec!["hmmmm, did you mean {}?".to_string()]),
            ..Default::default()
        };
        let bot = LinkBot::new(&definition, "https://idp.example.com/").expect("bot should build");
        let registry = BotRegistry::new(vec![bot]).expect("registry should build");

        SlashCommand::new(registry, LogControl::noop(false))
    }

    #[test]
    fn empty_text_gets_help() {
        let reply = control().dispatch("");

        assert!(reply.starts_with("Hi! I'm linkbot and I can:"));
        assert!(reply.contains("*debug [on|off]* Adjust verbose logging"));
        assert!(reply.contains("*links* Show links I'm looking for"));
    }

    #[test]
    fn unknown_operation_is_reported() {
        assert_eq!(control().dispatch("dance"), "sorry, linkbot cannot *dance*");
    }

    #[test]
    fn debug_toggles_and_reports_state() {
        let control = control();

        assert_eq!(control.dispatch("debug"), "linkbot debug is off");
        assert_eq!(control.dispatch("debug on"), "linkbot debug is on");
        assert_eq!(control.dispatch("DEBUG OFF"), "linkbot debug is off");
        assert_eq!(control.dispatch("debug sideways"), "linkbot debug: invalid boolean value sideways");
    }

    #[test]
    fn quips_lists_toggles_and_resets() {
        let control = control();

        assert_eq!(control.dispatch("quips"), "Current quips include:\n> hmmmm, did you mean {}?");
        assert_eq!(control.dispatch("quips off"), "Linkbot turned off quips");
        assert!(!control.registry.bots()[0].quips().enabled());
        assert_eq!(control.dispatch("quips on"), "Linkbot turned on quips");
        assert!(control.registry.bots()[0].quips().enabled());
        assert_eq!(control.dispatch("quips reset"), "linkbot quips have been reset");
        assert_eq!(control.dispatch("quips loudly"), "linkbot quips: invalid boolean value loudly");
    }

    #[test]
    fn links_lists_patterns_with_markup_escaped() {
        let reply = control().dispatch("links");

        assert_eq!(reply, "Linkbot link searches:\n> linkbot (KB[0-9]+): KB[0-9]+");
    }

    #[test]
    fn links_rejects_arguments() {
        assert_eq!(control().dispatch("links please"), "unrecognized links option *please*");
    }

    #[test]
    fn pattern_markup_is_escaped_in_links_output() {
        let definition = BotDefinition {
            match_pattern: Some("<[A-Z]+>".to_string()),
            link: Some("{}|{}".to_string()),
            ..Default::default()
        };
        let bot = LinkBot::new(&definition, "https://idp.example.com/").expect("bot should build");
        let registry = BotRegistry::new(vec![bot]).expect("registry should build");
        let control = SlashCommand::new(registry, LogControl::noop(false));

        let reply = control.dispatch("links");

        assert!(reply.contains("&lt;[A-Z]+&gt;"));
    }
}
