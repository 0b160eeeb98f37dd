//! Command line configuration.
//!
//! The only setting is the deny list, given as free-form words: every run of
//! ASCII digits anywhere in the arguments is one excluded capacity, so
//! `110`, `kb=110` and `110,3` all work.

use crate::monitor::filter::DenyList;
use clap::Parser;

/// Reports once per second whether the user touched a keyboard or mouse.
#[derive(Debug, Clone, Parser)]
#[command(name = "activity_monitor", version, about)]
pub struct Cli {
    /// Print every raw input device with its capacity and exit.
    #[arg(long)]
    pub list_devices: bool,

    /// Device capacities (total keys or mouse buttons) to ignore.
    #[arg(value_name = "IGNORE", allow_hyphen_values = true)]
    pub ignore: Vec<String>,
}

impl Cli {
    /// Builds the deny list from the positional arguments.
    pub fn deny_list(&self) -> DenyList {
        parse_deny_list(&self.ignore.join(" "))
    }
}

/// Extracts every digit run from `text` as a capacity value.
///
/// Values that do not fit in a `u32` are logged and skipped.
pub fn parse_deny_list(text: &str) -> DenyList {
    digit_runs(text)
        .filter_map(|token| match token.parse::<u32>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(token, error = %e, "Skipping deny-list value");
                None
            }
        })
        .collect()
}

fn digit_runs(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_words_and_overflow() {
        let list = parse_deny_list("abc 110 xyz 99999999999999");
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![110]);
    }

    #[test]
    fn test_parse_embedded_and_separated_runs() {
        let list = parse_deny_list("kb=110,3;mouse5");
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![3, 5, 110]);
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_deny_list("").is_empty());
        assert!(parse_deny_list("no numbers here").is_empty());
    }

    #[test]
    fn test_parse_leading_zeros_and_max() {
        let list = parse_deny_list("007 4294967295 4294967296");
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![7, u32::MAX]);
    }

    #[test]
    fn test_negative_sign_is_not_part_of_value() {
        assert_eq!(parse_deny_list("-5").iter().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_cli_collects_positional_words() {
        let cli = Cli::parse_from(["activity_monitor", "110", "kb-3"]);
        assert!(!cli.list_devices);
        assert_eq!(cli.deny_list().iter().collect::<Vec<_>>(), vec![3, 110]);
    }

    #[test]
    fn test_cli_list_devices_flag() {
        let cli = Cli::parse_from(["activity_monitor", "--list-devices"]);
        assert!(cli.list_devices);
        assert!(cli.deny_list().is_empty());
    }
}
