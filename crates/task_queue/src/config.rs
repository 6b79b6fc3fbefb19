use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens to tasks still waiting in the queue when the scheduler is stopped.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
	/// Leave queued tasks where they are. Their completions never resolve.
	#[default]
	Abandon,
	/// Run every queued task before the workers exit.
	Drain,
}

impl fmt::Display for ShutdownPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Abandon => write!(f, "abandon"),
			Self::Drain => write!(f, "drain"),
		}
	}
}

/// Scheduler options, meant to be flattened into an application's clap parser.
#[derive(Args, Clone, Debug, Default, Serialize, Deserialize)]
#[group(id = "scheduler")]
pub struct Config {
	#[arg(
		long,
		env = "SCHEDULER_SHUTDOWN_POLICY",
		value_enum,
		default_value_t = ShutdownPolicy::Abandon,
		help = "What to do with queued tasks on stop: abandon them or drain the queue first"
	)]
	pub shutdown_policy: ShutdownPolicy,
}

impl Config {
	#[must_use]
	pub const fn with_policy(shutdown_policy: ShutdownPolicy) -> Self {
		Self { shutdown_policy }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;

	#[derive(Parser, Debug)]
	struct Cli {
		#[command(flatten)]
		scheduler: Config,
	}

	#[test]
	fn test_default_config() {
		let config = Config::default();
		assert_eq!(config.shutdown_policy, ShutdownPolicy::Abandon);
	}

	#[test]
	fn test_config_parser() {
		let cli = Cli::try_parse_from(["program", "--shutdown-policy", "drain"]).unwrap();
		assert_eq!(cli.scheduler.shutdown_policy, ShutdownPolicy::Drain);

		assert!(Cli::try_parse_from(["program", "--shutdown-policy", "later"]).is_err());
	}

	mod app {
		use clap::Parser;

		/// Same struct name as the flattened options, like a typical binary's config.
		#[derive(Parser, Debug)]
		pub struct Config {
			#[arg(long, default_value = "bot")]
			pub name: String,

			#[command(flatten)]
			pub scheduler: super::Config,
		}
	}

	#[test]
	fn test_flattens_into_parser_of_the_same_name() {
		use clap::CommandFactory;

		app::Config::command().debug_assert();

		let config = app::Config::try_parse_from(["program", "--shutdown-policy", "drain"]).unwrap();
		assert_eq!(config.name, "bot");
		assert_eq!(config.scheduler.shutdown_policy, ShutdownPolicy::Drain);
	}
}
