// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use notecards_core::error::Fallible;

use crate::cmd::check::check_collection;
use crate::cmd::export::export_collection;
use crate::cmd::reformat::reformat_collection;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Check that a collection parses, and report any warnings.
    Check {
        /// Path to the collection's config file.
        config: String,
    },
    /// Print collection statistics.
    Stats {
        /// Path to the collection's config file.
        config: String,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Export the parsed notes as JSON.
    Export {
        /// Path to the collection's config file.
        config: String,
        /// Optional path to the output file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
    },
    /// Rewrite the canonical `.nu` file from the notes.
    Reformat {
        /// Path to the collection's config file.
        config: String,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Check { config } => check_collection(&config),
        Command::Stats { config, format } => print_stats(&config, format),
        Command::Export { config, output } => export_collection(&config, output),
        Command::Reformat { config } => reformat_collection(&config),
    }
}
