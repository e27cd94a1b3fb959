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

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::error::Fallible;
use crate::web::server::start_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Start the web server.
    Serve {
        /// Path to the SQLite database file.
        #[arg(long, default_value = "flashdeck.db")]
        database: String,
        /// Path to the config file.
        #[arg(long, default_value = "flashdeck.toml")]
        config: PathBuf,
        /// Open the app in the default browser once the server is up.
        #[arg(long)]
        open: bool,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            database,
            config,
            open,
        } => {
            let config = Config::load(&config)?;
            start_server(config, &database, open).await
        }
    }
}
