/*  xkcd-password - memorable passphrases from a word list
    Copyright (C) 2014 Nathan Wittstock

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

extern crate env_logger;
extern crate xkcd_password;

use std::path::PathBuf;
use std::process;

use log::debug;
use xkcd_password::{settings, GeneratorConfig, PassphraseGenerator};

mod args;

fn settings_file() -> Option<PathBuf> {
    let config_home = match std::env::var("XDG_CONFIG_HOME") {
        Ok(p) => Some(PathBuf::from(p)),
        Err(_) => std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config")),
    };

    config_home.map(|dir| dir.join("xkcd-password").join("settings.toml"))
}

fn read_config() -> xkcd_password::Result<GeneratorConfig> {
    let settings_file = settings_file();
    debug!("reading settings from {:?}", settings_file);

    let settings = settings::read_settings(settings_file.as_deref())?;
    GeneratorConfig::from_settings(&settings)
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let options = match args::parse(&argv) {
        Ok(options) => options,
        Err(errors) => {
            for err in errors {
                eprintln!("{err}");
            }
            eprintln!("{}", args::help_message());
            process::exit(1);
        }
    };

    if options.version {
        println!("version {}", env!("CARGO_PKG_VERSION"));
        return;
    }
    if options.help {
        println!("{}", args::help_message());
        return;
    }

    let config = match read_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error {err}");
            process::exit(1);
        }
    };

    let generator = match PassphraseGenerator::with_config(config) {
        Ok(generator) => generator,
        Err(err) => {
            eprintln!("Error {err}");
            process::exit(1);
        }
    };
    if let Some(word_file) = &options.word_file {
        if let Err(err) = generator.init_with_word_file(word_file) {
            eprintln!("Error {err}");
            process::exit(1);
        }
    }

    match generator
        .generate_passphrase(options.request(), &options.separator)
        .await
    {
        Ok(passphrase) => println!("{passphrase}"),
        Err(err) => {
            eprintln!("Error {err}");
            process::exit(1);
        }
    }
}
