extern crate man;

use std::path::PathBuf;

fn main() {
    let page = man::prelude::Manual::new("xkcd-password")
        .about("Generates memorable passphrases from a list of words.")
        .author(man::prelude::Author::new("Nathan Wittstock").email("code@fardogllc.com"))
        .option(
            man::prelude::Opt::new("count")
                .short("-n")
                .long("--numWords")
                .help("The number of words in the passphrase, 4 by default"),
        )
        .option(
            man::prelude::Opt::new("length")
                .short("-m")
                .long("--minLength")
                .help("Minimum length of the chosen words, 5 by default"),
        )
        .option(
            man::prelude::Opt::new("length")
                .short("-x")
                .long("--maxLength")
                .help("Maximum length of the chosen words, 8 by default"),
        )
        .option(
            man::prelude::Opt::new("path")
                .short("-f")
                .long("--wordFile")
                .help("A newline delimited file of words to use instead of the bundled list"),
        )
        .option(
            man::prelude::Opt::new("separator")
                .short("-s")
                .long("--separator")
                .help("Printed between the words, a space by default"),
        )
        .flag(
            man::prelude::Flag::new()
                .short("-v")
                .long("--version")
                .help("Print the version"),
        )
        .flag(
            man::prelude::Flag::new()
                .short("-h")
                .long("--help")
                .help("Print a help text"),
        )
        .description("xkcd-password picks unique words within a length range from a word list, \
using the operating system's secure random number generator, and prints them as a passphrase.")
        .custom(
            man::prelude::Section::new("environment")
                .paragraph("RAND_BUFFER_SIZE : bytes of entropy buffered between reads, from 256 to 1048576, 512 by default")
                .paragraph("RAND_ALLOW_PRNG : fall back to a pseudo random generator if the secure one fails")
                .paragraph("XKCD_DISABLE_RETRY_BUDGET : never give up looking for words within the length range"),
        )
        .custom(
            man::prelude::Section::new("files").paragraph(
                "$XDG_CONFIG_HOME/xkcd-password/settings.toml can hold buffer_size, allow_prng and \
disable_retry_budget, the environment takes precedence.",
            ),
        )
        .render();

    let out_dir = match std::env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };
    if let Err(err) = std::fs::write(out_dir.join("xkcd-password.1"), page) {
        println!("cargo:warning=failed to write man page: {err}");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
