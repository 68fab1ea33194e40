use xkcd_password::GenerationRequest;

/// Max lengths below this let the minimum length drop to 1 when it isn't given.
const SHORT_MAX_LENGTH: i64 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub num_words: Option<i64>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub word_file: Option<String>,
    pub separator: String,
    pub version: bool,
    pub help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            num_words: None,
            min_length: None,
            max_length: None,
            word_file: None,
            separator: " ".to_owned(),
            version: false,
            help: false,
        }
    }
}

impl Options {
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            num_words: self.num_words,
            min_length: self.min_length,
            max_length: self.max_length,
        }
    }
}

enum Flag {
    NumWords,
    MinLength,
    MaxLength,
    WordFile,
    Separator,
    Version,
    Help,
}

impl Flag {
    fn from_arg(arg: &str) -> Option<Flag> {
        match arg {
            "-n" | "--numWords" => Some(Flag::NumWords),
            "-m" | "--minLength" => Some(Flag::MinLength),
            "-x" | "--maxLength" => Some(Flag::MaxLength),
            "-f" | "--wordFile" => Some(Flag::WordFile),
            "-s" | "--separator" => Some(Flag::Separator),
            "-v" | "--version" => Some(Flag::Version),
            "-h" | "--help" => Some(Flag::Help),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Flag::NumWords => "numWords",
            Flag::MinLength => "minLength",
            Flag::MaxLength => "maxLength",
            Flag::WordFile => "wordFile",
            Flag::Separator => "separator",
            Flag::Version => "version",
            Flag::Help => "help",
        }
    }
}

/// Parses the command line arguments, without the program name. Every problem found is
/// reported, not just the first.
pub fn parse(args: &[String]) -> Result<Options, Vec<String>> {
    let mut options = Options::default();
    let mut errors = vec![];

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (name, inline_value) = match arg.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value.to_owned())),
            _ => (arg.as_str(), None),
        };

        let flag = match Flag::from_arg(name) {
            Some(flag) => flag,
            None => {
                errors.push(format!("Unknown argument {arg}"));
                continue;
            }
        };

        match flag {
            Flag::Version => options.version = true,
            Flag::Help => options.help = true,
            Flag::NumWords | Flag::MinLength | Flag::MaxLength => {
                let value = inline_value.or_else(|| iter.next().cloned());
                match value.as_deref().map(str::parse::<i64>) {
                    Some(Ok(n)) => match flag {
                        Flag::NumWords => options.num_words = Some(n),
                        Flag::MinLength => options.min_length = Some(n),
                        _ => options.max_length = Some(n),
                    },
                    _ => errors.push(format!("{} expects an integer value.", flag.name())),
                }
            }
            Flag::WordFile | Flag::Separator => {
                let value = inline_value.or_else(|| iter.next().cloned());
                match value {
                    Some(v) if !v.is_empty() => {
                        if let Flag::WordFile = flag {
                            options.word_file = Some(v);
                        } else {
                            options.separator = v;
                        }
                    }
                    _ => errors.push(format!("{} expects a value.", flag.name())),
                }
            }
        }
    }

    if options.min_length.is_none() && options.max_length.is_some_and(|x| x < SHORT_MAX_LENGTH) {
        options.min_length = Some(1);
    }

    if errors.is_empty() {
        Ok(options)
    } else {
        Err(errors)
    }
}

pub fn help_message() -> String {
    [
        "Usage: xkcd-password [options]",
        "",
        "Options:",
        "   -n, --numWords    The number of words to generate for your password.  [4]",
        "   -m, --minLength   Minimum length of words chosen for the generated password.  [5]",
        "   -x, --maxLength   Maximum length of words chosen for the generated password.  [8]",
        "   -f, --wordFile    Path to a newline-delimited list of words to be used as the source.",
        "   -s, --separator   The separator character to use between words when output to the console.  [ ]",
        "   -v, --version     print version and exit",
        "   -h, --help        print this help and exit",
    ]
    .join("\n")
}

#[cfg(test)]
#[path = "tests/args.rs"]
mod args_tests;
