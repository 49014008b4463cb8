use confer::Configurable;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Configurable)]
#[confer(name = "greet", description = "Greet someone, politely.", version = "0.3.0")]
struct Greet {
    #[confer(flag, short = 'v', description = "Talk more.")]
    pub verbose: bool,
    #[confer(option, short = 'n', default = "world", description = "Who to greet.")]
    pub name: String,
    #[confer(option, long = "times", default = "1", example = "3")]
    pub repeat: u8,
    #[confer(positional = 0, description = "The greeting words.")]
    pub words: Vec<String>,
    #[confer(environment = "GREET_PUNCTUATION", default = "!")]
    pub punctuation: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let greet = Greet::configure();

    if greet.verbose {
        println!("{greet:?}");
    }

    let greeting = if greet.words.is_empty() {
        "Hello".to_string()
    } else {
        greet.words.join(" ")
    };

    for _ in 0..greet.repeat {
        println!("{greeting}, {}{}", greet.name, greet.punctuation);
    }
}
