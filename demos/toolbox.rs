use confer::Configurable;
use std::collections::BTreeSet;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Configurable)]
#[confer(
    discriminator = "fetch",
    description = "Fetch a url.",
    creator = Fetch::new(url, retries)
)]
struct Fetch {
    #[confer(positional = 0, required, description = "The url to fetch.")]
    pub url: String,
    #[confer(option, short = 'r', default = "3", description = "Attempts before giving up.")]
    pub retries: u32,
    #[confer(flag, description = "Skip certificate verification.")]
    pub insecure: bool,
}

impl Fetch {
    fn new(url: String, retries: u32) -> Self {
        Self {
            url,
            retries,
            insecure: false,
        }
    }
}

#[derive(Debug, Default, Configurable)]
#[confer(discriminator = "count", description = "Count the items.")]
struct Count {
    #[confer(positional = 0, description = "The items to count.")]
    pub items: Vec<String>,
    #[confer(flag, short = 'u', description = "Count distinct items only.")]
    pub unique: bool,
    #[confer(property = "count.limit", description = "Stop counting at this many.")]
    pub limit: Option<usize>,
}

#[derive(Debug, Configurable)]
#[confer(name = "toolbox", description = "A box of small tools.")]
enum Toolbox {
    Fetch(Fetch),
    Count(Count),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Toolbox::configure() {
        Toolbox::Fetch(fetch) => {
            let scheme = if fetch.insecure { "unverified" } else { "verified" };
            println!(
                "Fetching {} ({scheme}, up to {} attempts).",
                fetch.url, fetch.retries
            );
        }
        Toolbox::Count(count) => {
            let total = if count.unique {
                count.items.iter().collect::<BTreeSet<_>>().len()
            } else {
                count.items.len()
            };
            let total = count.limit.map_or(total, |limit| total.min(limit));
            println!("{total}");
        }
    }
}
