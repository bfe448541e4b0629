//! Command line interface to the inithooks answer cache: one argument reads
//! a key, two arguments set it.

use std::path::PathBuf;

use clap::Parser;
use inithooks_core::cache::DEFAULT_CACHE_DIR;
use inithooks_core::KeyStore;

#[derive(Parser)]
#[command(name = "inithooks-cache", version, about = "Interface to inithooks cache")]
struct Cli {
    /// Path to cache
    #[arg(long, env = "INITHOOKS_CACHE", default_value = DEFAULT_CACHE_DIR, value_name = "DIR")]
    cache_dir: PathBuf,

    /// Key name
    key: String,

    /// If specified, will set as key value; if omitted, will return the
    /// value of key if set
    value: Option<String>,
}

fn main() {
    inithooks_cli::init_logging();
    let cli = Cli::parse();

    let store = match KeyStore::new(&cli.cache_dir) {
        Ok(store) => store,
        Err(e) => inithooks_cli::fatal(e),
    };

    let result = match cli.value {
        Some(value) => store.write(&cli.key, &value),
        None => match store.read(&cli.key) {
            Ok(Some(val)) if !val.is_empty() => {
                println!("{val}");
                Ok(())
            }
            Ok(Some(_)) | Ok(None) => Ok(()),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        inithooks_cli::fatal(e);
    }
}
